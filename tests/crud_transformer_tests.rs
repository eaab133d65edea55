use crudrest::demo::{self, Category, Product, Tag};
use crudrest::{
    Action, CrudError, CrudTransformer, EntityCollection, EntityDescriptor, EntityDeserializer,
    EntityHandle, EntityStore, EntityTypeRegistry, InMemoryEntityStore, MetadataRegistry,
    PropertyOutcome, PropertyValue, Related, entity_handle,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingDeserializer {
    inner: EntityTypeRegistry,
    calls: AtomicUsize,
}

impl EntityDeserializer for CountingDeserializer {
    fn deserialize(&self, payload: &Value, target: &str) -> crudrest::Result<EntityHandle> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.deserialize(payload, target)
    }
}

struct Fixture {
    transformer: CrudTransformer,
    store: Arc<InMemoryEntityStore>,
    deserializer: Arc<CountingDeserializer>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        demo::seed(store.as_ref()).expect("seed");
        let deserializer = Arc::new(CountingDeserializer {
            inner: demo::types(),
            calls: AtomicUsize::new(0),
        });
        let transformer = CrudTransformer::new(
            demo::metadata().expect("metadata"),
            deserializer.clone(),
            store.clone(),
        );
        Self {
            transformer,
            store,
            deserializer,
        }
    }

    fn deserialize_calls(&self) -> usize {
        self.deserializer.calls.load(Ordering::Relaxed)
    }
}

fn tag_collection(store: &InMemoryEntityStore, ids: &[i64]) -> EntityCollection {
    ids.iter()
        .map(|id| {
            store
                .find("Tag", &json!(id))
                .expect("find tag")
                .expect("seeded tag")
        })
        .collect()
}

#[test]
fn session_requires_registered_entity() {
    let fixture = Fixture::new();
    let err = fixture.transformer.session("Invoice").err().expect("unknown entity");
    assert!(matches!(err, CrudError::UnknownEntity(name) if name == "Invoice"));
}

#[test]
fn unknown_properties_are_never_accessible() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    for action in [Action::Create, Action::Update] {
        assert!(!session.is_property_accessible("colour", action));
        assert!(!session.is_property_accessible("warehouse_id", action));
    }
}

#[test]
fn property_names_are_normalized_before_lookup() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    assert_eq!(session.canonical_property("name"), "name");
    assert_eq!(session.canonical_property("category"), "Category");
    assert_eq!(session.canonical_property("tags"), "Tags");
    assert!(session.is_property_accessible("category", Action::Create));
    assert!(session.is_property_accessible("Category", Action::Update));
    assert!(session.is_property_accessible("price", Action::Create));
}

#[test]
fn restrictions_gate_by_action() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    assert!(!session.is_property_accessible("status", Action::Create));
    assert!(session.is_property_accessible("status", Action::Update));
}

#[test]
fn denied_property_leaves_object_untouched() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let mut product = Product::new(5, "Saw");

    let outcome = session
        .process_property_value(&mut product, "status", json!("X"), Action::Create, None)
        .unwrap();

    assert_eq!(outcome, PropertyOutcome::Denied);
    assert_eq!(product.status, None);
}

#[test]
fn denied_association_is_never_resolved() {
    let fixture = Fixture::new();
    let metadata = demo::metadata().unwrap();
    let locked = metadata
        .clone()
        .with_descriptor(
            crudrest::EntityDescriptor::builder("LockedProduct")
                .field("name")
                .restricted_association(
                    "Category",
                    "Category",
                    crudrest::AssociationKind::ToOne,
                    [Action::Update],
                )
                .build(),
        )
        .unwrap();
    let transformer = CrudTransformer::new(
        locked,
        fixture.deserializer.clone(),
        fixture.store.clone(),
    );
    let session = transformer.session("LockedProduct").unwrap();
    let mut product = Product::new(6, "Rake");
    let lookups_before = fixture.store.lookup_count();

    let outcome = session
        .process_property_value(
            &mut product,
            "category",
            json!({"id": 1, "name": "Tools"}),
            Action::Create,
            None,
        )
        .unwrap();

    assert_eq!(outcome, PropertyOutcome::Denied);
    assert!(product.category.is_none());
    assert_eq!(fixture.deserialize_calls(), 0);
    assert_eq!(fixture.store.lookup_count(), lookups_before);
}

#[test]
fn scalar_values_pass_through_and_are_applied() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let mut product = Product::new(7, "Drill");

    let value = session
        .transform_property_value("price", json!(12.5), None)
        .unwrap();
    assert_eq!(value.as_scalar(), Some(&json!(12.5)));

    let outcome = session
        .process_property_value(&mut product, "status", json!("retired"), Action::Update, None)
        .unwrap();
    assert_eq!(outcome, PropertyOutcome::Applied);
    assert_eq!(product.status.as_deref(), Some("retired"));
}

#[test]
fn null_association_is_returned_unchanged() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let tags = tag_collection(&fixture.store, &[1, 2]);

    let without = session
        .transform_property_value("category", Value::Null, None)
        .unwrap();
    let with = session
        .transform_property_value("tags", Value::Null, Some(&tags))
        .unwrap();

    assert!(without.is_null());
    assert!(with.is_null());
}

#[test]
fn bare_identifier_becomes_lazy_reference_without_lookup() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let lookups_before = fixture.store.lookup_count();

    let value = session
        .transform_property_value("category", json!(404), None)
        .unwrap();

    let PropertyValue::Related(Related::Lazy(reference)) = value else {
        panic!("expected lazy reference");
    };
    assert_eq!(reference.target(), "Category");
    assert_eq!(reference.identifier(), &json!(404));
    assert!(!reference.is_loaded());
    assert_eq!(fixture.store.lookup_count(), lookups_before);

    // resolution is deferred: the missing record only fails on load
    let err = reference.load(fixture.store.as_ref()).unwrap_err();
    assert!(matches!(err, CrudError::EntityNotFound(target, _) if target == "Category"));
}

#[test]
fn lazy_reference_loads_and_caches_existing_record() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    let PropertyValue::Related(related) = session
        .transform_property_value("category", json!(2), None)
        .unwrap()
    else {
        panic!("expected related value");
    };
    let first = related.load(fixture.store.as_ref()).unwrap();
    let lookups = fixture.store.lookup_count();
    let second = related.load(fixture.store.as_ref()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fixture.store.lookup_count(), lookups);
    let name = demo::with_entity::<Category, _>(&first, |c| c.name.clone()).unwrap();
    assert_eq!(name.as_deref(), Some("Garden"));
}

#[test]
fn object_payload_prefers_persisted_instance() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let persisted = fixture.store.find("Category", &json!(1)).unwrap().unwrap();

    let value = session
        .transform_property_value("category", json!({"id": 1, "name": "Renamed"}), None)
        .unwrap();

    let PropertyValue::Related(Related::Loaded(handle)) = value else {
        panic!("expected loaded entity");
    };
    assert!(Arc::ptr_eq(&handle, &persisted));
    assert_eq!(fixture.deserialize_calls(), 1);
    let name = demo::with_entity::<Category, _>(&handle, |c| c.name.clone()).unwrap();
    assert_eq!(name.as_deref(), Some("Tools"));
}

#[test]
fn object_payload_without_persisted_match_stays_transient() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    for payload in [json!({"id": 99, "name": "Paint"}), json!({"name": "Unsaved"})] {
        let value = session
            .transform_property_value("category", payload.clone(), None)
            .unwrap();
        let PropertyValue::Related(Related::Loaded(handle)) = value else {
            panic!("expected loaded entity");
        };
        let name = demo::with_entity::<Category, _>(&handle, |c| c.name.clone()).unwrap();
        assert_eq!(name.as_deref(), payload["name"].as_str());
    }
    assert_eq!(fixture.store.len("Category").unwrap(), 2);
}

#[test]
fn malformed_object_payload_propagates_deserialize_error() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();

    let err = session
        .transform_property_value("category", json!({"id": "one", "name": 5}), None)
        .unwrap_err();
    assert!(matches!(err, CrudError::Deserialize(_)));
}

#[test]
fn collection_member_is_reused_by_identity() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let tags = tag_collection(&fixture.store, &[1, 2]);
    let member = tags.iter().nth(1).cloned().unwrap();
    let lookups_before = fixture.store.lookup_count();

    let value = session
        .transform_property_value("tags", json!(2), Some(&tags))
        .unwrap();

    let PropertyValue::Related(Related::Loaded(handle)) = value else {
        panic!("expected collection member");
    };
    assert!(Arc::ptr_eq(&handle, &member));
    assert_eq!(fixture.store.lookup_count(), lookups_before);
}

#[test]
fn collection_search_uses_strict_equality_and_falls_back() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let tags = tag_collection(&fixture.store, &[1]);

    let value = session
        .transform_property_value("tags", json!("1"), Some(&tags))
        .unwrap();

    let PropertyValue::Related(Related::Lazy(reference)) = value else {
        panic!("expected lazy reference for non-matching identifier");
    };
    assert_eq!(reference.identifier(), &json!("1"));
}

#[test]
fn duplicate_identifiers_resolve_to_last_member() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let first = entity_handle(Tag::new(3, "first"));
    let last = entity_handle(Tag::new(3, "last"));
    let tags = EntityCollection::from(vec![first, last.clone()]);

    let value = session
        .transform_property_value("tags", json!(3), Some(&tags))
        .unwrap();

    let PropertyValue::Related(Related::Loaded(handle)) = value else {
        panic!("expected collection member");
    };
    assert!(Arc::ptr_eq(&handle, &last));
}

#[test]
fn to_many_arrays_resolve_element_wise() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let tags = tag_collection(&fixture.store, &[1]);
    let member = tags.iter().next().cloned().unwrap();

    let value = session
        .transform_property_value("tags", json!([1, 2, {"label": "new"}]), Some(&tags))
        .unwrap();

    let PropertyValue::Collection(items) = value else {
        panic!("expected collection");
    };
    assert_eq!(items.len(), 3);
    assert!(Arc::ptr_eq(items[0].as_handle().unwrap(), &member));
    assert!(matches!(&items[1], Related::Lazy(reference) if reference.identifier() == &json!(2)));
    assert!(items[2].as_handle().is_some());
}

#[test]
fn missing_setter_is_silently_skipped() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let mut product = Product::new(8, "Level");

    let outcome = session
        .process_property_value(&mut product, "sku", json!("LV-1"), Action::Create, None)
        .unwrap();

    assert_eq!(outcome, PropertyOutcome::NoSetter);
    assert_eq!(product.sku, None);
}

#[test]
fn accessor_names_follow_camel_case() {
    assert_eq!(CrudTransformer::property_setter("status"), "setStatus");
    assert_eq!(CrudTransformer::property_setter("category"), "setCategory");
    assert_eq!(CrudTransformer::property_getter("id"), "getId");
    assert_eq!(CrudTransformer::property_setter("imageURL"), "setImageURL");
}

#[test]
fn acronym_fields_keep_their_declared_spelling() {
    let metadata = MetadataRegistry::new()
        .with_descriptor(
            EntityDescriptor::builder("Media")
                .field("imageURL")
                .field("item2b")
                .build(),
        )
        .unwrap();
    let transformer = CrudTransformer::new(
        metadata,
        Arc::new(demo::types()),
        Arc::new(InMemoryEntityStore::new()),
    );
    let session = transformer.session("Media").unwrap();

    assert!(session.is_property_accessible("imageURL", Action::Create));
    assert!(session.is_property_accessible("image_u_r_l", Action::Update));
    assert!(session.is_property_accessible("item2b", Action::Create));
    assert!(!session.is_property_accessible("imageUrl", Action::Create));
    assert_eq!(session.canonical_property("image_URL"), "imageURL");
}

#[test]
fn process_payload_applies_each_property() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let hammer = fixture.store.find("Product", &json!(1)).unwrap().unwrap();
    let steel = fixture.store.find("Tag", &json!(1)).unwrap().unwrap();

    let outcomes = {
        let mut guard = hammer.write().unwrap();
        session
            .process_value(
                &mut *guard,
                &json!({
                    "name": "Claw hammer",
                    "status": "discontinued",
                    "category": 2,
                    "tags": [1, 2],
                    "colour": "red"
                }),
                Action::Update,
            )
            .unwrap()
    };

    assert!(outcomes.contains(&("colour".to_string(), PropertyOutcome::Denied)));
    assert!(outcomes.contains(&("name".to_string(), PropertyOutcome::Applied)));

    let (name, status, category, first_tag) = demo::with_entity::<Product, _>(&hammer, |p| {
        (
            p.name.clone(),
            p.status.clone(),
            p.category.as_ref().map(|c| c.identifier().unwrap()),
            p.tags[0].as_handle().cloned(),
        )
    })
    .unwrap()
    .unwrap();
    assert_eq!(name, "Claw hammer");
    assert_eq!(status.as_deref(), Some("discontinued"));
    assert_eq!(category, Some(Some(json!(2))));
    assert!(Arc::ptr_eq(&first_tag.unwrap(), &steel));
}

#[test]
fn process_value_rejects_non_object_payload() {
    let fixture = Fixture::new();
    let session = fixture.transformer.session("Product").unwrap();
    let mut product = Product::default();

    let err = session
        .process_value(&mut product, &json!([1, 2]), Action::Create)
        .unwrap_err();
    assert!(matches!(err, CrudError::InvalidValue(..)));
}
