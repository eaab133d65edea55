//! Property and accessor name normalization.

const WORD_SEPARATORS: [char; 3] = ['_', '-', ' '];

/// Camel-cases a property name (`category_id` -> `categoryId`).
///
/// Only `_`, `-` and spaces break words. The letter after a break is
/// upper-cased, the first letter is lower-cased, and every other character
/// keeps its case (`image_URL` -> `imageURL`).
pub fn camelize(name: &str) -> String {
    let classified: String = name.split(WORD_SEPARATORS).map(ucfirst).collect();
    lcfirst(&classified)
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character, leaving the rest untouched.
pub fn lcfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Setter name for a payload property (`status` -> `setStatus`).
pub fn setter_name(property: &str) -> String {
    camelize(&format!("set_{property}"))
}

/// Getter name for a payload property (`id` -> `getId`).
pub fn getter_name(property: &str) -> String {
    camelize(&format!("get_{property}"))
}
