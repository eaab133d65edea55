//! Embedded-association rendering flags.
//!
//! Handlers return results that may carry a tri-state "show associations"
//! preference. Right before rendering, [`EmbeddedResponseListener`] fills an
//! unset preference from the `_embedded` query parameter and hands the same
//! flag down to collection members.

pub mod response;

pub use response::{CollectionResponse, EntityResponse, Render};

use tracing::trace;

/// Name of the query parameter controlling embedded rendering.
pub const EMBEDDED_QUERY_PARAM: &str = "_embedded";

/// Tri-state embedded-association preference.
pub trait EmbeddedFlag {
    /// `None` while no explicit preference was set.
    fn show_associations(&self) -> Option<bool>;
    fn set_show_associations(&mut self, show: bool);
}

/// Collection results that pass a display mode down to their members.
pub trait InheritedEmbedding {
    fn set_inherited_show_associations(&mut self, show: bool);
}

/// Capabilities a handler result may expose to the listener.
pub trait RenderableResult {
    fn embedded_flag(&mut self) -> Option<&mut dyn EmbeddedFlag> {
        None
    }

    fn inherited_embedding(&mut self) -> Option<&mut dyn InheritedEmbedding> {
        None
    }
}

/// Permissive boolean parse: `1`, `true`, `on`, `yes` (any case); anything else is `false`.
pub fn parse_embedded_flag(raw: Option<&str>) -> bool {
    raw.map(|value| value.trim().to_ascii_lowercase())
        .is_some_and(|value| matches!(value.as_str(), "1" | "true" | "on" | "yes"))
}

/// Propagates the `_embedded` query flag into handler results.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedResponseListener;

impl EmbeddedResponseListener {
    pub fn new() -> Self {
        Self
    }

    pub fn on_view(&self, embedded: Option<&str>, result: &mut dyn RenderableResult) {
        let embedded = parse_embedded_flag(embedded);

        if let Some(flag) = result.embedded_flag() {
            if flag.show_associations().is_none() {
                flag.set_show_associations(embedded);
            }
        }

        // collections always inherit, even when their own flag was preset
        if let Some(collection) = result.inherited_embedding() {
            collection.set_inherited_show_associations(embedded);
        }

        trace!(embedded, "embedded flag propagated");
    }
}
