//! Per-property write permissions.
//!
//! A restriction is attached to a field or association when its descriptor is
//! built. Properties without a restriction are writable by every action.

use crate::core::{CrudError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Write action a payload is applied under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// A new entity is being populated (`POST`)
    Create,
    /// An existing entity is being patched (`PATCH`/`PUT`)
    Update,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            other => Err(CrudError::InvalidAction(other.to_string())),
        }
    }
}

/// Set of actions allowed to write one property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyRestriction {
    granted: BTreeSet<Action>,
}

impl PropertyRestriction {
    pub fn new(granted: impl IntoIterator<Item = Action>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// Restriction granting only the given action
    pub fn only(action: Action) -> Self {
        Self::new([action])
    }

    pub fn is_granted(&self, action: Action) -> bool {
        self.granted.contains(&action)
    }
}
