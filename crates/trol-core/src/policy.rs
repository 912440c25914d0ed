//! Read/write policy flags and their three-level resolution.
//!
//! Both flags resolve the same way: the property's own setting wins, then
//! the owner's, then the built-in default.

use serde::{Deserialize, Serialize};

/// Commit on every write unless told otherwise.
pub const DEFAULT_AUTOCOMMIT: bool = true;

/// Serve reads from the local cache unless told otherwise.
pub const DEFAULT_ALWAYSFETCH: bool = false;

/// Optional policy flags. `None` means "defer to the next level".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Commit the local value to the store on every write.
    pub autocommit: Option<bool>,
    /// Fetch from the store on every read, even when a value is cached.
    pub alwaysfetch: Option<bool>,
}

impl Policy {
    /// Both flags unset.
    pub const UNSET: Policy = Policy {
        autocommit: None,
        alwaysfetch: None,
    };

    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = Some(autocommit);
        self
    }

    pub fn with_alwaysfetch(mut self, alwaysfetch: bool) -> Self {
        self.alwaysfetch = Some(alwaysfetch);
        self
    }

    /// Fill the unset flags of `self` from `fallback`.
    pub fn or(self, fallback: Policy) -> Policy {
        Policy {
            autocommit: self.autocommit.or(fallback.autocommit),
            alwaysfetch: self.alwaysfetch.or(fallback.alwaysfetch),
        }
    }

    /// Resolve `autocommit` with `self` as the property-level setting.
    pub fn resolve_autocommit(&self, owner: &Policy) -> bool {
        self.autocommit
            .or(owner.autocommit)
            .unwrap_or(DEFAULT_AUTOCOMMIT)
    }

    /// Resolve `alwaysfetch` with `self` as the property-level setting.
    pub fn resolve_alwaysfetch(&self, owner: &Policy) -> bool {
        self.alwaysfetch
            .or(owner.alwaysfetch)
            .unwrap_or(DEFAULT_ALWAYSFETCH)
    }
}
