//! Export-argument keys the wrapper reserves for itself.

use std::collections::BTreeSet;

use crate::arguments::ExportArguments;
use crate::error::{SpecError, SpecResult};

/// Keys only the wrapper may supply to the export capability.
///
/// `filepath` and `export_format` are computed per output. `export_texture_dir`
/// is held back for sandbox-only use.
pub const DEFAULT_RESERVED_KEYS: &[&str] = &["filepath", "export_format", "export_texture_dir"];

/// The denylist of export-argument keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeys {
    keys: BTreeSet<String>,
}

impl ReservedKeys {
    /// Creates an empty denylist.
    pub fn empty() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    /// Adds a key to the denylist.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Returns true if `key` is reserved.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns the reserved keys in sorted order.
    pub fn to_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Fails on the first export argument that collides with a reserved key.
    pub fn check(&self, arguments: &ExportArguments) -> SpecResult<()> {
        match arguments.keys().find(|key| self.contains(key)) {
            Some(key) => Err(SpecError::reserved_export_arg(key, self.to_vec())),
            None => Ok(()),
        }
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        DEFAULT_RESERVED_KEYS
            .iter()
            .fold(Self::empty(), |keys, key| keys.with_key(*key))
    }
}
