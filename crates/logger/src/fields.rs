//! Field names used in serialized records

use std::collections::BTreeSet;

/// Field holding the record level
pub const LEVEL_FIELD: &str = "level";
/// Field holding the record timestamp
pub const TIME_FIELD: &str = "time";
/// Field holding the record message
pub const MESSAGE_FIELD: &str = "message";
/// Field holding the `file:line` of the call site
pub const CALLER_FIELD: &str = "caller";
/// Field holding the logger label
pub const LABEL_FIELD: &str = "label";
/// Field holding an error description
pub const ERROR_FIELD: &str = "error";

/// Field names with dedicated formatting that are kept out of the trailing
/// `key=value` group when a record is rendered for humans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeys {
    keys: BTreeSet<String>,
    error_key: String,
}

impl ReservedKeys {
    /// Create a reserved set from explicit names
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            error_key: ERROR_FIELD.to_string(),
        }
    }

    /// Use a different name for the error field that leads the trailing group
    #[must_use]
    pub fn with_error_key(mut self, error_key: impl Into<String>) -> Self {
        self.error_key = error_key.into();
        self
    }

    /// Whether `key` is reserved
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Name of the error field
    #[must_use]
    pub fn error_key(&self) -> &str {
        &self.error_key
    }

    /// Iterate over the reserved names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self::new([
            LEVEL_FIELD,
            TIME_FIELD,
            MESSAGE_FIELD,
            CALLER_FIELD,
            LABEL_FIELD,
        ])
    }
}
