use std::collections::HashMap;

use crate::domain::entities::store_error::StoreError;

/// Key used for any failure that has no dedicated description.
pub const UNKNOWN_KEY: &str = "unknown";

pub trait Localizer: Send + Sync {
    /// Looks up `key`; implementations fall back to the key itself.
    fn localized(&self, key: &str) -> String;
}

/// Returns keys unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyLocalizer;

impl Localizer for KeyLocalizer {
    fn localized(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Looks keys up in an in-memory string table.
#[derive(Debug, Default, Clone)]
pub struct TableLocalizer {
    table: HashMap<String, String>,
}

impl TableLocalizer {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Parses a flat JSON object of `key -> display string`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl Localizer for TableLocalizer {
    fn localized(&self, key: &str) -> String {
        self.table
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Human-readable description of a store failure.
///
/// Errors outside the store domain, missing errors, and codes this crate
/// does not know all resolve to the generic "unknown" string.
pub fn describe(error: Option<&StoreError>, localizer: &dyn Localizer) -> String {
    let key = error
        .and_then(StoreError::store_code)
        .map(|code| code.localization_key())
        .unwrap_or(UNKNOWN_KEY);
    localizer.localized(key)
}
