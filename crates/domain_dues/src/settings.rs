//! Club configuration entries
//!
//! A small typed key/value store backs the two operational knobs of the
//! dues system: the overdue tolerance window and the receipt counter. The
//! counter is never read-modify-written through this module; receipt
//! numbers come only from `ConfigStore::increment_counter`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DuesError;
use crate::ports::ConfigStore;

/// Key holding the grace days added to the due date before the sweep marks
/// a due overdue
pub const TOLERANCE_DAYS_KEY: &str = "dias_tolerancia";

/// Key holding the receipt number counter
pub const RECEIPT_COUNTER_KEY: &str = "numero_recibo_actual";

/// Grace window applied when the tolerance key is absent or unreadable
pub const DEFAULT_TOLERANCE_DAYS: i64 = 5;

/// Declared type of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValueType {
    Text,
    Number,
    Boolean,
    Json,
}

impl ConfigValueType {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigValueType::Text => "text",
            ConfigValueType::Number => "number",
            ConfigValueType::Boolean => "boolean",
            ConfigValueType::Json => "json",
        }
    }
}

impl fmt::Display for ConfigValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfigValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ConfigValueType::Text),
            "number" => Ok(ConfigValueType::Number),
            "boolean" => Ok(ConfigValueType::Boolean),
            "json" => Ok(ConfigValueType::Json),
            other => Err(format!("unknown config value type: {other}")),
        }
    }
}

/// One configuration entry
///
/// Values are stored as text regardless of declared type; typed readers
/// parse on access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique key
    pub key: String,
    /// Raw value
    pub value: String,
    /// Declared value type
    pub value_type: ConfigValueType,
    /// What this entry controls
    pub description: Option<String>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConfigEntry {
    /// Creates an entry updated now
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        value_type: ConfigValueType,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_type,
            description: None,
            updated_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses the value as an integer, if it is one
    pub fn as_i64(&self) -> Option<i64> {
        self.value.trim().parse().ok()
    }
}

/// Reads the overdue tolerance window in days
///
/// An absent key or a value that does not parse falls back to
/// [`DEFAULT_TOLERANCE_DAYS`] so the sweep keeps working on a fresh or
/// mis-edited installation.
pub async fn tolerance_days(config: &dyn ConfigStore) -> Result<i64, DuesError> {
    match config.get(TOLERANCE_DAYS_KEY).await? {
        Some(entry) => Ok(entry.as_i64().unwrap_or_else(|| {
            tracing::warn!(
                key = TOLERANCE_DAYS_KEY,
                value = %entry.value,
                "tolerance value is not a number, using default"
            );
            DEFAULT_TOLERANCE_DAYS
        })),
        None => Ok(DEFAULT_TOLERANCE_DAYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_i64_parses_numbers() {
        let entry = ConfigEntry::new(TOLERANCE_DAYS_KEY, "7", ConfigValueType::Number);
        assert_eq!(entry.as_i64(), Some(7));

        let entry = ConfigEntry::new(TOLERANCE_DAYS_KEY, " 3 ", ConfigValueType::Number);
        assert_eq!(entry.as_i64(), Some(3));

        let entry = ConfigEntry::new(TOLERANCE_DAYS_KEY, "soon", ConfigValueType::Number);
        assert_eq!(entry.as_i64(), None);
    }

    #[test]
    fn test_value_type_round_trip() {
        for value_type in [
            ConfigValueType::Text,
            ConfigValueType::Number,
            ConfigValueType::Boolean,
            ConfigValueType::Json,
        ] {
            assert_eq!(
                value_type.as_str().parse::<ConfigValueType>().unwrap(),
                value_type
            );
        }
    }
}
