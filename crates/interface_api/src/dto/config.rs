//! Configuration request/response types

use chrono::{DateTime, Utc};
use domain_dues::{ConfigEntry, ConfigValueType};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for creating a configuration entry
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConfigRequest {
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    #[validate(length(min = 1, max = 1000))]
    pub value: String,
    pub value_type: ConfigValueType,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Body for updating an entry's value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConfigRequest {
    #[validate(length(min = 1, max = 1000))]
    pub value: String,
}

/// A configuration entry as served by the API
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub key: String,
    pub value: String,
    pub value_type: ConfigValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigEntry> for ConfigResponse {
    fn from(entry: ConfigEntry) -> Self {
        Self {
            key: entry.key,
            value: entry.value,
            value_type: entry.value_type,
            description: entry.description,
            updated_at: entry.updated_at,
        }
    }
}
