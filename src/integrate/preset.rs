//! Preset store boundary.
//!
//! Named integration requests are persisted by the host application as JSON
//! documents. The core only defines the wire shape and the strict parse:
//! unit strings go through alias resolution, and an unknown unit fails the
//! parse instead of defaulting.

use serde::{Deserialize, Serialize};

use super::request::IntegrationRequest;

/// A named, user-editable integration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPreset {
    pub name: String,
    #[serde(flatten)]
    pub request: IntegrationRequest,
}

/// Error raised while reading or writing a preset document.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("malformed preset document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON array of presets.
pub fn parse_presets(json: &str) -> Result<Vec<RequestPreset>, PresetError> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize presets back to their JSON document form.
pub fn presets_to_json(presets: &[RequestPreset]) -> Result<String, PresetError> {
    Ok(serde_json::to_string_pretty(presets)?)
}
