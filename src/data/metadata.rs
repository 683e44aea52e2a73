//! Header-metadata boundary.
//!
//! Per-image header values (incident angle, tilt angle, normalization,
//! exposure time) come from an external metadata collaborator. The core
//! only sees the [`MetadataProvider`] trait; missing values degrade to
//! documented defaults while provider errors fail the affected image.

use std::collections::HashMap;

/// A raw header value as delivered by the provider.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Number(f64),
    Text(String),
}

impl HeaderValue {
    /// Interpret the value as a float, if possible.
    ///
    /// Text values are trim-parsed; header text is frequently padded.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Number(v) => Some(*v),
            HeaderValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Error raised when the provider itself fails (unreadable file, broken
/// connection). Distinct from a merely missing value, which is `Ok(None)`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("metadata read failed for {image_id}/{key}: {reason}")]
pub struct MetadataError {
    pub image_id: String,
    pub key: String,
    pub reason: String,
}

/// Supplier of per-image header metadata.
pub trait MetadataProvider: Send + Sync {
    /// Read one header value for one image.
    ///
    /// `Ok(None)` means the key is absent; callers apply their documented
    /// defaults. `Err` means the image's metadata could not be read at all.
    fn header_value(
        &self,
        image_id: &str,
        key: &str,
    ) -> Result<Option<HeaderValue>, MetadataError>;
}

/// Names of the header fields the batch runner reads per image.
#[derive(Clone, Debug)]
pub struct HeaderKeys {
    pub incident_angle: String,
    pub tilt_angle: String,
    pub normalization: String,
    pub exposure_time: String,
}

impl Default for HeaderKeys {
    fn default() -> Self {
        Self {
            incident_angle: "incident_angle".into(),
            tilt_angle: "tilt_angle".into(),
            normalization: "norm".into(),
            exposure_time: "exposure_time".into(),
        }
    }
}

/// In-memory provider backed by a map, keyed by (image id, header key).
///
/// Used by embedders that decode headers up front, and by tests.
#[derive(Clone, Debug, Default)]
pub struct MapMetadata {
    values: HashMap<(String, String), HeaderValue>,
}

impl MapMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header value for an image.
    pub fn insert(
        &mut self,
        image_id: impl Into<String>,
        key: impl Into<String>,
        value: HeaderValue,
    ) {
        self.values.insert((image_id.into(), key.into()), value);
    }
}

impl MetadataProvider for MapMetadata {
    fn header_value(
        &self,
        image_id: &str,
        key: &str,
    ) -> Result<Option<HeaderValue>, MetadataError> {
        Ok(self
            .values
            .get(&(image_id.to_string(), key.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_parsing() {
        assert_eq!(HeaderValue::Number(0.25).as_f64(), Some(0.25));
        assert_eq!(HeaderValue::Text(" 0.25 ".into()).as_f64(), Some(0.25));
        assert_eq!(HeaderValue::Text("n/a".into()).as_f64(), None);
    }

    #[test]
    fn test_map_metadata_lookup() {
        let mut provider = MapMetadata::new();
        provider.insert("img_001", "incident_angle", HeaderValue::Number(0.3));

        let hit = provider.header_value("img_001", "incident_angle").unwrap();
        assert_eq!(hit, Some(HeaderValue::Number(0.3)));

        let miss = provider.header_value("img_001", "tilt_angle").unwrap();
        assert_eq!(miss, None);
    }
}
