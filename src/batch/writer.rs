//! Output writer boundary.

use std::collections::HashMap;

use crate::data::IntegrationResult;

/// Error raised by the external writer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("write failed: {0}")]
pub struct WriteError(pub String);

/// Consumer of finished reduction profiles.
///
/// Formatting (delimited text with a metadata header block) is the writer's
/// concern; the core only hands over the coordinate/intensity vectors and a
/// metadata map describing how they were produced.
pub trait ResultWriter: Send + Sync {
    fn write(
        &self,
        image_id: &str,
        request_name: &str,
        result: &IntegrationResult,
        metadata: &HashMap<String, String>,
    ) -> Result<(), WriteError>;
}
