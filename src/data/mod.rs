//! Data structures for detector-image reduction.

pub mod image;
pub mod metadata;
pub mod result;

pub use image::DetectorImage;
pub use metadata::{HeaderKeys, HeaderValue, MapMetadata, MetadataError, MetadataProvider};
pub use result::IntegrationResult;
