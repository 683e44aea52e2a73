//! Detector geometry and grazing-incidence state.

pub mod orientation;
pub mod state;

pub use orientation::SampleOrientation;
pub use state::{GeometryState, DEFAULT_BIN_COUNT};

/// Errors raised by geometry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// An operation needed a calibration field that is unset.
    #[error("geometry is not calibrated: {0}")]
    NotCalibrated(&'static str),
    /// Sample orientation code outside 1..=4.
    #[error("invalid sample orientation code {0}, expected 1..=4")]
    InvalidOrientation(u8),
}
