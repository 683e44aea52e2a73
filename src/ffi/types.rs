//! C-compatible type definitions for FFI.

use crate::geometry::GeometryError;
use crate::units::UnitError;

/// Result status codes for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GixsStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer was passed.
    NullPointer = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 3,
    /// Unit string resolved to no canonical unit.
    UnknownUnit = 4,
    /// Wavelength missing for a q↔2θ conversion.
    MissingWavelength = 5,
    /// Sample orientation code outside 1..=4.
    InvalidOrientation = 6,
    /// Geometry field needed by the operation is unset.
    NotCalibrated = 7,
}

impl From<&UnitError> for GixsStatus {
    fn from(err: &UnitError) -> Self {
        match err {
            UnitError::UnknownUnit(_) => GixsStatus::UnknownUnit,
            UnitError::MissingWavelength => GixsStatus::MissingWavelength,
            UnitError::NotReciprocal(_) => GixsStatus::InvalidArgument,
        }
    }
}

impl From<&GeometryError> for GixsStatus {
    fn from(err: &GeometryError) -> Self {
        match err {
            GeometryError::NotCalibrated(_) => GixsStatus::NotCalibrated,
            GeometryError::InvalidOrientation(_) => GixsStatus::InvalidOrientation,
        }
    }
}
