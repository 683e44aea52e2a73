//! Numerical integration kernel boundary.
//!
//! The binning/weighting engine is an external collaborator. The core
//! configures it (mode, ranges, bin count, unit) and consumes its
//! (intensity, coordinate) output; the numerics inside are a black box.

use ndarray::Array2;

use crate::units::Unit;

/// Fixed polarization correction handed to the kernel. Opaque to the core.
pub const POLARIZATION_FACTOR: f64 = 0.99;

/// Reduction mode understood by the numerical kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub enum ProcessMode {
    /// Azimuthal (cake) integration over a radial range.
    Sector,
    /// Radial (chi) integration over an azimuthal range.
    Chi,
    /// In-plane box projection.
    IpBox,
    /// Out-of-plane box projection.
    OpBox,
}

impl ProcessMode {
    /// Wire name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            ProcessMode::Sector => "sector",
            ProcessMode::Chi => "chi",
            ProcessMode::IpBox => "ipbox",
            ProcessMode::OpBox => "opbox",
        }
    }
}

/// Failure reported by the numerical kernel.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct KernelError(pub String);

/// Black-box 1D reduction engine.
pub trait IntegrationKernel: Send + Sync {
    /// Reduce a 2D image to a 1D profile.
    ///
    /// Returns `(y_vector, x_vector)`: intensity first, coordinate second,
    /// with the coordinate in `unit`.
    #[allow(clippy::too_many_arguments)]
    fn integrate_1d(
        &self,
        mode: ProcessMode,
        image: &Array2<f64>,
        bin_count: u32,
        primary_range: (f64, f64),
        secondary_range: (f64, f64),
        unit: Unit,
        normalization_factor: f64,
        polarization_factor: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), KernelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(ProcessMode::Sector.name(), "sector");
        assert_eq!(ProcessMode::Chi.name(), "chi");
        assert_eq!(ProcessMode::IpBox.name(), "ipbox");
        assert_eq!(ProcessMode::OpBox.name(), "opbox");
    }
}
