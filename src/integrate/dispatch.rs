//! Integration dispatch.
//!
//! One dispatcher covers all four request variants. The per-variant kernel
//! argument ordering lives in an explicit table ([`BoxDispatch`] and the
//! radial swap) because the orderings are load-bearing: the kernel reads
//! the scanned axis first and silently produces wrong profiles if the
//! ranges arrive swapped.

use std::sync::Arc;

use log::debug;
use ndarray::Array2;

use super::kernel::{IntegrationKernel, ProcessMode, POLARIZATION_FACTOR};
use super::request::{IntegrationRequest, ValidatedRequest, ValidationError};
use crate::data::IntegrationResult;
use crate::geometry::{GeometryError, GeometryState};
use crate::units::{convert, Direction, Unit, UnitError};

/// Errors raised while running one integration job.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The numerical kernel rejected the call. Not retried; the batch layer
    /// decides whether to skip or abort.
    #[error("kernel failed: {0}")]
    KernelFailed(String),
}

/// Kernel argument plan for one box variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxDispatch {
    mode: ProcessMode,
    direction: Direction,
    /// Whether the in-plane range is the primary (first) kernel argument.
    ip_first: bool,
}

/// Horizontal boxes scan in-plane: ipbox mode, in-plane range first.
const BOX_HORIZONTAL: BoxDispatch = BoxDispatch {
    mode: ProcessMode::IpBox,
    direction: Direction::Horizontal,
    ip_first: true,
};

/// Vertical boxes scan out-of-plane: opbox mode, out-of-plane range first.
const BOX_VERTICAL: BoxDispatch = BoxDispatch {
    mode: ProcessMode::OpBox,
    direction: Direction::Vertical,
    ip_first: false,
};

/// Runs validated integration requests against the numerical kernel.
#[derive(Clone)]
pub struct IntegrationDispatcher {
    kernel: Arc<dyn IntegrationKernel>,
}

impl IntegrationDispatcher {
    pub fn new(kernel: Arc<dyn IntegrationKernel>) -> Self {
        Self { kernel }
    }

    /// Run one integration job.
    ///
    /// Resolves ranges and units into the kernel's expectations for the
    /// request variant, computes the bin count when the request left it to
    /// the geometry, and converts the coordinate vector back into the
    /// requested output unit.
    pub fn run(
        &self,
        request: &ValidatedRequest,
        geometry: &GeometryState,
        image: &Array2<f64>,
        normalization_factor: f64,
    ) -> Result<IntegrationResult, IntegrationError> {
        match request.request() {
            IntegrationRequest::Azimuthal {
                radial_range,
                azimuth_range,
                unit,
                ..
            } => {
                let bins = request
                    .bin_count()
                    .unwrap_or_else(|| geometry.calculate_bins(*radial_range, *unit));
                let (y, x) = self.call(
                    ProcessMode::Sector,
                    image,
                    bins,
                    *radial_range,
                    *azimuth_range,
                    *unit,
                    normalization_factor,
                )?;
                // Sector output is already in the requested unit.
                Ok(IntegrationResult::new(x, y))
            }
            IntegrationRequest::Radial {
                radial_range,
                azimuth_range,
                unit,
                ..
            } => {
                let bins = request
                    .bin_count()
                    .unwrap_or_else(|| geometry.calculate_bins(*radial_range, *unit));
                // Chi mode wants the azimuth window first and the radial
                // range second. The swap relative to Sector is load-bearing.
                let (y, x) = self.call(
                    ProcessMode::Chi,
                    image,
                    bins,
                    *azimuth_range,
                    *radial_range,
                    *unit,
                    normalization_factor,
                )?;
                Ok(IntegrationResult::new(x, y))
            }
            IntegrationRequest::BoxHorizontal {
                ip_range,
                oop_range,
                input_unit,
                output_unit,
                ..
            } => self.run_box(
                BOX_HORIZONTAL,
                *ip_range,
                *oop_range,
                *input_unit,
                *output_unit,
                request.bin_count(),
                geometry,
                image,
                normalization_factor,
            ),
            IntegrationRequest::BoxVertical {
                ip_range,
                oop_range,
                input_unit,
                output_unit,
                ..
            } => self.run_box(
                BOX_VERTICAL,
                *ip_range,
                *oop_range,
                *input_unit,
                *output_unit,
                request.bin_count(),
                geometry,
                image,
                normalization_factor,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_box(
        &self,
        plan: BoxDispatch,
        ip_range: (f64, f64),
        oop_range: (f64, f64),
        input_unit: Unit,
        output_unit: Unit,
        bin_count: Option<u32>,
        geometry: &GeometryState,
        image: &Array2<f64>,
        normalization_factor: f64,
    ) -> Result<IntegrationResult, IntegrationError> {
        let ip_native = to_native(ip_range, input_unit, plan.direction, geometry)?;
        let oop_native = to_native(oop_range, input_unit, plan.direction, geometry)?;

        let (primary, secondary) = if plan.ip_first {
            (ip_native, oop_native)
        } else {
            (oop_native, ip_native)
        };

        let bins =
            bin_count.unwrap_or_else(|| geometry.calculate_bins(primary, Unit::QNm));

        let (y, x) = self.call(
            plan.mode,
            image,
            bins,
            primary,
            secondary,
            Unit::QNm,
            normalization_factor,
        )?;

        let x = if output_unit == Unit::QNm {
            x
        } else {
            convert(&x, Unit::QNm, output_unit, plan.direction, geometry)?
        };

        Ok(IntegrationResult::new(x, y))
    }

    #[allow(clippy::too_many_arguments)]
    fn call(
        &self,
        mode: ProcessMode,
        image: &Array2<f64>,
        bins: u32,
        primary_range: (f64, f64),
        secondary_range: (f64, f64),
        unit: Unit,
        normalization_factor: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), IntegrationError> {
        debug!(
            "kernel call: mode={} bins={} primary={:?} secondary={:?} unit={}",
            mode.name(),
            bins,
            primary_range,
            secondary_range,
            unit
        );
        let (y, x) = self
            .kernel
            .integrate_1d(
                mode,
                image,
                bins,
                primary_range,
                secondary_range,
                unit,
                normalization_factor,
                POLARIZATION_FACTOR,
            )
            .map_err(|err| IntegrationError::KernelFailed(err.to_string()))?;
        if y.len() != x.len() {
            return Err(IntegrationError::KernelFailed(format!(
                "kernel returned mismatched vectors: y={}, x={}",
                y.len(),
                x.len()
            )));
        }
        Ok((y, x))
    }
}

/// Convert one range into the kernel's native unit (q, nm⁻¹).
///
/// Ranges already in the native unit pass through untouched, which lets
/// native-unit box jobs run on an uncalibrated geometry.
fn to_native(
    range: (f64, f64),
    unit: Unit,
    direction: Direction,
    geometry: &GeometryState,
) -> Result<(f64, f64), UnitError> {
    if unit == Unit::QNm {
        return Ok(range);
    }
    let v = convert(&[range.0, range.1], unit, Unit::QNm, direction, geometry)?;
    Ok((v[0], v[1]))
}
