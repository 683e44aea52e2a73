//! Calibrated detector geometry and per-image grazing-incidence state.

use log::warn;
use ndarray::Array2;

use super::orientation::SampleOrientation;
use super::GeometryError;
use crate::data::HeaderValue;
use crate::units::{q_to_twotheta, Unit, UnitError};

/// Bin count used when a range cannot produce a usable one.
pub const DEFAULT_BIN_COUNT: u32 = 1000;

/// Calibrated detector geometry plus the per-image grazing-incidence angles.
///
/// The calibration-derived fields (distance, pixel pitch, wavelength, shape)
/// are immutable after construction; the incident and tilt angles vary
/// shot-to-shot and are updated per processed image. Batch workers each hold
/// their own clone so no angle update is ever shared between images.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryState {
    /// Sample-detector distance in metres.
    distance: f64,
    /// Pixel pitch in metres.
    pixel_pitch: f64,
    /// Beam wavelength in metres. Zero or negative means "uncalibrated":
    /// q↔2θ conversions fail, native-unit operations still run.
    wavelength: f64,
    /// Detector shape as (rows, cols).
    detector_shape: (usize, usize),
    /// Grazing incident angle in radians.
    incident_angle: f64,
    /// Sample tilt angle in radians.
    tilt_angle: f64,
    /// Orientation of the sample axes on the detector.
    sample_orientation: SampleOrientation,
}

impl GeometryState {
    /// Create a geometry from calibration-loader output.
    ///
    /// Angles start at zero and the orientation at code 1; both are mutated
    /// later by per-image updates and explicit orientation toggles.
    pub fn new(
        distance: f64,
        pixel_pitch: f64,
        wavelength: f64,
        detector_shape: (usize, usize),
    ) -> Self {
        Self {
            distance,
            pixel_pitch,
            wavelength,
            detector_shape,
            incident_angle: 0.0,
            tilt_angle: 0.0,
            sample_orientation: SampleOrientation::Parallel,
        }
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn pixel_pitch(&self) -> f64 {
        self.pixel_pitch
    }

    #[inline]
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    #[inline]
    pub fn detector_shape(&self) -> (usize, usize) {
        self.detector_shape
    }

    /// Grazing incident angle in radians.
    #[inline]
    pub fn incident_angle(&self) -> f64 {
        self.incident_angle
    }

    /// Sample tilt angle in radians.
    #[inline]
    pub fn tilt_angle(&self) -> f64 {
        self.tilt_angle
    }

    #[inline]
    pub fn sample_orientation(&self) -> SampleOrientation {
        self.sample_orientation
    }

    /// Whether q↔2θ conversions are available.
    #[inline]
    pub fn has_wavelength(&self) -> bool {
        self.wavelength > 0.0
    }

    /// Set the incident angle from a value in degrees.
    pub fn set_incident_angle_deg(&mut self, degrees: f64) {
        self.incident_angle = degrees.to_radians();
    }

    /// Set the tilt angle from a value in degrees.
    pub fn set_tilt_angle_deg(&mut self, degrees: f64) {
        self.tilt_angle = degrees.to_radians();
    }

    /// Update the incident angle from a raw header value (degrees).
    ///
    /// Grazing-incidence metadata is frequently malformed or absent;
    /// missing or unparsable values fall back to 0.0 with a warning rather
    /// than failing the image.
    pub fn set_incident_angle_from_header(&mut self, value: Option<&HeaderValue>) {
        self.incident_angle = angle_from_header(value, "incident angle");
    }

    /// Update the tilt angle from a raw header value (degrees).
    pub fn set_tilt_angle_from_header(&mut self, value: Option<&HeaderValue>) {
        self.tilt_angle = angle_from_header(value, "tilt angle");
    }

    /// Set the sample orientation from a stored code.
    pub fn set_sample_orientation(&mut self, code: u8) -> Result<(), GeometryError> {
        self.sample_orientation = SampleOrientation::from_code(code)?;
        Ok(())
    }

    /// Set the sample orientation from the qz/qr axis-direction toggles.
    pub fn set_axis_directions(&mut self, qz_parallel: bool, qr_parallel: bool) {
        self.sample_orientation = SampleOrientation::resolve(qz_parallel, qr_parallel);
    }

    /// Compute the bin count covering a physical range at this geometry's
    /// pixel pitch.
    ///
    /// Both endpoints are converted to 2θ and the count is
    /// `round(distance/pixel_pitch · (tan θ₂ − tan θ₁))`. Degenerate ranges
    /// and failed conversions fall back to [`DEFAULT_BIN_COUNT`] with a
    /// warning; the kernel is never handed a zero or negative count.
    pub fn calculate_bins(&self, range: (f64, f64), unit: Unit) -> u32 {
        match self.twotheta_bounds(range, unit) {
            Ok((t1, t2)) => {
                let bins = (self.distance / self.pixel_pitch * (t2.tan() - t1.tan())).round();
                if bins.is_finite() && bins >= 1.0 {
                    bins as u32
                } else {
                    warn!(
                        "range {:?} {} yields no usable bin count, falling back to {}",
                        range, unit, DEFAULT_BIN_COUNT
                    );
                    DEFAULT_BIN_COUNT
                }
            }
            Err(err) => {
                warn!(
                    "bin count for range {:?} {} unavailable ({}), falling back to {}",
                    range, unit, err, DEFAULT_BIN_COUNT
                );
                DEFAULT_BIN_COUNT
            }
        }
    }

    /// Convert a range's endpoints to 2θ in radians.
    fn twotheta_bounds(&self, range: (f64, f64), unit: Unit) -> Result<(f64, f64), UnitError> {
        match unit {
            Unit::TthRad => Ok(range),
            Unit::TthDeg => Ok((range.0.to_radians(), range.1.to_radians())),
            q_unit => Ok((
                q_to_twotheta(range.0, q_unit, self.wavelength)?,
                q_to_twotheta(range.1, q_unit, self.wavelength)?,
            )),
        }
    }

    /// Regular grid of 1-based pixel-index coordinates over the detector.
    ///
    /// Returns the (row, column) index arrays in row-major layout. Pure
    /// function of the detector shape.
    pub fn coordinate_grid(&self) -> Result<(Array2<f64>, Array2<f64>), GeometryError> {
        let (rows, cols) = self.detector_shape;
        if rows == 0 || cols == 0 {
            return Err(GeometryError::NotCalibrated("detector shape is unset"));
        }
        let d1 = Array2::from_shape_fn((rows, cols), |(r, _)| (r + 1) as f64);
        let d2 = Array2::from_shape_fn((rows, cols), |(_, c)| (c + 1) as f64);
        Ok((d1, d2))
    }
}

/// Parse an angle header value in degrees, defaulting to 0.0.
fn angle_from_header(value: Option<&HeaderValue>, label: &str) -> f64 {
    match value.and_then(|v| v.as_f64()) {
        Some(degrees) => degrees.to_radians(),
        None => {
            warn!("missing or unparsable {label} header, defaulting to 0.0");
            0.0
        }
    }
}
