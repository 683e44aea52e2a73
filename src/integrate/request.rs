//! Integration job description and validation.

use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// Description of one integration job.
///
/// Requests come from user-editable presets (JSON) or are built inline by
/// the host application. A request is immutable once validated; the
/// dispatcher only accepts [`ValidatedRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum IntegrationRequest {
    /// Azimuthal (cake) integration: intensity versus the radial coordinate
    /// inside an azimuthal wedge.
    Azimuthal {
        /// Radial range, in `unit`.
        radial_range: (f64, f64),
        /// Azimuthal wedge in degrees, domain [-180, 180].
        azimuth_range: (f64, f64),
        unit: Unit,
        /// 0 or absent means auto-compute from the geometry.
        #[serde(default)]
        bin_count: Option<i64>,
    },
    /// Radial (chi) integration: intensity versus azimuth at a fixed radial
    /// range.
    Radial {
        radial_range: (f64, f64),
        azimuth_range: (f64, f64),
        unit: Unit,
        #[serde(default)]
        bin_count: Option<i64>,
    },
    /// Box projection along the in-plane direction.
    BoxHorizontal {
        /// In-plane range, in `input_unit`.
        ip_range: (f64, f64),
        /// Out-of-plane range, in `input_unit`.
        oop_range: (f64, f64),
        input_unit: Unit,
        output_unit: Unit,
        #[serde(default)]
        bin_count: Option<i64>,
    },
    /// Box projection along the out-of-plane direction.
    BoxVertical {
        ip_range: (f64, f64),
        oop_range: (f64, f64),
        input_unit: Unit,
        output_unit: Unit,
        #[serde(default)]
        bin_count: Option<i64>,
    },
}

impl IntegrationRequest {
    /// Wire name of this request variant.
    pub fn variant_name(&self) -> &'static str {
        match self {
            IntegrationRequest::Azimuthal { .. } => "azimuthal",
            IntegrationRequest::Radial { .. } => "radial",
            IntegrationRequest::BoxHorizontal { .. } => "box_horizontal",
            IntegrationRequest::BoxVertical { .. } => "box_vertical",
        }
    }

    /// Unit of the result's coordinate vector.
    pub fn output_unit(&self) -> Unit {
        match self {
            IntegrationRequest::Azimuthal { unit, .. }
            | IntegrationRequest::Radial { unit, .. } => *unit,
            IntegrationRequest::BoxHorizontal { output_unit, .. }
            | IntegrationRequest::BoxVertical { output_unit, .. } => *output_unit,
        }
    }

    fn ranges(&self) -> [(f64, f64); 2] {
        match self {
            IntegrationRequest::Azimuthal {
                radial_range,
                azimuth_range,
                ..
            }
            | IntegrationRequest::Radial {
                radial_range,
                azimuth_range,
                ..
            } => [*radial_range, *azimuth_range],
            IntegrationRequest::BoxHorizontal {
                ip_range, oop_range, ..
            }
            | IntegrationRequest::BoxVertical {
                ip_range, oop_range, ..
            } => [*ip_range, *oop_range],
        }
    }

    fn raw_bin_count(&self) -> Option<i64> {
        match self {
            IntegrationRequest::Azimuthal { bin_count, .. }
            | IntegrationRequest::Radial { bin_count, .. }
            | IntegrationRequest::BoxHorizontal { bin_count, .. }
            | IntegrationRequest::BoxVertical { bin_count, .. } => *bin_count,
        }
    }

    /// Validate the request, producing the only form the dispatcher runs.
    pub fn validate(self) -> Result<ValidatedRequest, ValidationError> {
        for (lo, hi) in self.ranges() {
            if !(lo < hi) {
                return Err(ValidationError::RangeInverted { lo, hi });
            }
        }

        let bin_count = match self.raw_bin_count() {
            None | Some(0) => None,
            Some(n) if n < 0 => return Err(ValidationError::NegativeBins(n)),
            Some(n) => Some(n as u32),
        };

        Ok(ValidatedRequest {
            request: self,
            bin_count,
        })
    }
}

/// Request rejected before any kernel call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Range start is not below range end (NaN endpoints land here too).
    #[error("range start {lo} is not below range end {hi}")]
    RangeInverted { lo: f64, hi: f64 },
    /// A unit string resolved to no canonical unit.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),
    /// Explicit negative bin count.
    #[error("negative bin count: {0}")]
    NegativeBins(i64),
}

/// Resolve a unit string for request construction, strict policy.
pub fn resolve_unit(input: &str) -> Result<Unit, ValidationError> {
    crate::units::resolve_alias(input).map_err(|_| ValidationError::UnknownUnit(input.to_string()))
}

/// A request that passed validation.
///
/// The bin count is normalized: `None` means auto-compute from the geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    request: IntegrationRequest,
    bin_count: Option<u32>,
}

impl ValidatedRequest {
    #[inline]
    pub fn request(&self) -> &IntegrationRequest {
        &self.request
    }

    #[inline]
    pub fn bin_count(&self) -> Option<u32> {
        self.bin_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azimuthal(bin_count: Option<i64>) -> IntegrationRequest {
        IntegrationRequest::Azimuthal {
            radial_range: (0.1, 1.0),
            azimuth_range: (-10.0, 10.0),
            unit: Unit::QNm,
            bin_count,
        }
    }

    #[test]
    fn test_valid_request() {
        let validated = azimuthal(Some(500)).validate().unwrap();
        assert_eq!(validated.bin_count(), Some(500));
        assert_eq!(validated.request().variant_name(), "azimuthal");
    }

    #[test]
    fn test_zero_or_absent_bins_mean_auto() {
        assert_eq!(azimuthal(None).validate().unwrap().bin_count(), None);
        assert_eq!(azimuthal(Some(0)).validate().unwrap().bin_count(), None);
    }

    #[test]
    fn test_negative_bins_rejected() {
        assert_eq!(
            azimuthal(Some(-5)).validate(),
            Err(ValidationError::NegativeBins(-5))
        );
    }

    #[test]
    fn test_inverted_primary_range_rejected() {
        let request = IntegrationRequest::Azimuthal {
            radial_range: (1.0, 0.1),
            azimuth_range: (-10.0, 10.0),
            unit: Unit::QNm,
            bin_count: None,
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::RangeInverted { .. })
        ));
    }

    #[test]
    fn test_inverted_secondary_range_rejected() {
        let request = IntegrationRequest::BoxVertical {
            ip_range: (1.0, 2.0),
            oop_range: (4.0, 3.0),
            input_unit: Unit::QNm,
            output_unit: Unit::QNm,
            bin_count: None,
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::RangeInverted { lo, hi } ) if lo == 4.0 && hi == 3.0
        ));
    }

    #[test]
    fn test_nan_endpoint_rejected() {
        let request = IntegrationRequest::Azimuthal {
            radial_range: (f64::NAN, 1.0),
            azimuth_range: (-10.0, 10.0),
            unit: Unit::QNm,
            bin_count: None,
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::RangeInverted { .. })
        ));
    }

    #[test]
    fn test_resolve_unit_strict() {
        assert_eq!(resolve_unit("Q_NM^-1").unwrap(), Unit::QNm);
        assert_eq!(
            resolve_unit("lightyear"),
            Err(ValidationError::UnknownUnit("lightyear".into()))
        );
    }

    #[test]
    fn test_output_unit() {
        let boxed = IntegrationRequest::BoxHorizontal {
            ip_range: (1.0, 2.0),
            oop_range: (3.0, 4.0),
            input_unit: Unit::QNm,
            output_unit: Unit::QA,
            bin_count: None,
        };
        assert_eq!(boxed.output_unit(), Unit::QA);
        assert_eq!(azimuthal(None).output_unit(), Unit::QNm);
    }
}
