//! Sample orientation codes.
//!
//! The four codes encode the reflection combinations of the qz/qr axis
//! directions relative to the detector. They are set only by explicit
//! orientation toggles in the host application, never inferred from data.

use super::GeometryError;

/// Orientation of the sample axes relative to the detector axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SampleOrientation {
    /// qz and qr both parallel to their detector directions (code 1).
    Parallel = 1,
    /// qz parallel, qr mirrored (code 2).
    QrMirrored = 2,
    /// qz mirrored, qr parallel (code 3).
    QzMirrored = 3,
    /// Both axes mirrored (code 4).
    Mirrored = 4,
}

impl SampleOrientation {
    /// Resolve the orientation from the two axis-direction flags.
    ///
    /// Total over the boolean domain; fixed table
    /// (T,T)→1, (T,F)→2, (F,T)→3, (F,F)→4.
    pub fn resolve(qz_parallel: bool, qr_parallel: bool) -> Self {
        match (qz_parallel, qr_parallel) {
            (true, true) => SampleOrientation::Parallel,
            (true, false) => SampleOrientation::QrMirrored,
            (false, true) => SampleOrientation::QzMirrored,
            (false, false) => SampleOrientation::Mirrored,
        }
    }

    /// Construct from a stored orientation code.
    pub fn from_code(code: u8) -> Result<Self, GeometryError> {
        match code {
            1 => Ok(SampleOrientation::Parallel),
            2 => Ok(SampleOrientation::QrMirrored),
            3 => Ok(SampleOrientation::QzMirrored),
            4 => Ok(SampleOrientation::Mirrored),
            other => Err(GeometryError::InvalidOrientation(other)),
        }
    }

    /// The numeric orientation code (1..=4).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether qz runs parallel to its detector direction.
    #[inline]
    pub fn qz_parallel(self) -> bool {
        matches!(
            self,
            SampleOrientation::Parallel | SampleOrientation::QrMirrored
        )
    }

    /// Whether qr runs parallel to its detector direction.
    #[inline]
    pub fn qr_parallel(self) -> bool {
        matches!(
            self,
            SampleOrientation::Parallel | SampleOrientation::QzMirrored
        )
    }
}
