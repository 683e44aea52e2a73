//! Unit system for scattering coordinates.
//!
//! Reduction results are indexed either by the scattering-vector modulus q
//! (inverse length) or by the scattering angle 2θ. This module owns the
//! canonical unit identifiers, the alias tables that map free-form unit
//! strings from presets and headers onto them, and the conversions between
//! them.

pub mod convert;

pub use convert::{convert, q_to_twotheta, twotheta_to_q};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical unit of a reduction coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub enum Unit {
    /// Scattering vector modulus in inverse nanometres.
    QNm,
    /// Scattering vector modulus in inverse angstroms.
    QA,
    /// Scattering angle 2θ in degrees.
    TthDeg,
    /// Scattering angle 2θ in radians.
    TthRad,
}

/// Which q component a conversion refers to on the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Alias tables, checked in order. An input string resolves to the first
/// unit whose alias it contains (case-insensitive). The tables are fixed at
/// compile time and never mutated.
static ALIAS_TABLE: &[(Unit, &[&str])] = &[
    (Unit::QNm, &["q_nm^-1", "q_nm", "nm^-1", "nm-1"]),
    (Unit::QA, &["q_a^-1", "q_a", "a^-1", "a-1", "angstrom"]),
    (Unit::TthDeg, &["2th_deg", "tth_deg", "2theta_deg", "deg"]),
    (Unit::TthRad, &["2th_rad", "tth_rad", "2theta_rad", "rad"]),
];

impl Unit {
    /// Canonical name, also used on the preset-store wire.
    pub fn name(&self) -> &'static str {
        match self {
            Unit::QNm => "q_nm^-1",
            Unit::QA => "q_A^-1",
            Unit::TthDeg => "2th_deg",
            Unit::TthRad => "2th_rad",
        }
    }

    /// Whether this unit indexes reciprocal space.
    #[inline]
    pub fn is_q(&self) -> bool {
        matches!(self, Unit::QNm | Unit::QA)
    }

    /// Scale factor K from this q unit to m⁻¹ (None for angular units).
    #[inline]
    pub(crate) fn q_scale(&self) -> Option<f64> {
        match self {
            Unit::QNm => Some(1e9),
            Unit::QA => Some(1e10),
            _ => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by unit resolution and conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// Input string matched no alias of any canonical unit.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),
    /// A q↔2θ conversion was requested without a positive wavelength.
    #[error("wavelength is missing or non-positive")]
    MissingWavelength,
    /// A q-space operation was handed an angular unit.
    #[error("{0} is not a q unit")]
    NotReciprocal(&'static str),
}

/// Resolve a free-form unit string to a canonical unit.
///
/// Matching is a case-insensitive containment check against the fixed alias
/// tables. Unresolved strings are an error; there is no fallback unit.
pub fn resolve_alias(input: &str) -> Result<Unit, UnitError> {
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(UnitError::UnknownUnit(input.to_string()));
    }
    for (unit, aliases) in ALIAS_TABLE {
        if aliases.iter().any(|alias| needle.contains(alias)) {
            return Ok(*unit);
        }
    }
    Err(UnitError::UnknownUnit(input.to_string()))
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        resolve_alias(&raw).map_err(D::Error::custom)
    }
}
