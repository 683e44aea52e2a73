//! FFI functions for unit resolution and conversion.

use std::ffi::{c_char, CStr};

use super::types::GixsStatus;
use crate::units::{q_to_twotheta, resolve_alias, twotheta_to_q, Direction, Unit};

/// Resolve a unit string to its canonical unit.
///
/// # Safety
/// name and out_unit must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn gixs_unit_resolve(
    name: *const c_char,
    out_unit: *mut Unit,
) -> GixsStatus {
    if name.is_null() || out_unit.is_null() {
        return GixsStatus::NullPointer;
    }

    let name_str = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return GixsStatus::InvalidUtf8,
    };

    match resolve_alias(name_str) {
        Ok(unit) => {
            *out_unit = unit;
            GixsStatus::Ok
        }
        Err(err) => GixsStatus::from(&err),
    }
}

/// Convert a q value to 2θ in radians.
///
/// # Safety
/// out must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn gixs_q_to_twotheta(
    q: f64,
    unit: Unit,
    wavelength: f64,
    out: *mut f64,
) -> GixsStatus {
    if out.is_null() {
        return GixsStatus::NullPointer;
    }

    match q_to_twotheta(q, unit, wavelength) {
        Ok(twotheta) => {
            *out = twotheta;
            GixsStatus::Ok
        }
        Err(err) => GixsStatus::from(&err),
    }
}

/// Convert a 2θ value to a q component.
///
/// # Safety
/// out must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn gixs_twotheta_to_q(
    twotheta: f64,
    degree_input: bool,
    direction: Direction,
    incident_angle: f64,
    wavelength: f64,
    out_unit: Unit,
    out: *mut f64,
) -> GixsStatus {
    if out.is_null() {
        return GixsStatus::NullPointer;
    }

    match twotheta_to_q(
        twotheta,
        degree_input,
        direction,
        incident_angle,
        wavelength,
        out_unit,
    ) {
        Ok(q) => {
            *out = q;
            GixsStatus::Ok
        }
        Err(err) => GixsStatus::from(&err),
    }
}
