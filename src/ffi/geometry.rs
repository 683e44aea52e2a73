//! FFI functions for geometry management.

use std::ffi::{c_char, CStr};

use super::types::GixsStatus;
use crate::geometry::GeometryState;
use crate::units::resolve_alias;

/// Opaque handle to a GeometryState.
pub type GeometryHandle = *mut GeometryState;

/// Create a geometry from calibration values.
///
/// # Safety
/// out_handle must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_create(
    distance: f64,
    pixel_pitch: f64,
    wavelength: f64,
    rows: usize,
    cols: usize,
    out_handle: *mut GeometryHandle,
) -> GixsStatus {
    if out_handle.is_null() {
        return GixsStatus::NullPointer;
    }

    let geometry = GeometryState::new(distance, pixel_pitch, wavelength, (rows, cols));
    *out_handle = Box::into_raw(Box::new(geometry));

    GixsStatus::Ok
}

/// Free a geometry handle.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_free(handle: GeometryHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Set the incident angle in degrees.
///
/// # Safety
/// Handle must be valid.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_set_incident_angle(
    handle: GeometryHandle,
    degrees: f64,
) -> GixsStatus {
    if handle.is_null() {
        return GixsStatus::NullPointer;
    }
    (*handle).set_incident_angle_deg(degrees);
    GixsStatus::Ok
}

/// Set the tilt angle in degrees.
///
/// # Safety
/// Handle must be valid.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_set_tilt_angle(
    handle: GeometryHandle,
    degrees: f64,
) -> GixsStatus {
    if handle.is_null() {
        return GixsStatus::NullPointer;
    }
    (*handle).set_tilt_angle_deg(degrees);
    GixsStatus::Ok
}

/// Set the sample orientation from a stored code (1..=4).
///
/// # Safety
/// Handle must be valid.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_set_orientation(
    handle: GeometryHandle,
    code: u8,
) -> GixsStatus {
    if handle.is_null() {
        return GixsStatus::NullPointer;
    }
    match (*handle).set_sample_orientation(code) {
        Ok(()) => GixsStatus::Ok,
        Err(err) => GixsStatus::from(&err),
    }
}

/// Set the sample orientation from the qz/qr axis-direction toggles.
///
/// # Safety
/// Handle must be valid.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_set_axis_directions(
    handle: GeometryHandle,
    qz_parallel: bool,
    qr_parallel: bool,
) -> GixsStatus {
    if handle.is_null() {
        return GixsStatus::NullPointer;
    }
    (*handle).set_axis_directions(qz_parallel, qr_parallel);
    GixsStatus::Ok
}

/// Compute the bin count for a physical range.
///
/// The unit is given as a string and resolved through the alias tables.
///
/// # Safety
/// Handle, unit, and out_bins must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn gixs_geometry_calculate_bins(
    handle: GeometryHandle,
    range_lo: f64,
    range_hi: f64,
    unit: *const c_char,
    out_bins: *mut u32,
) -> GixsStatus {
    if handle.is_null() || unit.is_null() || out_bins.is_null() {
        return GixsStatus::NullPointer;
    }

    let unit_str = match CStr::from_ptr(unit).to_str() {
        Ok(s) => s,
        Err(_) => return GixsStatus::InvalidUtf8,
    };
    let unit = match resolve_alias(unit_str) {
        Ok(unit) => unit,
        Err(err) => return GixsStatus::from(&err),
    };

    *out_bins = (*handle).calculate_bins((range_lo, range_hi), unit);
    GixsStatus::Ok
}
