//! Conversions between q and 2θ coordinates.

use std::f64::consts::PI;

use super::{Direction, Unit, UnitError};
use crate::geometry::GeometryState;

/// Convert a q value to the scattering angle 2θ in radians.
///
/// Computes `2·asin(q·λ·K/(4π))` with K the unit scale (1e9 for nm⁻¹,
/// 1e10 for Å⁻¹). Outside the asin domain the result is NaN and is
/// propagated as-is: a q beyond the wavelength's reach points at a bad
/// calibration upstream and must stay visible.
pub fn q_to_twotheta(q: f64, unit: Unit, wavelength: f64) -> Result<f64, UnitError> {
    if wavelength <= 0.0 {
        return Err(UnitError::MissingWavelength);
    }
    let scale = unit
        .q_scale()
        .ok_or(UnitError::NotReciprocal(unit.name()))?;
    Ok(2.0 * (q * wavelength * scale / (4.0 * PI)).asin())
}

/// Convert a scattering angle 2θ to a q component.
///
/// With θ = 2θ/2, λ_nm = λ·1e9 and k = 4π/λ_nm the two components are
///
/// ```text
/// q_horizontal = k·cos(α)·sin(θ)
/// q_vertical   = k·(sin(θ) + sin(α))
/// ```
///
/// where α is the grazing incident angle. The `direction` labels are
/// crossed on purpose: `Vertical` selects the horizontal component and
/// `Horizontal` the vertical one. The box-integration call sites were
/// written against this mapping and the contract is pinned by
/// `tests::test_direction_labels_are_crossed`.
pub fn twotheta_to_q(
    twotheta: f64,
    degree_input: bool,
    direction: Direction,
    incident_angle: f64,
    wavelength: f64,
    output_unit: Unit,
) -> Result<f64, UnitError> {
    if wavelength <= 0.0 {
        return Err(UnitError::MissingWavelength);
    }
    let out_scale = output_unit
        .q_scale()
        .ok_or(UnitError::NotReciprocal(output_unit.name()))?;

    let tth = if degree_input {
        twotheta.to_radians()
    } else {
        twotheta
    };
    let theta = 0.5 * tth;
    let wavelength_nm = wavelength * 1e9;
    let k = 4.0 * PI / wavelength_nm;

    let q_horizontal = k * incident_angle.cos() * theta.sin();
    let q_vertical = k * (theta.sin() + incident_angle.sin());

    let q_nm = match direction {
        Direction::Vertical => q_horizontal,
        Direction::Horizontal => q_vertical,
    };

    Ok(q_nm * 1e9 / out_scale)
}

/// Convert a coordinate vector between units.
///
/// Identity when the units match, a pure rescale within q or within 2θ, and
/// a routed q↔2θ conversion otherwise, using the geometry's wavelength and
/// incident angle. Errors if the geometry cannot support the requested
/// route (missing wavelength).
pub fn convert(
    values: &[f64],
    from: Unit,
    to: Unit,
    direction: Direction,
    geometry: &GeometryState,
) -> Result<Vec<f64>, UnitError> {
    if from == to {
        return Ok(values.to_vec());
    }

    match (from.is_q(), to.is_q()) {
        (true, true) => {
            // q_nm^-1 <-> q_A^-1 is a factor of 10.
            let factor = from.q_scale().unwrap_or(1.0) / to.q_scale().unwrap_or(1.0);
            Ok(values.iter().map(|v| v * factor).collect())
        }
        (false, false) => {
            let deg_to_rad = from == Unit::TthDeg;
            Ok(values
                .iter()
                .map(|v| if deg_to_rad { v.to_radians() } else { v.to_degrees() })
                .collect())
        }
        (true, false) => {
            let wavelength = geometry.wavelength();
            values
                .iter()
                .map(|&q| {
                    let tth = q_to_twotheta(q, from, wavelength)?;
                    Ok(if to == Unit::TthDeg { tth.to_degrees() } else { tth })
                })
                .collect()
        }
        (false, true) => values
            .iter()
            .map(|&tth| {
                twotheta_to_q(
                    tth,
                    from == Unit::TthDeg,
                    direction,
                    geometry.incident_angle(),
                    geometry.wavelength(),
                    to,
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry(wavelength: f64) -> GeometryState {
        GeometryState::new(0.2, 1e-4, wavelength, (10, 10))
    }

    #[test]
    fn test_q_twotheta_round_trip() {
        let wavelength = 1.0e-10;
        for q in [0.1, 1.0, 10.0] {
            let tth = q_to_twotheta(q, Unit::QNm, wavelength).unwrap();
            for direction in [Direction::Horizontal, Direction::Vertical] {
                let back =
                    twotheta_to_q(tth, false, direction, 0.0, wavelength, Unit::QNm).unwrap();
                assert_relative_eq!(back, q, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_missing_wavelength_fails_loudly() {
        assert_eq!(
            q_to_twotheta(1.0, Unit::QNm, 0.0),
            Err(UnitError::MissingWavelength)
        );
        assert_eq!(
            twotheta_to_q(0.1, false, Direction::Vertical, 0.0, -1.0, Unit::QNm),
            Err(UnitError::MissingWavelength)
        );
    }

    #[test]
    fn test_out_of_domain_q_propagates_nan() {
        // q·λ·K/(4π) > 1: no scattering angle exists. NaN, not a clamp.
        let tth = q_to_twotheta(1e4, Unit::QNm, 1.0e-10).unwrap();
        assert!(tth.is_nan());
    }

    #[test]
    fn test_direction_labels_are_crossed() {
        // Regression pin: with a non-zero incident angle the two components
        // differ, and Vertical must return the horizontal one.
        let wavelength = 1.0e-10;
        let incident = 0.2_f64;
        let tth = 0.05_f64;
        let theta = 0.5 * tth;
        let k = 4.0 * PI / (wavelength * 1e9);

        let expected_horizontal = k * incident.cos() * theta.sin();
        let expected_vertical = k * (theta.sin() + incident.sin());

        let v = twotheta_to_q(tth, false, Direction::Vertical, incident, wavelength, Unit::QNm)
            .unwrap();
        let h = twotheta_to_q(tth, false, Direction::Horizontal, incident, wavelength, Unit::QNm)
            .unwrap();

        assert_relative_eq!(v, expected_horizontal, max_relative = 1e-12);
        assert_relative_eq!(h, expected_vertical, max_relative = 1e-12);
    }

    #[test]
    fn test_degree_input_matches_radian_input() {
        let wavelength = 1.0e-10;
        let a = twotheta_to_q(
            2.8647889757,
            true,
            Direction::Vertical,
            0.0,
            wavelength,
            Unit::QNm,
        )
        .unwrap();
        let b = twotheta_to_q(
            2.8647889757_f64.to_radians(),
            false,
            Direction::Vertical,
            0.0,
            wavelength,
            Unit::QNm,
        )
        .unwrap();
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }

    #[test]
    fn test_convert_identity() {
        let geo = geometry(1.0e-10);
        for unit in [Unit::QNm, Unit::QA, Unit::TthDeg, Unit::TthRad] {
            let values = [0.0, 0.5, 123.456];
            let out = convert(&values, unit, unit, Direction::Vertical, &geo).unwrap();
            assert_eq!(out, values.to_vec());
        }
    }

    #[test]
    fn test_convert_q_scale() {
        let geo = geometry(1.0e-10);
        let to_a = convert(&[1.0], Unit::QNm, Unit::QA, Direction::Vertical, &geo).unwrap();
        assert_relative_eq!(to_a[0], 0.1, max_relative = 1e-12);

        let to_nm = convert(&[0.1], Unit::QA, Unit::QNm, Direction::Vertical, &geo).unwrap();
        assert_relative_eq!(to_nm[0], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_convert_angle_scale() {
        let geo = geometry(1.0e-10);
        let rad = convert(&[180.0], Unit::TthDeg, Unit::TthRad, Direction::Vertical, &geo)
            .unwrap();
        assert_relative_eq!(rad[0], PI, max_relative = 1e-12);
    }

    #[test]
    fn test_convert_q_to_angle_and_back() {
        let geo = geometry(1.0e-10);
        let q = [0.5, 2.0];
        let tth = convert(&q, Unit::QNm, Unit::TthDeg, Direction::Vertical, &geo).unwrap();
        let back = convert(&tth, Unit::TthDeg, Unit::QNm, Direction::Vertical, &geo).unwrap();
        assert_relative_eq!(back[0], q[0], max_relative = 1e-9);
        assert_relative_eq!(back[1], q[1], max_relative = 1e-9);
    }

    #[test]
    fn test_convert_without_wavelength_fails() {
        let geo = geometry(0.0);
        let err = convert(&[1.0], Unit::QNm, Unit::TthDeg, Direction::Vertical, &geo);
        assert_eq!(err, Err(UnitError::MissingWavelength));
    }
}
