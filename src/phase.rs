use anyhow::{anyhow, Result};
use nalgebra::{Complex, DVector};
use ndarray::Array1;

/// Element-wise argument of a complex estimator, radians by default or
/// degrees when `deg` is set. Pure transform with no error conditions.
pub fn complex_to_phase_values(complex_estimator: &DVector<Complex<f64>>, deg: bool) -> Array1<f64> {
    Array1::from_iter(complex_estimator.iter().map(|component| {
        if deg {
            component.arg().to_degrees()
        } else {
            component.arg()
        }
    }))
}

/// Rotates the estimator so the reference component lands on phase zero.
///
/// The eigenvector method recovers phases only up to a global complex gauge;
/// anchoring one monitor (conventionally the one whose true phase is zero)
/// removes it.
pub fn align_to_reference(
    estimator: &DVector<Complex<f64>>,
    reference: usize,
) -> Result<DVector<Complex<f64>>> {
    let anchor = *estimator.get(reference).ok_or_else(|| {
        anyhow!(
            "Reference index {} out of bounds for estimator of length {}",
            reference,
            estimator.len()
        )
    })?;
    let modulus = anchor.norm();
    if modulus == 0.0 {
        return Err(anyhow!(
            "Reference component {} has zero modulus, gauge is undefined",
            reference
        ));
    }
    let gauge = (anchor / modulus).conj();
    Ok(estimator.map(|component| component * gauge))
}

/// Smallest absolute angular difference between two phases, honouring the
/// wrap-around of the circle.
pub fn wrapped_phase_error(a: f64, b: f64, deg: bool) -> f64 {
    let full_turn = if deg { 360.0 } else { std::f64::consts::TAU };
    let difference = (a - b).rem_euclid(full_turn);
    difference.min(full_turn - difference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_values_match_component_arguments() {
        let estimator = DVector::from_vec(vec![
            Complex::from_polar(1.0, 0.0),
            Complex::from_polar(1.0, 0.5),
            Complex::from_polar(1.0, -1.25),
        ]);
        let radians = complex_to_phase_values(&estimator, false);
        assert!((radians[0] - 0.0).abs() < 1e-12);
        assert!((radians[1] - 0.5).abs() < 1e-12);
        assert!((radians[2] + 1.25).abs() < 1e-12);

        let degrees = complex_to_phase_values(&estimator, true);
        assert!((degrees[1] - 0.5f64.to_degrees()).abs() < 1e-12);
    }

    #[test]
    fn alignment_zeroes_the_reference_phase() {
        let estimator = DVector::from_vec(vec![
            Complex::from_polar(1.0, 0.7),
            Complex::from_polar(1.0, 1.2),
            Complex::from_polar(1.0, 2.9),
        ]);
        let aligned = align_to_reference(&estimator, 0).expect("valid reference");
        assert!(aligned[0].arg().abs() < 1e-12);
        assert!((aligned[1].arg() - 0.5).abs() < 1e-12);
        assert!((aligned[2].arg() - 2.2).abs() < 1e-12);
    }

    #[test]
    fn alignment_rejects_out_of_bounds_reference() {
        let estimator = DVector::from_element(2, Complex::new(1.0, 0.0));
        assert!(align_to_reference(&estimator, 5).is_err());
    }

    #[test]
    fn alignment_rejects_zero_modulus_reference() {
        let estimator = DVector::from_vec(vec![Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)]);
        assert!(align_to_reference(&estimator, 0).is_err());
    }

    #[test]
    fn wrapped_error_handles_circle_crossing() {
        assert!((wrapped_phase_error(359.0, 1.0, true) - 2.0).abs() < 1e-12);
        assert!((wrapped_phase_error(1.0, 359.0, true) - 2.0).abs() < 1e-12);
        assert!((wrapped_phase_error(180.0, -180.0, true) - 0.0).abs() < 1e-12);
        let radians = wrapped_phase_error(std::f64::consts::PI - 0.1, -std::f64::consts::PI, false);
        assert!((radians - 0.1).abs() < 1e-9);
    }
}
