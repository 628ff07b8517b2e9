use crate::constants::DERIVATIVE_OFFSET;
use crate::error::{QrsError, Result};

/// Squared, normalised five-point derivative of a conditioned signal
///
/// The input is scaled by its largest magnitude, differentiated with
///
/// `d[n] = (x[n+2] + 2*x[n+1] - x[n-2] - 2*x[n-1]) / 8`
///
/// for `n` in `[2, len - 3]`, scaled again by the largest derivative
/// magnitude and squared. The output is `len - 4` samples long; output
/// index `m` corresponds to input index `m + DERIVATIVE_OFFSET`.
///
/// # Errors
/// * `QrsError::InsufficientSignalLength` for fewer than five samples
/// * `QrsError::DegenerateSignal` if the input or its derivative is
///   identically zero
pub fn derivative_energy(filtered: &[f64]) -> Result<Vec<f64>> {
    let needed = 2 * DERIVATIVE_OFFSET + 1;
    if filtered.len() < needed {
        return Err(QrsError::InsufficientSignalLength {
            needed,
            available: filtered.len(),
        });
    }

    let scale = max_abs(filtered);
    if scale == 0.0 {
        return Err(QrsError::DegenerateSignal(
            "conditioned signal is identically zero".to_string(),
        ));
    }
    let x: Vec<f64> = filtered.iter().map(|v| v / scale).collect();

    let slope: Vec<f64> = x
        .windows(2 * DERIVATIVE_OFFSET + 1)
        .map(|w| (w[4] + 2.0 * w[3] - w[0] - 2.0 * w[1]) / 8.0)
        .collect();

    let slope_scale = max_abs(&slope);
    if slope_scale == 0.0 {
        return Err(QrsError::DegenerateSignal(
            "conditioned signal has no slope".to_string(),
        ));
    }

    Ok(slope
        .iter()
        .map(|d| {
            let v = d / slope_scale;
            v * v
        })
        .collect())
}

fn max_abs(x: &[f64]) -> f64 {
    x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_output_is_four_samples_shorter() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).sin()).collect();
        let energy = derivative_energy(&x).unwrap();
        assert_eq!(energy.len(), 46);
    }

    #[test]
    fn test_ramp_has_constant_slope() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let energy = derivative_energy(&x).unwrap();
        for v in energy {
            assert_relative_eq!(v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_energy_peaks_at_steepest_point() {
        // Step from 0 to 1 between indices 9 and 10
        let x: Vec<f64> = (0..20).map(|i| if i >= 10 { 1.0 } else { 0.0 }).collect();
        let energy = derivative_energy(&x).unwrap();

        // Raw slopes 1/8, 3/8, 3/8, 1/8 around the step
        assert_relative_eq!(energy[9 - DERIVATIVE_OFFSET], 1.0);
        assert_relative_eq!(energy[10 - DERIVATIVE_OFFSET], 1.0);
        assert_relative_eq!(energy[8 - DERIVATIVE_OFFSET], 1.0 / 9.0, epsilon = 1e-12);
        assert_relative_eq!(energy[11 - DERIVATIVE_OFFSET], 1.0 / 9.0, epsilon = 1e-12);
        assert_eq!(energy[0], 0.0);
        assert!(energy.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_scale_invariance() {
        let x: Vec<f64> = (0..64).map(|i| ((i * i) % 17) as f64 - 8.0).collect();
        let scaled: Vec<f64> = x.iter().map(|v| v * 8.0).collect();
        assert_eq!(
            derivative_energy(&x).unwrap(),
            derivative_energy(&scaled).unwrap()
        );
    }

    #[test]
    fn test_zero_signal_is_degenerate() {
        assert!(matches!(
            derivative_energy(&[0.0; 32]),
            Err(QrsError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn test_constant_signal_is_degenerate() {
        assert!(matches!(
            derivative_energy(&[3.0; 32]),
            Err(QrsError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            derivative_energy(&[1.0, 2.0, 3.0, 4.0]),
            Err(QrsError::InsufficientSignalLength {
                needed: 5,
                available: 4
            })
        ));
    }
}
