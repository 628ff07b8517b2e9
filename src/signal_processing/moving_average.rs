use crate::error::{QrsError, Result};

/// Causal moving-window integrator
///
/// Output is the sum of the last `window_size` inputs divided by
/// `window_size`; before the window has filled, missing samples count as
/// zero. The sum is updated incrementally and recomputed from the window
/// contents once per revolution of the circular buffer, so rounding error
/// cannot accumulate over long streams.
pub struct WindowIntegrator {
    buffer: Vec<f64>,
    index: usize,
    sum: f64,
}

impl WindowIntegrator {
    /// Create a new integrator
    ///
    /// # Arguments
    /// * `window_size` - Number of samples in the window (at least 1)
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: vec![0.0; window_size.max(1)],
            index: 0,
            sum: 0.0,
        }
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    /// Add a new value and return the updated window average
    pub fn add(&mut self, value: f64) -> f64 {
        let leaving = self.buffer[self.index];
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.buffer.len();

        if self.index == 0 {
            self.sum = self.buffer.iter().sum();
        } else {
            self.sum += value - leaving;
        }

        self.average()
    }

    /// Current window average without adding a new value
    pub fn average(&self) -> f64 {
        self.sum / self.buffer.len() as f64
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
        self.sum = 0.0;
    }
}

/// Integrate a whole energy sequence with a window of `window_samples`
///
/// The output has the same length as the input.
///
/// # Errors
/// * `QrsError::InvalidParameter` if `window_samples` is zero
/// * `QrsError::InsufficientSignalLength` if the input is shorter than
///   one window
pub fn integrate(energy: &[f64], window_samples: usize) -> Result<Vec<f64>> {
    if window_samples == 0 {
        return Err(QrsError::InvalidParameter(
            "integration window must be at least one sample".to_string(),
        ));
    }
    if energy.len() < window_samples {
        return Err(QrsError::InsufficientSignalLength {
            needed: window_samples,
            available: energy.len(),
        });
    }

    let mut integrator = WindowIntegrator::new(window_samples);
    Ok(energy.iter().map(|&x| integrator.add(x)).collect())
}

/// Delay of a moving average in samples (its centre of mass)
pub fn integration_delay(window_samples: usize) -> usize {
    window_samples / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_windows_divide_by_full_size() {
        let mut integrator = WindowIntegrator::new(4);

        assert_relative_eq!(integrator.add(4.0), 1.0);
        assert_relative_eq!(integrator.add(4.0), 2.0);
        assert_relative_eq!(integrator.add(4.0), 3.0);
        assert_relative_eq!(integrator.add(4.0), 4.0);
        assert_relative_eq!(integrator.add(0.0), 3.0); // (4+4+4+0)/4
    }

    #[test]
    fn test_integrate_matches_direct_sum() {
        let x: Vec<f64> = (0..100).map(|i| ((i * 7) % 13) as f64 * 0.1).collect();
        let w = 8;
        let y = integrate(&x, w).unwrap();

        for (i, &value) in y.iter().enumerate() {
            let start = (i + 1).saturating_sub(w);
            let direct: f64 = x[start..=i].iter().sum::<f64>() / w as f64;
            assert_relative_eq!(value, direct, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_long_stream_does_not_drift() {
        let mut integrator = WindowIntegrator::new(32);
        for i in 0..1_000_000 {
            integrator.add(if i % 3 == 0 { 1e6 } else { 1e-6 });
        }
        for _ in 0..32 {
            integrator.add(0.0);
        }
        assert_eq!(integrator.average(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut integrator = WindowIntegrator::new(3);
        integrator.add(9.0);
        integrator.reset();
        assert_eq!(integrator.average(), 0.0);
        assert_relative_eq!(integrator.add(3.0), 1.0);
    }

    #[test]
    fn test_integrate_errors() {
        assert!(matches!(
            integrate(&[1.0; 10], 0),
            Err(QrsError::InvalidParameter(_))
        ));
        assert!(matches!(
            integrate(&[1.0; 10], 11),
            Err(QrsError::InsufficientSignalLength {
                needed: 11,
                available: 10
            })
        ));
    }

    #[test]
    fn test_integration_delay() {
        assert_eq!(integration_delay(32), 16);
        assert_eq!(integration_delay(320), 160);
        assert_eq!(integration_delay(27), 13);
    }
}
