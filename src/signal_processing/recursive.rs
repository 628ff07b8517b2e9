use super::filter::{Filter, History};
use crate::constants::{HIGHPASS_TAPS, LOWPASS_TAPS};

/// Integer-coefficient recursive low-pass filter
///
/// `y[n] = 2*y[n-1] - y[n-2] + x[n] - 2*x[n-6] + x[n-12]`
///
/// Designed for 200 Hz ECG (cutoff around 11 Hz, DC gain 36). Taps that
/// reach before the start of the stream contribute zero, so output at
/// index `n` depends only on samples up to `n`.
#[derive(Debug, Clone)]
pub struct RecursiveLowpass {
    input: History,
    y1: f64,
    y2: f64,
}

impl RecursiveLowpass {
    pub fn new() -> Self {
        Self {
            input: History::new(LOWPASS_TAPS + 1),
            y1: 0.0,
            y2: 0.0,
        }
    }
}

impl Default for RecursiveLowpass {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for RecursiveLowpass {
    fn process(&mut self, sample: f64) -> f64 {
        self.input.push(sample);
        let y = 2.0 * self.y1 - self.y2 + sample - 2.0 * self.input.get(6)
            + self.input.get(LOWPASS_TAPS);
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.input.clear();
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Integer-coefficient recursive high-pass filter
///
/// `y[n] = -x[n] - y[n-1] + 32*x[n-16] + x[n-32]`
///
/// Applied to the low-pass output; nominal group delay 16 samples.
#[derive(Debug, Clone)]
pub struct RecursiveHighpass {
    input: History,
    y1: f64,
}

impl RecursiveHighpass {
    pub fn new() -> Self {
        Self {
            input: History::new(HIGHPASS_TAPS + 1),
            y1: 0.0,
        }
    }
}

impl Default for RecursiveHighpass {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for RecursiveHighpass {
    fn process(&mut self, sample: f64) -> f64 {
        self.input.push(sample);
        let y = -sample - self.y1 + 32.0 * self.input.get(16) + self.input.get(HIGHPASS_TAPS);
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.input.clear();
        self.y1 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct transcription of the difference equation with explicit
    /// bounds checks, used as the batch reference.
    fn lowpass_reference(x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; x.len()];
        for n in 0..x.len() {
            let mut v = x[n];
            if n >= 1 {
                v += 2.0 * y[n - 1];
            }
            if n >= 2 {
                v -= y[n - 2];
            }
            if n >= 6 {
                v -= 2.0 * x[n - 6];
            }
            if n >= 12 {
                v += x[n - 12];
            }
            y[n] = v;
        }
        y
    }

    fn highpass_reference(x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; x.len()];
        for n in 0..x.len() {
            let mut v = -x[n];
            if n >= 1 {
                v -= y[n - 1];
            }
            if n >= 16 {
                v += 32.0 * x[n - 16];
            }
            if n >= 32 {
                v += x[n - 32];
            }
            y[n] = v;
        }
        y
    }

    fn test_input() -> Vec<f64> {
        (0..200)
            .map(|i| ((i * 37) % 11) as f64 - 5.0 + if i == 60 { 40.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_lowpass_matches_difference_equation() {
        let x = test_input();
        let y = RecursiveLowpass::new().apply(&x);
        assert_eq!(y, lowpass_reference(&x));
    }

    #[test]
    fn test_highpass_matches_difference_equation() {
        let x = test_input();
        let y = RecursiveHighpass::new().apply(&x);
        assert_eq!(y, highpass_reference(&x));
    }

    #[test]
    fn test_lowpass_impulse_response_is_finite() {
        let mut x = vec![0.0; 40];
        x[0] = 1.0;
        let y = RecursiveLowpass::new().apply(&x);

        // Triangular response 1, 2, .., 6, .., 1 followed by exact zeros
        let expected = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(&y[..11], &expected);
        assert!(y[11..].iter().all(|&v| v == 0.0));
        assert_eq!(y.iter().sum::<f64>(), 36.0);
    }

    #[test]
    fn test_reset_restarts_stream() {
        let x = test_input();
        let mut filter = RecursiveHighpass::new();
        let first = filter.apply(&x);
        filter.reset();
        let second = filter.apply(&x);
        assert_eq!(first, second);
    }
}
