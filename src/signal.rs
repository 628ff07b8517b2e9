use crate::error::{QrsError, Result};

/// A uniformly sampled single-lead waveform
///
/// Samples are validated once at construction; downstream stages never
/// mutate a `Signal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Create a signal from samples and a sampling rate in Hz
    ///
    /// # Errors
    /// Returns `QrsError::InvalidParameter` if the rate is not a positive
    /// finite number or any sample is NaN or infinite.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(QrsError::InvalidParameter(format!(
                "sampling rate must be positive, got {}",
                sample_rate
            )));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(QrsError::InvalidParameter(format!(
                "sample {} is not finite",
                pos
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Return a copy with every sample multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            samples: self.samples.iter().map(|s| s * factor).collect(),
            sample_rate: self.sample_rate,
        }
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}
