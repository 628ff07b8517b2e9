use super::localizer::{drop_negligible, localize_with_deviation, strictly_increasing};
use super::threshold::AdaptiveThreshold;
use crate::config::{DetectorConfig, seconds_to_samples};
use crate::constants::{DERIVATIVE_OFFSET, MIN_RELATIVE_DEVIATION};
use crate::error::{QrsError, Result};
use crate::signal::Signal;
use crate::signal_processing::{
    FilterPath, condition, derivative_energy, integrate, integration_delay,
};

/// Outcome of one detection run
///
/// Besides the beat positions the intermediate sequences are kept so
/// callers can plot or inspect each stage.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Refined beat indices into the input signal, strictly increasing
    pub peaks: Vec<usize>,
    /// Threshold detector output in integrated-signal coordinates
    pub raw_peaks: Vec<usize>,
    /// Conditioner delay plus integrator delay, in samples
    pub total_delay: usize,
    /// Band-passed signal
    pub conditioned: Vec<f64>,
    /// Which band-pass produced `conditioned`
    pub filter_path: FilterPath,
    /// Moving-window integrated slope energy
    pub integrated: Vec<f64>,
}

impl Detection {
    /// Beat times in seconds
    pub fn times(&self, sample_rate: f64) -> Vec<f64> {
        self.peaks
            .iter()
            .map(|&i| i as f64 / sample_rate)
            .collect()
    }
}

/// Batch QRS detector
///
/// # Example
/// ```
/// use qrsdetect::{DetectorConfig, QrsDetector, Signal};
///
/// let detector = QrsDetector::new(DetectorConfig::default()).unwrap();
/// let flat = Signal::new(vec![0.0; 2000], 200.0).unwrap();
/// assert!(detector.detect(&flat).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct QrsDetector {
    config: DetectorConfig,
}

impl QrsDetector {
    /// Create a detector after validating `config`
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run every stage over `signal`
    ///
    /// # Errors
    /// * `QrsError::InsufficientSignalLength` if any stage lacks samples
    /// * `QrsError::DegenerateSignal` for a flat signal
    /// * `QrsError::InvalidParameter` if durations collapse to unusable
    ///   sample counts at this rate
    pub fn detect(&self, signal: &Signal) -> Result<Detection> {
        let rate = signal.sample_rate();
        let config = &self.config;

        let conditioned = condition(signal.samples(), rate, config)?;
        let energy = derivative_energy(&conditioned.samples)?;

        let window = seconds_to_samples(config.window_seconds, rate);
        let integrated = integrate(&energy, window)?;

        let min_rr = seconds_to_samples(config.min_rr_seconds, rate);
        let max_rr = seconds_to_samples(config.max_rr_seconds, rate);
        let mut detector = AdaptiveThreshold::new(min_rr, max_rr)?;
        if let Some(learning) = config.learning_seconds {
            detector = detector.with_learning(seconds_to_samples(learning, rate));
        }
        let raw_peaks = detector.detect(&integrated)?;

        let total_delay = conditioned.delay + integration_delay(window);
        let aligned = align(&raw_peaks, total_delay, signal.len())?;

        let radius = seconds_to_samples(config.search_radius_seconds, rate);
        let picks = localize_with_deviation(signal.samples(), &aligned, radius)?;
        let peaks = strictly_increasing(&drop_negligible(&picks, MIN_RELATIVE_DEVIATION));

        log::debug!(
            "Detected {} beats in {:.1} s ({} candidates, delay {} samples)",
            peaks.len(),
            signal.duration_secs(),
            raw_peaks.len(),
            total_delay
        );
        if peaks.is_empty() {
            log::warn!("No beats found in {:.1} s of signal", signal.duration_secs());
        }

        Ok(Detection {
            peaks,
            raw_peaks,
            total_delay,
            conditioned: conditioned.samples,
            filter_path: conditioned.path,
            integrated,
        })
    }
}

/// Move integrated-signal indices back onto the input timeline
///
/// Adds the derivative offset, subtracts the accumulated delay and clips
/// the result to `[0, len)`.
fn align(candidates: &[usize], total_delay: usize, len: usize) -> Result<Vec<usize>> {
    let last = len.checked_sub(1).ok_or(QrsError::InsufficientSignalLength {
        needed: 1,
        available: 0,
    })?;

    Ok(candidates
        .iter()
        .map(|&c| {
            (c + DERIVATIVE_OFFSET)
                .saturating_sub(total_delay)
                .min(last)
        })
        .collect())
}

/// Detect beats with the default configuration
///
/// Returns strictly increasing sample indices into `samples`.
pub fn detect_beats(samples: &[f64], sample_rate: f64) -> Result<Vec<usize>> {
    let signal = Signal::new(samples.to_vec(), sample_rate)?;
    let detector = QrsDetector::new(DetectorConfig::default())?;
    Ok(detector.detect(&signal)?.peaks)
}
