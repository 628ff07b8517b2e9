use super::filter::Filter;
use super::iir_butterworth::ZeroPhaseButterworth;
use super::notch::MainsNotch;
use super::recursive::{RecursiveHighpass, RecursiveLowpass};
use crate::config::DetectorConfig;
use crate::constants::HIGHPASS_TAPS;
use crate::error::{QrsError, Result};

/// Which band-pass implementation conditioned a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPath {
    /// Fixed recursive low-pass + high-pass pair at the reference rate
    Reference,
    /// Zero-phase Butterworth pair at any other rate
    Butterworth,
}

/// Band-passed signal together with the delay the filters introduced
#[derive(Debug, Clone)]
pub struct Conditioned {
    pub samples: Vec<f64>,
    /// Group delay in samples
    pub delay: usize,
    pub path: FilterPath,
}

/// Remove baseline wander and high-frequency noise
///
/// Signals sampled at `config.reference.sample_rate` go through the
/// recursive integer filters; everything else through the zero-phase
/// Butterworth pair. An optional mains notch runs first on either path.
///
/// # Errors
/// * `QrsError::InvalidParameter` for a non-positive rate or cutoffs that
///   do not fit below the Nyquist frequency
/// * `QrsError::InsufficientSignalLength` if the signal is shorter than the
///   chosen filters need
pub fn condition(samples: &[f64], sample_rate: f64, config: &DetectorConfig) -> Result<Conditioned> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(QrsError::InvalidParameter(format!(
            "sampling rate must be positive, got {}",
            sample_rate
        )));
    }

    let path = if config.reference.matches(sample_rate) {
        FilterPath::Reference
    } else {
        FilterPath::Butterworth
    };

    let needed = min_len(path, config);
    if samples.len() < needed {
        return Err(QrsError::InsufficientSignalLength {
            needed,
            available: samples.len(),
        });
    }

    let input = match config.notch_hz {
        Some(notch_hz) => MainsNotch::new(notch_hz, sample_rate)?.apply(samples),
        None => samples.to_vec(),
    };

    let conditioned = match path {
        FilterPath::Reference => {
            let lowpassed = RecursiveLowpass::new().apply(&input);
            Conditioned {
                samples: RecursiveHighpass::new().apply(&lowpassed),
                delay: config.reference.delay(),
                path,
            }
        }
        FilterPath::Butterworth => {
            let bp = &config.bandpass;
            let highpassed =
                ZeroPhaseButterworth::highpass(bp.low_hz, sample_rate, bp.order)?.apply(&input)?;
            let bandpassed = ZeroPhaseButterworth::lowpass(bp.high_hz, sample_rate, bp.order)?
                .apply(&highpassed)?;
            Conditioned {
                samples: bandpassed,
                delay: (bp.delay_seconds * sample_rate).round() as usize,
                path,
            }
        }
    };

    log::debug!(
        "Conditioned {} samples at {} Hz via {:?} path, delay {} samples",
        samples.len(),
        sample_rate,
        conditioned.path,
        conditioned.delay
    );

    Ok(conditioned)
}

/// Shortest signal the given filter path accepts
pub fn min_len(path: FilterPath, config: &DetectorConfig) -> usize {
    match path {
        FilterPath::Reference => HIGHPASS_TAPS + 1,
        FilterPath::Butterworth => ZeroPhaseButterworth::min_len(config.bandpass.order),
    }
}
