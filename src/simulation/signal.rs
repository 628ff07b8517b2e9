use crate::error::{QrsError, Result};
use crate::record::Record;
use crate::signal::Signal;

/// Width parameter of the synthetic QRS pulse in seconds
pub const QRS_WIDTH_SECONDS: f64 = 0.01;

/// Pulses are evaluated out to this many widths; beyond it the baseline is
/// exactly zero
pub const PULSE_SUPPORT_WIDTHS: f64 = 5.0;

/// Ricker wavelet ("Mexican hat"), the negated second derivative of a
/// Gaussian, normalised to a peak of one at `t = 0`
pub fn ricker(t: f64, width: f64) -> f64 {
    let u = t / width;
    (1.0 - u * u) * (-0.5 * u * u).exp()
}

/// Synthesize an ECG-like trace of QRS pulses on a flat baseline
///
/// # Arguments
/// * `duration_secs` - Length of the trace
/// * `sample_rate` - Sampling rate in Hz
/// * `beat_times` - Pulse centres in seconds
/// * `amplitude` - Peak height of each pulse
pub fn generate_ecg(
    duration_secs: f64,
    sample_rate: f64,
    beat_times: &[f64],
    amplitude: f64,
) -> Vec<f64> {
    let num_samples = (duration_secs * sample_rate).round() as usize;
    let mut samples = vec![0.0; num_samples];
    let support = PULSE_SUPPORT_WIDTHS * QRS_WIDTH_SECONDS;

    for &beat in beat_times {
        let first = ((beat - support) * sample_rate).ceil().max(0.0) as usize;
        let last = (((beat + support) * sample_rate).floor().max(-1.0) + 1.0) as usize;
        for (i, sample) in samples
            .iter_mut()
            .enumerate()
            .take(last.min(num_samples))
            .skip(first)
        {
            let t = i as f64 / sample_rate - beat;
            *sample += amplitude * ricker(t, QRS_WIDTH_SECONDS);
        }
    }

    samples
}

/// `count` beat times starting at `first_secs`, `interval_secs` apart
pub fn beat_times_evenly_spaced(count: usize, first_secs: f64, interval_secs: f64) -> Vec<f64> {
    (0..count)
        .map(|k| first_secs + k as f64 * interval_secs)
        .collect()
}

/// Beat times at a constant heart rate filling `duration_secs`
pub fn beat_times_for_heart_rate(duration_secs: f64, heart_rate_bpm: f64, first_secs: f64) -> Vec<f64> {
    let interval = 60.0 / heart_rate_bpm;
    let count = ((duration_secs - first_secs) / interval).ceil().max(0.0) as usize;
    beat_times_evenly_spaced(count, first_secs, interval)
        .into_iter()
        .filter(|&t| t < duration_secs)
        .collect()
}

/// Nearest sample index of each beat time
pub fn beat_indices(beat_times: &[f64], sample_rate: f64) -> Vec<usize> {
    beat_times
        .iter()
        .map(|&t| (t * sample_rate).round().max(0.0) as usize)
        .collect()
}

/// A synthetic recording annotated with its true beat positions
pub fn generate_record(
    duration_secs: f64,
    sample_rate: f64,
    beat_times: &[f64],
    amplitude: f64,
) -> Result<Record> {
    if !(duration_secs > 0.0) {
        return Err(QrsError::InvalidParameter(format!(
            "duration must be positive, got {}",
            duration_secs
        )));
    }
    let samples = generate_ecg(duration_secs, sample_rate, beat_times, amplitude);
    let len = samples.len();
    let signal = Signal::new(samples, sample_rate)?;
    let annotations = beat_indices(beat_times, sample_rate)
        .into_iter()
        .filter(|&i| i < len)
        .collect();
    Ok(Record::new(signal, annotations))
}
