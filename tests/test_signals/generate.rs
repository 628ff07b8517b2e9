#![allow(dead_code)]

/// Width of the synthetic QRS pulse in seconds
const PULSE_WIDTH_SECS: f64 = 0.01;

/// Gaussian second-derivative pulse, peak 1 at the centre
fn pulse(t: f64) -> f64 {
    let u = t / PULSE_WIDTH_SECS;
    (1.0 - u * u) * (-0.5 * u * u).exp()
}

/// Flat baseline with one pulse of the given amplitude at each beat time
///
/// Pulses are only evaluated within five widths of their centre, so the
/// baseline between beats is exactly zero.
pub fn pulse_train_with_amplitudes(
    duration_secs: f64,
    sample_rate: f64,
    beats: &[(f64, f64)],
) -> Vec<f64> {
    let num_samples = (duration_secs * sample_rate).round() as usize;
    let mut samples = vec![0.0; num_samples];
    let reach = (5.0 * PULSE_WIDTH_SECS * sample_rate).ceil() as isize;

    for &(time, amplitude) in beats {
        let centre = (time * sample_rate).round() as isize;
        for i in (centre - reach).max(0)..(centre + reach + 1).min(num_samples as isize) {
            let t = i as f64 / sample_rate - time;
            if t.abs() <= 5.0 * PULSE_WIDTH_SECS {
                samples[i as usize] += amplitude * pulse(t);
            }
        }
    }

    samples
}

/// Gaussian first-derivative pulses with unit peak, sigma `sigma_secs`
///
/// The extremum sits one sigma before each beat time; support is five
/// sigmas on either side, with an exactly flat baseline elsewhere.
pub fn gaussian_derivative_train(
    duration_secs: f64,
    sample_rate: f64,
    beat_times: &[f64],
    sigma_secs: f64,
) -> Vec<f64> {
    let num_samples = (duration_secs * sample_rate).round() as usize;
    let mut samples = vec![0.0; num_samples];
    let support = 5.0 * sigma_secs;
    let reach = (support * sample_rate).ceil() as isize;

    for &time in beat_times {
        let centre = (time * sample_rate).round() as isize;
        for i in (centre - reach).max(0)..(centre + reach + 1).min(num_samples as isize) {
            let t = i as f64 / sample_rate - time;
            if t.abs() <= support {
                let u = t / sigma_secs;
                samples[i as usize] += -u * (0.5 - 0.5 * u * u).exp();
            }
        }
    }

    samples
}

/// Pulse train with unit amplitude
pub fn pulse_train(duration_secs: f64, sample_rate: f64, beat_times: &[f64]) -> Vec<f64> {
    let beats: Vec<(f64, f64)> = beat_times.iter().map(|&t| (t, 1.0)).collect();
    pulse_train_with_amplitudes(duration_secs, sample_rate, &beats)
}

/// `count` times starting at `first`, `interval` apart
pub fn evenly_spaced(count: usize, first: f64, interval: f64) -> Vec<f64> {
    (0..count).map(|k| first + k as f64 * interval).collect()
}

/// Nearest sample index of each beat time
pub fn beat_indices(beat_times: &[f64], sample_rate: f64) -> Vec<usize> {
    beat_times
        .iter()
        .map(|&t| (t * sample_rate).round() as usize)
        .collect()
}
