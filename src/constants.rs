//! Fixed constants of the detection pipeline
//!
//! Values here are properties of the algorithm rather than tuning knobs;
//! tunable parameters live in [`crate::config`].

/// Samples lost at each end of the five-point derivative.
/// Derivative output index `m` corresponds to conditioned index `m + 2`.
pub const DERIVATIVE_OFFSET: usize = 2;

/// Longest input tap of the fixed recursive low-pass filter.
pub const LOWPASS_TAPS: usize = 12;

/// Longest input tap of the fixed recursive high-pass filter.
pub const HIGHPASS_TAPS: usize = 32;

/// Neighbour distance used by the detector's local-maximum test.
pub const LOCAL_MAX_REACH: usize = 2;

/// Bandwidth parameter of the mains-rejection notch.
pub const NOTCH_MU: f64 = 0.005;

/// Weight of a new peak in the signal/noise running estimates.
pub const PEAK_WEIGHT: f64 = 0.125;

/// Weight of a peak recovered during search-back.
pub const SEARCHBACK_PEAK_WEIGHT: f64 = 0.25;

/// Fraction of the signal/noise gap placed above the noise level.
pub const THRESHOLD_FRACTION: f64 = 0.25;

/// Refined peaks deviating less than this fraction of the strongest one are
/// discarded as picks on flat baseline.
pub const MIN_RELATIVE_DEVIATION: f64 = 0.05;
