mod noise;
mod signal;

pub use noise::{
    AdditiveNoiseConfig, BaselineWanderConfig, ImpulseNoiseConfig, MainsConfig, NoiseConfig,
    RespirationConfig, apply_noise, signal_power,
};
pub use signal::{
    PULSE_SUPPORT_WIDTHS, QRS_WIDTH_SECONDS, beat_indices, beat_times_evenly_spaced,
    beat_times_for_heart_rate, generate_ecg, generate_record, ricker,
};
