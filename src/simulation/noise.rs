use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Impairments applied to a clean synthetic ECG
///
/// Every section is optional; a default config leaves the signal untouched.
/// Loaded from TOML by the `generate_ecg` binary:
///
/// ```toml
/// seed = 7
///
/// [additive]
/// snr_db = 20.0
///
/// [baseline_wander]
/// amplitude = 0.3
/// frequency_hz = 0.25
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub baseline_wander: Option<BaselineWanderConfig>,
    pub mains: Option<MainsConfig>,
    pub respiration: Option<RespirationConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f64) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_baseline_wander(mut self, amplitude: f64, frequency_hz: f64) -> Self {
        self.baseline_wander = Some(BaselineWanderConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    pub fn with_mains(mut self, frequency_hz: f64, amplitude: f64) -> Self {
        self.mains = Some(MainsConfig {
            frequency_hz,
            amplitude,
        });
        self
    }

    pub fn with_respiration(mut self, depth: f64, frequency_hz: f64) -> Self {
        self.respiration = Some(RespirationConfig {
            depth,
            frequency_hz,
        });
        self
    }

    pub fn with_impulse(mut self, rate_hz: f64, amplitude: f64, duration_samples: usize) -> Self {
        self.impulse = Some(ImpulseNoiseConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

/// White Gaussian noise at a given signal-to-noise ratio
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f64,
}

/// Slow sinusoidal baseline drift (electrode and breathing movement)
#[derive(Clone, Debug, serde::Deserialize)]
pub struct BaselineWanderConfig {
    pub amplitude: f64,
    pub frequency_hz: f64,
}

/// Power-line interference
#[derive(Clone, Debug, serde::Deserialize)]
pub struct MainsConfig {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Amplitude modulation of the complexes by breathing
#[derive(Clone, Debug, serde::Deserialize)]
pub struct RespirationConfig {
    /// Fractional modulation depth, 0 to 1
    pub depth: f64,
    pub frequency_hz: f64,
}

/// Randomly placed rectangular bursts (motion artefacts)
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ImpulseNoiseConfig {
    pub rate_hz: f64,
    pub amplitude: f64,
    pub duration_samples: usize,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

fn apply_additive_noise(signal: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f64.powf(config.snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std) else {
        log::warn!("Skipping additive noise with invalid deviation {}", noise_std);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
}

fn apply_sinusoid(signal: &mut [f64], amplitude: f64, frequency_hz: f64, sample_rate: f64, rng: &mut ChaCha8Rng) {
    let phase: f64 = rng.random::<f64>() * 2.0 * PI;
    let omega = 2.0 * PI * frequency_hz / sample_rate;
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample += amplitude * (omega * i as f64 + phase).sin();
    }
}

fn apply_respiration(signal: &mut [f64], config: &RespirationConfig, sample_rate: f64, rng: &mut ChaCha8Rng) {
    let depth = config.depth.clamp(0.0, 1.0);
    let phase: f64 = rng.random::<f64>() * 2.0 * PI;
    let omega = 2.0 * PI * config.frequency_hz / sample_rate;
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample *= 1.0 - depth * 0.5 * (1.0 + (omega * i as f64 + phase).sin());
    }
}

fn apply_impulse_noise(
    signal: &mut [f64],
    config: &ImpulseNoiseConfig,
    sample_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between_impulses = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f64>() * 2.0 * avg_samples_between_impulses) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

/// Apply every configured impairment to a copy of `clean_signal`
///
/// Multiplicative effects come first so the additive noise level is set
/// relative to the modulated signal.
pub fn apply_noise(clean_signal: &[f64], config: &NoiseConfig, sample_rate: f64) -> Vec<f64> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref respiration) = config.respiration {
        apply_respiration(&mut signal, respiration, sample_rate, &mut rng);
    }

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    if let Some(ref wander) = config.baseline_wander {
        apply_sinusoid(&mut signal, wander.amplitude, wander.frequency_hz, sample_rate, &mut rng);
    }

    if let Some(ref mains) = config.mains {
        apply_sinusoid(&mut signal, mains.amplitude, mains.frequency_hz, sample_rate, &mut rng);
    }

    if let Some(ref impulse_config) = config.impulse {
        apply_impulse_noise(&mut signal, impulse_config, sample_rate, &mut rng);
    }

    signal
}
