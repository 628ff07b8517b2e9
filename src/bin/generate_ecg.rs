use anyhow::{Context, Result};
use clap::Parser;
use qrsdetect::record::{Record, save_wav};
use qrsdetect::signal::Signal;
use qrsdetect::simulation::{
    AdditiveNoiseConfig, MainsConfig, NoiseConfig, apply_noise, beat_times_for_heart_rate,
    generate_record,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate_ecg")]
#[command(about = "Generate synthetic annotated ECG records for detector testing")]
struct Args {
    /// Output file; `.wav` writes audio, anything else the text record format
    output: PathBuf,

    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Heart rate in beats per minute
    #[arg(long, default_value_t = 72.0)]
    heart_rate: f64,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 360)]
    sample_rate: u32,

    /// Peak QRS amplitude
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,

    /// Time of the first beat in seconds
    #[arg(long, default_value_t = 0.3)]
    first_beat: f64,

    /// Seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f64>,

    /// Mains interference frequency in Hz (CLI override)
    #[arg(long)]
    mains_hz: Option<f64>,
}

fn load_noise_config(path: &Path) -> Result<NoiseConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(args: &Args) -> Result<NoiseConfig> {
    let mut config = match args.config {
        Some(ref path) => load_noise_config(path)?,
        None => NoiseConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(snr) = args.snr {
        config.additive = Some(AdditiveNoiseConfig { snr_db: snr });
    }
    if let Some(mains_hz) = args.mains_hz {
        config.mains = Some(MainsConfig {
            frequency_hz: mains_hz,
            amplitude: 0.1 * args.amplitude,
        });
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    if args.heart_rate <= 0.0 {
        anyhow::bail!("Heart rate must be positive");
    }

    let noise_config = build_noise_config(&args)?;
    let sample_rate = args.sample_rate as f64;

    let beat_times = beat_times_for_heart_rate(args.duration, args.heart_rate, args.first_beat);
    let clean = generate_record(args.duration, sample_rate, &beat_times, args.amplitude)?;
    let noisy = apply_noise(clean.signal.samples(), &noise_config, sample_rate);
    let record = Record::new(Signal::new(noisy, sample_rate)?, clean.annotations);

    let is_wav = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        save_wav(&args.output, &record.signal).context("Failed to write WAV file")?;
    } else {
        record.save(&args.output).context("Failed to write record")?;
    }

    eprintln!(
        "Generated {} beats over {:.1} s at {} Hz in {}",
        record.annotations.len(),
        args.duration,
        args.sample_rate,
        args.output.display()
    );
    Ok(())
}
