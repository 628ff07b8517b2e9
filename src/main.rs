use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use qrsdetect::config::{DetectorConfig, seconds_to_samples};
use qrsdetect::evaluation::{Evaluation, evaluate};
use qrsdetect::output::{BeatOutput, Formatter, OutputFormat, create_formatter};
use qrsdetect::record::Record;
use qrsdetect::QrsDetector;

#[derive(Parser, Debug)]
#[command(name = "qrsdetect")]
#[command(about = "Detect QRS complexes in ECG recordings", long_about = None)]
struct Args {
    /// Text records or WAV files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Channel to read from WAV files
    #[arg(short = 'c', long, default_value = "0")]
    wav_channel: usize,

    /// Start of the analysed span in seconds
    #[arg(long, default_value_t = 0.0)]
    begin: f64,

    /// End of the analysed span in seconds (default: end of record)
    #[arg(long)]
    end: Option<f64>,

    /// Detector configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reject mains interference at this frequency in Hz
    #[arg(long)]
    notch: Option<f64>,

    /// Match window for annotated records in milliseconds
    #[arg(short = 't', long, default_value = "150")]
    tolerance_ms: f64,

    /// Only print the per-file summary
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileSummary {
    filename: String,
    sample_rate: f64,
    duration_secs: f64,
    beats: usize,
    heart_rate_bpm: Option<StatsSummary>,
    rr_ms: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<Evaluation>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => DetectorConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => DetectorConfig::default(),
    };
    if args.notch.is_some() {
        config.notch_hz = args.notch;
    }
    let detector = QrsDetector::new(config)?;
    let formatter = create_formatter(args.format, args.verbose > 0);

    let mut failures = 0;
    for path in &args.files {
        match process_file(path, &detector, formatter.as_ref(), &args) {
            Ok(summary) => print_summary(&summary, args.format)?,
            Err(e) => {
                log::error!("{}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, args.files.len());
    }
    Ok(())
}

fn process_file(
    path: &Path,
    detector: &QrsDetector,
    formatter: &dyn Formatter,
    args: &Args,
) -> anyhow::Result<FileSummary> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mut record = Record::open(path, args.wav_channel)
        .with_context(|| format!("reading {}", path.display()))?;
    if args.begin > 0.0 || args.end.is_some() {
        record = record
            .slice_secs(args.begin, args.end)
            .with_context(|| format!("slicing {}", path.display()))?;
    }
    let rate = record.signal.sample_rate();
    log::info!(
        "{}: {} samples at {} Hz, {} annotations",
        filename,
        record.signal.len(),
        rate,
        record.annotations.len()
    );

    let detection = detector.detect(&record.signal)?;
    let beats = BeatOutput::from_peaks(&detection.peaks, rate);

    if !args.quiet {
        if let Some(header) = formatter.header() {
            println!("{}", header);
        }
        for beat in &beats {
            println!("{}", formatter.format(beat));
        }
    }

    let mut rr_stats: Stats<f64> = Stats::new();
    let mut hr_stats: Stats<f64> = Stats::new();
    for beat in &beats {
        if let Some(rr) = beat.rr_secs {
            rr_stats.update(rr * 1000.0);
        }
        if let Some(hr) = beat.heart_rate_bpm() {
            hr_stats.update(hr);
        }
    }

    let evaluation = (!record.annotations.is_empty()).then(|| {
        let tolerance = seconds_to_samples(args.tolerance_ms / 1000.0, rate);
        evaluate(&record.annotations, &detection.peaks, tolerance)
    });

    Ok(FileSummary {
        filename,
        sample_rate: rate,
        duration_secs: record.signal.duration_secs(),
        beats: beats.len(),
        heart_rate_bpm: StatsSummary::from_stats(&hr_stats),
        rr_ms: StatsSummary::from_stats(&rr_stats),
        evaluation,
    })
}

fn print_summary(summary: &FileSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
        OutputFormat::Text => println!("{}", summary_text(summary)),
        // Keep stdout parseable
        OutputFormat::Csv => eprintln!("{}", summary_text(summary)),
    }
    Ok(())
}

fn summary_text(summary: &FileSummary) -> String {
    let mut text = format!(
        "=== {}: {} beats in {:.1} s at {} Hz",
        summary.filename, summary.beats, summary.duration_secs, summary.sample_rate
    );
    if let Some(hr) = &summary.heart_rate_bpm {
        text.push_str(&format!(
            "\n  Heart rate: {:.1} ± {:.1} bpm (range {:.1} to {:.1})",
            hr.mean, hr.std_dev, hr.min, hr.max
        ));
    }
    if let Some(rr) = &summary.rr_ms {
        text.push_str(&format!(
            "\n  RR interval: {:.0} ± {:.0} ms",
            rr.mean, rr.std_dev
        ));
    }
    if let Some(eval) = &summary.evaluation {
        let pct = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.2}%", v * 100.0));
        text.push_str(&format!(
            "\n  Annotations: TP {} FP {} FN {}, sensitivity {}, +P {}",
            eval.true_positives,
            eval.false_positives,
            eval.false_negatives,
            pct(eval.sensitivity()),
            pct(eval.positive_predictivity())
        ));
    }
    text
}
