mod csv;
mod json;
mod text;

use serde::Serialize;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One detected beat as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatOutput {
    pub index: usize,
    pub time_secs: f64,
    /// Interval since the previous beat
    pub rr_secs: Option<f64>,
}

impl BeatOutput {
    /// Build outputs for a strictly increasing list of beat indices
    pub fn from_peaks(peaks: &[usize], sample_rate: f64) -> Vec<Self> {
        let mut previous: Option<usize> = None;
        peaks
            .iter()
            .map(|&index| {
                let rr_secs = previous.map(|p| (index - p) as f64 / sample_rate);
                previous = Some(index);
                Self {
                    index,
                    time_secs: index as f64 / sample_rate,
                    rr_secs,
                }
            })
            .collect()
    }

    /// Instantaneous heart rate from the preceding interval
    pub fn heart_rate_bpm(&self) -> Option<f64> {
        self.rr_secs.filter(|&rr| rr > 0.0).map(|rr| 60.0 / rr)
    }
}

pub trait Formatter: Send {
    fn format(&self, output: &BeatOutput) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}
