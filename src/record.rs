//! Loading and saving ECG recordings.
//!
//! Two formats are understood. The plain text format has the sampling
//! rate on the first line and one sample per following line, optionally
//! followed by a non-zero mark flagging a reference beat:
//!
//! ```text
//! # lines starting with '#' are ignored
//! 200
//! 0.012
//! 0.981 1
//! 0.204
//! ```
//!
//! WAV files are read one channel at a time with `hound` and carry no
//! annotations.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{QrsError, Result};
use crate::signal::Signal;

/// A recording together with its reference beat annotations
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub signal: Signal,
    /// Sample indices of annotated beats, strictly increasing
    pub annotations: Vec<usize>,
}

impl Record {
    pub fn new(signal: Signal, annotations: Vec<usize>) -> Self {
        Self {
            signal,
            annotations,
        }
    }

    /// Parse the text format
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(n, line)| (n + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (rate_line, rate_text) = lines
            .next()
            .ok_or_else(|| QrsError::Record("missing sampling rate".to_string()))?;
        let sample_rate: f64 = rate_text.parse().map_err(|_| {
            QrsError::Record(format!(
                "line {}: invalid sampling rate '{}'",
                rate_line, rate_text
            ))
        })?;

        let mut samples = Vec::new();
        let mut annotations = Vec::new();
        for (line_no, line) in lines {
            let mut fields = line.split_whitespace();
            let value = fields
                .next()
                .and_then(|v| v.parse::<f64>().ok())
                .ok_or_else(|| {
                    QrsError::Record(format!("line {}: invalid sample '{}'", line_no, line))
                })?;

            if let Some(mark) = fields.next() {
                let mark: f64 = mark.parse().map_err(|_| {
                    QrsError::Record(format!("line {}: invalid mark '{}'", line_no, mark))
                })?;
                if mark != 0.0 {
                    annotations.push(samples.len());
                }
            }
            if fields.next().is_some() {
                return Err(QrsError::Record(format!(
                    "line {}: expected 'value [mark]'",
                    line_no
                )));
            }
            samples.push(value);
        }

        Ok(Self::new(Signal::new(samples, sample_rate)?, annotations))
    }

    /// Load a text record from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Cut out the span from `begin` to `end` seconds, or to the end of the
    /// record when `end` is `None`
    ///
    /// Annotations inside the span are kept and re-indexed from its start.
    ///
    /// # Errors
    /// Returns `QrsError::InvalidParameter` if `begin` is negative, `end`
    /// does not exceed `begin`, or the span holds no samples.
    pub fn slice_secs(&self, begin: f64, end: Option<f64>) -> Result<Self> {
        if !begin.is_finite() || begin < 0.0 {
            return Err(QrsError::InvalidParameter(format!(
                "slice start must be non-negative, got {}",
                begin
            )));
        }
        match end {
            Some(end) if end.is_nan() || end <= begin => {
                return Err(QrsError::InvalidParameter(format!(
                    "slice end {} must exceed start {}",
                    end, begin
                )));
            }
            _ => {}
        }

        let rate = self.signal.sample_rate();
        let len = self.signal.len();
        let first = ((begin * rate).round() as usize).min(len);
        let last = end.map_or(len, |end| ((end * rate).round() as usize).min(len));
        if first >= last {
            return Err(QrsError::InvalidParameter(format!(
                "no samples between {} s and {:?} s in a {:.1} s record",
                begin,
                end,
                self.signal.duration_secs()
            )));
        }

        let samples = self.signal.samples()[first..last].to_vec();
        let annotations = self
            .annotations
            .iter()
            .filter(|&&i| (first..last).contains(&i))
            .map(|&i| i - first)
            .collect();
        Ok(Self::new(Signal::new(samples, rate)?, annotations))
    }

    /// Load either format, choosing WAV by file extension
    pub fn open<P: AsRef<Path>>(path: P, wav_channel: usize) -> Result<Self> {
        let is_wav = path
            .as_ref()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav {
            Self::load_wav(path, wav_channel)
        } else {
            Self::load(path)
        }
    }

    /// Read one channel of a WAV file
    ///
    /// Integer PCM is normalised to ±1.
    pub fn load_wav<P: AsRef<Path>>(path: P, channel: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channel >= channels {
            return Err(QrsError::Record(format!(
                "channel {} requested from a {}-channel WAV file",
                channel, channels
            )));
        }

        let interleaved = read_samples(reader, &spec)?;
        let samples: Vec<f64> = interleaved
            .into_iter()
            .skip(channel)
            .step_by(channels)
            .collect();

        log::debug!(
            "Loaded {} samples at {} Hz from channel {} of {}",
            samples.len(),
            spec.sample_rate,
            channel,
            path.as_ref().display()
        );

        Ok(Self::new(
            Signal::new(samples, spec.sample_rate as f64)?,
            Vec::new(),
        ))
    }

    /// Write the text format
    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self.signal.sample_rate())?;
        let mut marks = self.annotations.iter().peekable();
        for (i, value) in self.signal.samples().iter().enumerate() {
            if marks.next_if_eq(&&i).is_some() {
                writeln!(writer, "{} 1", value)?;
            } else {
                writeln!(writer, "{}", value)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the text format to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_text(BufWriter::new(File::create(path)?))
    }
}

fn read_samples(mut reader: WavReader<BufReader<File>>, spec: &WavSpec) -> Result<Vec<f64>> {
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Save a signal as a mono 32-bit float WAV file
///
/// # Errors
/// Returns `QrsError::InvalidParameter` if the sampling rate is not a
/// whole number of hertz.
pub fn save_wav<P: AsRef<Path>>(path: P, signal: &Signal) -> Result<()> {
    let rate = signal.sample_rate();
    if rate.fract() != 0.0 || rate > u32::MAX as f64 {
        return Err(QrsError::InvalidParameter(format!(
            "WAV files need an integer sampling rate, got {}",
            rate
        )));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in signal.samples() {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("qrsdetect_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_with_marks_and_comments() {
        let text = "# lead II\n360\n0.0\n0.5 1\n\n-0.25 0\n1e-3 2\n";
        let record = Record::parse(text).unwrap();

        assert_eq!(record.signal.sample_rate(), 360.0);
        assert_eq!(record.signal.samples(), &[0.0, 0.5, -0.25, 1e-3]);
        assert_eq!(record.annotations, vec![1, 3]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Record::parse(""), Err(QrsError::Record(_))));
        assert!(matches!(
            Record::parse("fast\n1.0\n"),
            Err(QrsError::Record(_))
        ));
        assert!(matches!(
            Record::parse("200\n1.0\nabc\n"),
            Err(QrsError::Record(_))
        ));
        assert!(matches!(
            Record::parse("200\n1.0 1 7\n"),
            Err(QrsError::Record(_))
        ));
        assert!(matches!(
            Record::parse("0\n1.0\n"),
            Err(QrsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_text_round_trip() {
        let signal = Signal::new(vec![0.1, -0.2, 1.0 / 3.0, 4.5e-7, 0.0], 250.0).unwrap();
        let record = Record::new(signal, vec![0, 2]);

        let mut buffer = Vec::new();
        record.write_text(&mut buffer).unwrap();
        let parsed = Record::parse(std::str::from_utf8(&buffer).unwrap()).unwrap();

        assert_eq!(parsed, record);
    }

    #[test]
    fn test_slice_keeps_annotations_in_span() {
        let samples: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let record = Record::new(Signal::new(samples, 100.0).unwrap(), vec![50, 250, 400, 999]);

        let slice = record.slice_secs(2.0, Some(4.0)).unwrap();
        assert_eq!(slice.signal.len(), 200);
        assert_eq!(slice.signal.samples()[0], 200.0);
        assert_eq!(slice.signal.sample_rate(), 100.0);
        assert_eq!(slice.annotations, vec![50]);

        let tail = record.slice_secs(3.0, None).unwrap();
        assert_eq!(tail.signal.len(), 700);
        assert_eq!(tail.annotations, vec![100, 699]);

        // An end past the record is clipped
        let clipped = record.slice_secs(9.0, Some(60.0)).unwrap();
        assert_eq!(clipped.signal.len(), 100);
    }

    #[test]
    fn test_slice_rejects_empty_spans() {
        let record = Record::new(Signal::new(vec![0.0; 100], 100.0).unwrap(), vec![]);
        for (begin, end) in [(0.5, Some(0.5)), (0.6, Some(0.2)), (-1.0, None), (5.0, None)] {
            assert!(
                matches!(record.slice_secs(begin, end), Err(QrsError::InvalidParameter(_))),
                "slice {} to {:?} accepted",
                begin,
                end
            );
        }
    }

    #[test]
    fn test_wav_round_trip() {
        let path = temp_path("round_trip.wav");
        let signal = Signal::new(vec![0.0, 0.5, -0.5, 0.25], 500.0).unwrap();

        save_wav(&path, &signal).unwrap();
        let record = Record::open(&path, 0).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(record.signal, signal);
        assert!(record.annotations.is_empty());
    }

    #[test]
    fn test_wav_missing_channel() {
        let path = temp_path("mono.wav");
        let signal = Signal::new(vec![0.0; 8], 200.0).unwrap();
        save_wav(&path, &signal).unwrap();

        let result = Record::load_wav(&path, 1);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(QrsError::Record(_))));
    }

    #[test]
    fn test_wav_needs_integer_rate() {
        let signal = Signal::new(vec![0.0; 8], 200.5).unwrap();
        assert!(matches!(
            save_wav(temp_path("bad_rate.wav"), &signal),
            Err(QrsError::InvalidParameter(_))
        ));
    }
}
