//! Configuration for the QRS detection pipeline.
//!
//! All durations are given in seconds and converted to samples once the
//! sampling rate of the signal is known. A configuration can be loaded from
//! TOML; missing keys take their defaults:
//!
//! ```toml
//! window_seconds = 0.16
//! min_rr_seconds = 0.2
//! max_rr_seconds = 2.0
//!
//! [bandpass]
//! low_hz = 5.0
//! high_hz = 11.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QrsError, Result};

/// Complete detector configuration
///
/// Use `DetectorConfig::default()` for the classic Pan-Tompkins settings.
///
/// # Example
/// ```
/// use qrsdetect::config::DetectorConfig;
///
/// let mut config = DetectorConfig::default();
/// config.max_rr_seconds = 1.5;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Moving window integration length
    pub window_seconds: f64,
    /// Refractory period: minimum interval between two independent beats
    pub min_rr_seconds: f64,
    /// Gap without a beat that triggers search-back
    pub max_rr_seconds: f64,
    /// Half-width of the peak localizer search window
    pub search_radius_seconds: f64,
    /// Seed the running peak estimates from this leading span instead of zero
    pub learning_seconds: Option<f64>,
    /// Mains frequency to reject before band-pass filtering
    pub notch_hz: Option<f64>,
    /// Fixed recursive filter path
    pub reference: ReferenceFilterConfig,
    /// Generic Butterworth path for all other sampling rates
    pub bandpass: BandpassConfig,
}

/// Parameters of the fixed integer-coefficient filter pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceFilterConfig {
    /// Sampling rate the recursive filters are designed for
    pub sample_rate: f64,
    /// Group delay of the low-pass stage in samples
    pub lowpass_delay: usize,
    /// Group delay of the high-pass stage in samples
    pub highpass_delay: usize,
}

/// Parameters of the generic zero-phase band-pass path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandpassConfig {
    /// High-pass cutoff in Hz
    pub low_hz: f64,
    /// Low-pass cutoff in Hz
    pub high_hz: f64,
    /// Butterworth order of each pass
    pub order: usize,
    /// Residual delay reported for the zero-phase path
    pub delay_seconds: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.16,
            min_rr_seconds: 0.2,
            max_rr_seconds: 2.0,
            search_radius_seconds: 0.075,
            learning_seconds: None,
            notch_hz: None,
            reference: ReferenceFilterConfig::default(),
            bandpass: BandpassConfig::default(),
        }
    }
}

impl Default for ReferenceFilterConfig {
    fn default() -> Self {
        Self {
            sample_rate: 200.0,
            lowpass_delay: 6,
            highpass_delay: 16,
        }
    }
}

impl ReferenceFilterConfig {
    /// Total nominal group delay of the filter pair in samples
    pub fn delay(&self) -> usize {
        self.lowpass_delay + self.highpass_delay
    }

    /// Whether a signal sampled at `sample_rate` can use the fixed filters
    pub fn matches(&self, sample_rate: f64) -> bool {
        (sample_rate - self.sample_rate).abs() < 1e-9
    }
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            low_hz: 5.0,
            high_hz: 11.0,
            order: 2,
            delay_seconds: 0.0,
        }
    }
}

impl DetectorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| QrsError::InvalidParameter(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check every parameter independently of the sampling rate
    pub fn validate(&self) -> Result<()> {
        positive("window_seconds", self.window_seconds)?;
        positive("min_rr_seconds", self.min_rr_seconds)?;
        positive("max_rr_seconds", self.max_rr_seconds)?;
        positive("search_radius_seconds", self.search_radius_seconds)?;
        positive("reference.sample_rate", self.reference.sample_rate)?;
        positive("bandpass.low_hz", self.bandpass.low_hz)?;
        positive("bandpass.high_hz", self.bandpass.high_hz)?;

        if let Some(learning) = self.learning_seconds {
            positive("learning_seconds", learning)?;
        }
        if let Some(notch) = self.notch_hz {
            positive("notch_hz", notch)?;
        }
        if self.max_rr_seconds <= self.min_rr_seconds {
            return Err(QrsError::InvalidParameter(format!(
                "max_rr_seconds ({}) must exceed min_rr_seconds ({})",
                self.max_rr_seconds, self.min_rr_seconds
            )));
        }
        if self.bandpass.high_hz <= self.bandpass.low_hz {
            return Err(QrsError::InvalidParameter(format!(
                "bandpass.high_hz ({}) must exceed bandpass.low_hz ({})",
                self.bandpass.high_hz, self.bandpass.low_hz
            )));
        }
        if self.bandpass.order == 0 {
            return Err(QrsError::InvalidParameter(
                "bandpass.order must be at least 1".to_string(),
            ));
        }
        if !self.bandpass.delay_seconds.is_finite() || self.bandpass.delay_seconds < 0.0 {
            return Err(QrsError::InvalidParameter(
                "bandpass.delay_seconds must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Convert a duration to a whole number of samples, never less than one
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    ((seconds * sample_rate).round() as usize).max(1)
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(QrsError::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DetectorConfig::from_toml_str(
            r#"
            max_rr_seconds = 1.5

            [bandpass]
            high_hz = 15.0
            "#,
        )
        .unwrap();

        assert_eq!(config.max_rr_seconds, 1.5);
        assert_eq!(config.bandpass.high_hz, 15.0);
        assert_eq!(config.bandpass.low_hz, 5.0);
        assert_eq!(config.window_seconds, 0.16);
        assert_eq!(config.reference.delay(), 22);
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let mut config = DetectorConfig::default();
        config.window_seconds = 0.0;
        assert!(matches!(
            config.validate(),
            Err(QrsError::InvalidParameter(_))
        ));

        let mut config = DetectorConfig::default();
        config.min_rr_seconds = -0.2;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.learning_seconds = Some(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let mut config = DetectorConfig::default();
        config.max_rr_seconds = 0.1;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.bandpass.high_hz = 4.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(DetectorConfig::from_toml_str("window_seconds = \"wide\"").is_err());
    }

    #[test]
    fn test_seconds_to_samples() {
        assert_eq!(seconds_to_samples(0.16, 200.0), 32);
        assert_eq!(seconds_to_samples(0.16, 2000.0), 320);
        assert_eq!(seconds_to_samples(0.075, 360.0), 27);
        assert_eq!(seconds_to_samples(0.0001, 200.0), 1);
    }
}
