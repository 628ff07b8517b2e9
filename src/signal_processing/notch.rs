use super::filter::Filter;
use crate::constants::NOTCH_MU;
use crate::error::{QrsError, Result};
use std::f64::consts::PI;

/// Narrow second-order rejection filter for mains interference
///
/// Zeros sit on the unit circle at the notch frequency and the poles just
/// inside it, so the stop band is a few tenths of a hertz wide and the gain
/// elsewhere stays close to one.
#[derive(Debug, Clone)]
pub struct MainsNotch {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl MainsNotch {
    /// Create a notch at `notch_hz` for a signal sampled at `sample_rate`
    ///
    /// # Errors
    /// Returns `QrsError::InvalidParameter` unless `0 < notch_hz < sample_rate / 2`.
    pub fn new(notch_hz: f64, sample_rate: f64) -> Result<Self> {
        if !(notch_hz > 0.0 && notch_hz < sample_rate / 2.0) {
            return Err(QrsError::InvalidParameter(format!(
                "notch frequency {} Hz must lie below the Nyquist frequency {} Hz",
                notch_hz,
                sample_rate / 2.0
            )));
        }

        let b0 = 1.0 - NOTCH_MU;
        let b1 = (2.0 * PI * notch_hz / sample_rate).cos() * (2.0 * NOTCH_MU - 2.0);
        Ok(Self {
            b0,
            b1,
            b2: b0,
            a1: b1,
            a2: 1.0 - 2.0 * NOTCH_MU,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }
}

impl Filter for MainsNotch {
    fn process(&mut self, sample: f64) -> f64 {
        let y = self.b0 * sample + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = sample;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
