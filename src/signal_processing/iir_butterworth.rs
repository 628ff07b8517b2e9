use crate::error::{QrsError, Result};
use iir_filters::filter::{DirectForm2Transposed, Filter as IirFilter};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::zpk2sos;

/// Zero-phase Butterworth filter for arbitrary sampling rates
///
/// The filter is designed once and run forward, then backward over the
/// time-reversed output, which cancels the phase response and squares the
/// magnitude response. The input is extended at both ends by an odd
/// reflection of `padding()` samples to suppress start-up transients.
///
/// A value is consumed by [`ZeroPhaseButterworth::apply`] so each pass
/// always starts from a zero filter state.
pub struct ZeroPhaseButterworth {
    forward: DirectForm2Transposed,
    backward: DirectForm2Transposed,
    padding: usize,
}

impl ZeroPhaseButterworth {
    /// Create a zero-phase highpass filter
    ///
    /// # Arguments
    /// * `cutoff_hz` - Cutoff frequency in Hz
    /// * `sample_rate` - Sampling rate in Hz
    /// * `order` - Butterworth order of each direction (typically 2)
    ///
    /// # Errors
    /// Returns `QrsError::InvalidParameter` if the cutoff is not inside
    /// `(0, sample_rate / 2)`, or `QrsError::FilterDesign` if the designer
    /// rejects the parameters.
    pub fn highpass(cutoff_hz: f64, sample_rate: f64, order: usize) -> Result<Self> {
        check_cutoff(cutoff_hz, sample_rate)?;
        Self::design(FilterType::HighPass(cutoff_hz), sample_rate, order)
    }

    /// Create a zero-phase lowpass filter
    ///
    /// See [`ZeroPhaseButterworth::highpass`] for arguments and errors.
    pub fn lowpass(cutoff_hz: f64, sample_rate: f64, order: usize) -> Result<Self> {
        check_cutoff(cutoff_hz, sample_rate)?;
        Self::design(FilterType::LowPass(cutoff_hz), sample_rate, order)
    }

    fn design(filter_type: FilterType, sample_rate: f64, order: usize) -> Result<Self> {
        let zpk = butter(order as u32, filter_type, sample_rate)
            .map_err(|e| QrsError::FilterDesign(format!("{:?}", e)))?;

        let sos = zpk2sos(&zpk, None).map_err(|e| QrsError::FilterDesign(format!("{:?}", e)))?;

        Ok(Self {
            forward: DirectForm2Transposed::new(&sos),
            backward: DirectForm2Transposed::new(&sos),
            padding: Self::padding_for(order),
        })
    }

    /// Edge extension length for a filter of the given order
    pub fn padding_for(order: usize) -> usize {
        3 * (2 * order + 1)
    }

    /// Shortest input the filter accepts for the given order
    pub fn min_len(order: usize) -> usize {
        Self::padding_for(order) + 1
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Filter `input` forward and backward
    ///
    /// # Errors
    /// Returns `QrsError::InsufficientSignalLength` if the input is not
    /// longer than the edge padding.
    pub fn apply(mut self, input: &[f64]) -> Result<Vec<f64>> {
        let pad = self.padding;
        if input.len() <= pad {
            return Err(QrsError::InsufficientSignalLength {
                needed: pad + 1,
                available: input.len(),
            });
        }

        let extended = odd_extension(input, pad);

        let mut pass: Vec<f64> = extended.iter().map(|&x| self.forward.filter(x)).collect();
        pass.reverse();
        let mut pass: Vec<f64> = pass.iter().map(|&x| self.backward.filter(x)).collect();
        pass.reverse();

        Ok(pass[pad..pad + input.len()].to_vec())
    }
}

fn check_cutoff(cutoff_hz: f64, sample_rate: f64) -> Result<()> {
    let nyquist = sample_rate / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(QrsError::InvalidParameter(format!(
            "cutoff {} Hz must lie between 0 and the Nyquist frequency {} Hz",
            cutoff_hz, nyquist
        )));
    }
    Ok(())
}

/// Extend `input` by `pad` samples at each end, reflecting around the
/// end values so the extension continues the local slope.
fn odd_extension(input: &[f64], pad: usize) -> Vec<f64> {
    let n = input.len();
    let first = input[0];
    let last = input[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|k| 2.0 * first - input[k]));
    out.extend_from_slice(input);
    out.extend((1..=pad).map(|k| 2.0 * last - input[n - 1 - k]));
    out
}
