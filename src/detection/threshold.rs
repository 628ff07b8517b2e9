use crate::constants::{LOCAL_MAX_REACH, PEAK_WEIGHT, SEARCHBACK_PEAK_WEIGHT, THRESHOLD_FRACTION};
use crate::error::{QrsError, Result};

/// Scanning mode of the threshold detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Candidates must exceed `threshold1`
    Normal,
    /// Re-scanning a long gap against `threshold2`; normal scanning resumes
    /// at `end_index`
    SearchBack { end_index: usize },
}

/// Running estimates of the adaptive thresholding machine
///
/// Lives for a single detection run.
#[derive(Debug, Clone)]
struct DetectorState {
    spki: f64,
    npki: f64,
    threshold1: f64,
    threshold2: f64,
    mode: ScanMode,
    previous_peak: Option<usize>,
    searched_until: usize,
}

impl DetectorState {
    fn new(spki: f64, npki: f64) -> Self {
        let mut state = Self {
            spki,
            npki,
            threshold1: 0.0,
            threshold2: 0.0,
            mode: ScanMode::Normal,
            previous_peak: None,
            searched_until: 0,
        };
        state.update_thresholds();
        state
    }

    fn update_thresholds(&mut self) {
        self.threshold1 = self.npki + THRESHOLD_FRACTION * (self.spki - self.npki);
        self.threshold2 = 0.5 * self.threshold1;
    }

    /// Index gaps are measured from: the last accepted peak or the end of
    /// the last search-back window, whichever is later
    fn anchor(&self) -> usize {
        self.previous_peak.unwrap_or(0).max(self.searched_until)
    }
}

/// Adaptive dual-threshold peak detector over an integrated energy signal
///
/// Peaks are local maxima (`x[i] >= x[i-2]` and `x[i] > x[i+2]`) above a
/// threshold that tracks running signal-peak (`spki`) and noise-peak
/// (`npki`) estimates. When no beat has been accepted for more than
/// `max_rr` samples the gap is scanned again with the halved threshold.
/// Accepted peaks closer than `min_rr` samples merge into the larger one.
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    min_rr: usize,
    max_rr: usize,
    learning: Option<usize>,
}

impl AdaptiveThreshold {
    /// Create a detector
    ///
    /// # Arguments
    /// * `min_rr` - Refractory period in samples
    /// * `max_rr` - Gap in samples that triggers search-back
    ///
    /// # Errors
    /// Returns `QrsError::InvalidParameter` if `min_rr` is zero or
    /// `max_rr` does not exceed it.
    pub fn new(min_rr: usize, max_rr: usize) -> Result<Self> {
        if min_rr == 0 {
            return Err(QrsError::InvalidParameter(
                "refractory period must be at least one sample".to_string(),
            ));
        }
        if max_rr <= min_rr {
            return Err(QrsError::InvalidParameter(format!(
                "search-back gap ({} samples) must exceed refractory period ({} samples)",
                max_rr, min_rr
            )));
        }
        Ok(Self {
            min_rr,
            max_rr,
            learning: None,
        })
    }

    /// Seed `spki`/`npki` from the first `samples` of the integrated signal
    pub fn with_learning(mut self, samples: usize) -> Self {
        self.learning = Some(samples.max(1));
        self
    }

    /// Scan `integrated` and return the accepted peak indices in order
    ///
    /// # Errors
    /// Returns `QrsError::InsufficientSignalLength` if the signal has no
    /// interior index with neighbours on both sides.
    pub fn detect(&self, integrated: &[f64]) -> Result<Vec<usize>> {
        let needed = 2 * LOCAL_MAX_REACH + 1;
        if integrated.len() < needed {
            return Err(QrsError::InsufficientSignalLength {
                needed,
                available: integrated.len(),
            });
        }

        let mut state = self.initial_state(integrated);
        let mut peaks: Vec<usize> = Vec::new();
        let end = integrated.len() - LOCAL_MAX_REACH;
        let mut i = LOCAL_MAX_REACH;

        while i < end {
            let mode = state.mode;
            match mode {
                ScanMode::SearchBack { end_index } if i == end_index => {
                    log::trace!("Search-back window ends at {}", i);
                    state.mode = ScanMode::Normal;
                    state.searched_until = end_index;
                }
                ScanMode::SearchBack { .. } => {}
                ScanMode::Normal => {
                    let anchor = state.anchor();
                    if i - anchor > self.max_rr {
                        log::trace!(
                            "No beat for {} samples at {}, searching back from {}",
                            i - anchor,
                            i,
                            anchor + 1
                        );
                        state.mode = ScanMode::SearchBack { end_index: i };
                        i = (anchor + 1).max(LOCAL_MAX_REACH);
                        continue;
                    }
                }
            }

            self.step(&mut state, integrated, i, &mut peaks);
            i += 1;
        }

        log::debug!(
            "Threshold detector accepted {} peaks (spki {:.4}, npki {:.4})",
            peaks.len(),
            state.spki,
            state.npki
        );

        Ok(peaks)
    }

    fn initial_state(&self, integrated: &[f64]) -> DetectorState {
        match self.learning {
            Some(samples) => {
                let span = &integrated[..samples.min(integrated.len())];
                let max = span.iter().fold(0.0_f64, |acc, &v| acc.max(v));
                let mean = span.iter().sum::<f64>() / span.len() as f64;
                DetectorState::new(0.25 * max, 0.5 * mean)
            }
            None => DetectorState::new(0.0, 0.0),
        }
    }

    fn step(&self, state: &mut DetectorState, integrated: &[f64], i: usize, peaks: &mut Vec<usize>) {
        let value = integrated[i];
        let is_local_max = value >= integrated[i - LOCAL_MAX_REACH]
            && value > integrated[i + LOCAL_MAX_REACH];

        if is_local_max {
            let searching = matches!(state.mode, ScanMode::SearchBack { .. });
            let threshold = if searching {
                state.threshold2
            } else {
                state.threshold1
            };

            if value > threshold {
                let weight = if searching {
                    SEARCHBACK_PEAK_WEIGHT
                } else {
                    PEAK_WEIGHT
                };
                state.spki = (1.0 - weight) * state.spki + weight * value;
                self.accept(state, integrated, i, peaks);
            } else {
                state.npki = (1.0 - PEAK_WEIGHT) * state.npki + PEAK_WEIGHT * value;
            }
        }

        state.update_thresholds();
    }

    fn accept(&self, state: &mut DetectorState, integrated: &[f64], i: usize, peaks: &mut Vec<usize>) {
        match state.previous_peak {
            Some(previous) if i - previous < self.min_rr => {
                if integrated[i] > integrated[previous] {
                    log::trace!("Peak at {} replaces {} inside refractory period", i, previous);
                    if let Some(last) = peaks.last_mut() {
                        *last = i;
                    }
                    state.previous_peak = Some(i);
                }
            }
            _ => {
                peaks.push(i);
                state.previous_peak = Some(i);
            }
        }
    }
}

/// Detect candidate peaks with zero-initialised estimates
///
/// Shorthand for `AdaptiveThreshold::new(min_rr, max_rr)?.detect(integrated)`.
pub fn detect_peaks(integrated: &[f64], min_rr_samples: usize, max_rr_samples: usize) -> Result<Vec<usize>> {
    AdaptiveThreshold::new(min_rr_samples, max_rr_samples)?.detect(integrated)
}
