/// Common trait for causal sample-by-sample filters
///
/// Implemented by the fixed recursive ECG filters, the Butterworth sections
/// and the mains notch. Batch filtering is a fold over `process`.
pub trait Filter {
    /// Process a single sample through the filter
    fn process(&mut self, sample: f64) -> f64;

    /// Clear all history so the next sample starts a fresh stream
    fn reset(&mut self);

    /// Process a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Filter a slice into a new vector
    fn apply(&mut self, input: &[f64]) -> Vec<f64> {
        let mut output = input.to_vec();
        self.process_buffer(&mut output);
        output
    }
}

/// Fixed-length history of past samples, newest first
///
/// `get(k)` returns the value `k` samples ago (`k = 0` is the most recent);
/// samples older than the stream start read as zero.
#[derive(Debug, Clone)]
pub(crate) struct History {
    buffer: Vec<f64>,
    head: usize,
}

impl History {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            head: 0,
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.head = (self.head + 1) % self.buffer.len();
        self.buffer[self.head] = value;
    }

    pub(crate) fn get(&self, ago: usize) -> f64 {
        let len = self.buffer.len();
        self.buffer[(self.head + len - ago % len) % len]
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_reads_back_in_order() {
        let mut history = History::new(4);
        for v in 1..=3 {
            history.push(v as f64);
        }
        assert_eq!(history.get(0), 3.0);
        assert_eq!(history.get(1), 2.0);
        assert_eq!(history.get(2), 1.0);
        assert_eq!(history.get(3), 0.0);
    }

    #[test]
    fn test_history_wraps() {
        let mut history = History::new(3);
        for v in 1..=5 {
            history.push(v as f64);
        }
        assert_eq!(history.get(0), 5.0);
        assert_eq!(history.get(2), 3.0);

        history.clear();
        assert_eq!(history.get(0), 0.0);
    }
}
