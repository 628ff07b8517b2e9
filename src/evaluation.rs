use serde::Serialize;

/// Beat-by-beat agreement between detections and reference annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    /// TP / (TP + FN), `None` without reference beats
    pub fn sensitivity(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// TP / (TP + FP), `None` without detections
    pub fn positive_predictivity(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Match detections to reference beats within `tolerance` samples
///
/// Both slices must be sorted. Matching walks both in time order and
/// pairs each reference beat with the earliest unused detection inside
/// its tolerance window, so every detection matches at most once.
pub fn evaluate(reference: &[usize], detected: &[usize], tolerance: usize) -> Evaluation {
    let mut true_positives = 0;
    let mut next = 0;

    for &beat in reference {
        while next < detected.len() && detected[next] + tolerance < beat {
            next += 1;
        }
        if next < detected.len() && detected[next] <= beat + tolerance {
            true_positives += 1;
            next += 1;
        }
    }

    Evaluation {
        true_positives,
        false_positives: detected.len() - true_positives,
        false_negatives: reference.len() - true_positives,
    }
}
