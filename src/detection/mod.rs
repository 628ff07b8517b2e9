pub mod localizer;
pub mod pipeline;
pub mod threshold;

pub use localizer::{
    drop_negligible, localize, localize_with_deviation, refine, strictly_increasing,
};
pub use pipeline::{Detection, QrsDetector, detect_beats};
pub use threshold::{AdaptiveThreshold, ScanMode, detect_peaks};
