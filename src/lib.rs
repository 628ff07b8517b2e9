pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod evaluation;
pub mod output;
pub mod record;
pub mod signal;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::DetectorConfig;
pub use detection::{Detection, QrsDetector, detect_beats};
pub use error::{QrsError, Result};
pub use record::{Record, save_wav};
pub use signal::Signal;
