use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrsError {
    #[error("Insufficient signal length: need {needed} samples, have {available}")]
    InsufficientSignalLength { needed: usize, available: usize },

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Malformed record: {0}")]
    Record(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, QrsError>;
