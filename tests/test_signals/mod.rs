pub mod generate;

pub use generate::{
    beat_indices, evenly_spaced, gaussian_derivative_train, pulse_train,
    pulse_train_with_amplitudes,
};
