pub mod conditioner;
pub mod derivative;
pub mod filter;
pub mod iir_butterworth;
pub mod moving_average;
pub mod notch;
pub mod recursive;

pub use conditioner::{Conditioned, FilterPath, condition};
pub use derivative::derivative_energy;
pub use filter::Filter;
pub use iir_butterworth::ZeroPhaseButterworth;
pub use moving_average::{WindowIntegrator, integrate, integration_delay};
pub use notch::MainsNotch;
pub use recursive::{RecursiveHighpass, RecursiveLowpass};
