//! Zero-dimensional Fenton-Karma cardiac action potential model.
//!
//! A single cell with three state variables (potential `u`, fast gate `v`,
//! slow gate `w`) driven by rectangular stimulus pulses and advanced with
//! fixed-step explicit Euler.
//!
//! ```
//! use fenton_karma_rs::{FentonKarma0D, Stimulation};
//!
//! let stimulations = vec![Stimulation::new(0.1, 0.2, 1.0)];
//! let mut model = FentonKarma0D::new(0.01, stimulations).unwrap();
//! model.run(10.0).unwrap();
//! assert_eq!(model.history().u().len(), 1000);
//! ```

pub mod analysis;
pub mod channels;
pub mod compartment;
pub mod config;
pub mod error;
pub mod parameters;
pub mod stimulation;

#[cfg(feature = "python")]
mod python;

pub use compartment::{FentonKarma0D, History, RangeCheck, StateBounds};
pub use config::SimulationConfig;
pub use error::{FentonKarmaError, Result};
pub use parameters::{default_parameters, default_state, Parameters, State, Variable};
pub use stimulation::{total_stimulus, Stimulation};
