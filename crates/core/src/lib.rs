//! Run simulation and soundtrack planning. Keep this crate free of IO.

pub mod config;
pub mod rng;
pub mod run;
pub mod state;
pub mod summary;
pub mod track;

pub use config::*;
pub use rng::*;
pub use run::*;
pub use state::*;
pub use summary::*;
pub use track::*;
