//! Asset loading and validation for generator presets and track tables.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
