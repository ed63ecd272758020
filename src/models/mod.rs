//! Core data models for player lookups.

mod batch;
mod heroes;
mod player;
mod profile;
mod report;

pub use batch::*;
pub use heroes::*;
pub use player::*;
pub use profile::*;
pub use report::*;
