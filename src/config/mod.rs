//! Configuration and parameters
//!
//! Tolerances and localization settings.

pub mod constants;
pub mod locate_params;

pub use constants::*;
pub use locate_params::*;
