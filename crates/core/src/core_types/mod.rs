//! Core types and utilities

pub mod constants;
pub mod conversions;
pub mod error;
pub mod numerics;
pub mod units;

pub use conversions::{magnitude_conversion, SiPrefix};
pub use error::{ModelError, ModelResult};
pub use units::{Celsius, Kelvin};
