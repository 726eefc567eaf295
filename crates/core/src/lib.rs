//! Stomatal Optimisation Core Library
//!
//! Models how plants regulate their stomata by trading photosynthetic carbon
//! gain against the hydraulic cost of drawing water through the xylem.
//! Each timestep, the optimiser samples leaf water potentials between the
//! soil potential and a critical potential, evaluates cost and gain at each,
//! and picks the leaf water potential with the largest profit.
//!
//! ## Components
//!
//! - Xylem vulnerability curves (Weibull, SOX) and their stateful wrappers
//!   (capped, age-structured, whole-trunk)
//! - Embolism damage and recovery refitting the Weibull curve over time
//! - Farquhar-type photosynthesis with Rubisco and electron transport limits
//! - Hydraulic cost, CO₂ gain and the profit search with a time-series driver

// Core types and utilities
pub mod core_types;

// Leaf-atmosphere exchange
pub mod atmosphere;

// Hydraulics
pub mod conductance;
pub mod damage;

// Carbon uptake
pub mod photosynthesis;

// Optimisation
pub mod profit;

// Re-export core types
pub use core_types::{Celsius, Kelvin, ModelError, ModelResult};

// Re-export model types
pub use conductance::{ConductanceModel, DamageThresholds, SoxCurve, WeibullCurve};
pub use damage::{DamageStrategy, XylemDamageModel};
pub use photosynthesis::{LimitingPolicy, PhotosynthesisFormulation, PhotosynthesisModel};
pub use profit::{
    run_time_series, Drivers, ModelConfig, OptimalState, Preset, ProfitOptimisationModel,
    TimeSeriesOutput,
};
