//! Stomatal profit optimisation
//!
//! Ties a conductance curve, a hydraulic cost model and a CO₂ gain model
//! into the per-timestep search for the leaf water potential that maximises
//! profit, plus the time-series driver that feeds each optimum back into the
//! xylem damage state.
//!
//! # Scientific References
//! - Sperry, J.S. et al. (2017). Plant, Cell & Environment, 40, 816-830
//! - Eller, C.B. et al. (2018). Phil. Trans. R. Soc. B, 373
//! - Wolf, A., Anderegg, W.R.L. & Pacala, S.W. (2016). "Optimal stomatal
//!   behavior with competition for water and risk of hydraulic impairment."
//!   PNAS, 113, E7222-E7230

mod batch;
mod config;
mod cost;
mod drivers;
mod gain;
mod optimizer;
mod presets;

pub use batch::{run_time_series, TimeSeriesOutput};
pub use config::{ConductanceConfig, ModelConfig, VulnerabilityObservations};
pub use cost::{HydraulicCost, HydraulicCostKind};
pub use drivers::Drivers;
pub use gain::{normalised_gain, CO2GainModel, CarbonUptake};
pub use optimizer::{
    OptimalState, OptimizerSettings, ProfitCurve, ProfitForm, ProfitOptimisationModel,
    DEFAULT_SAMPLE_POINTS,
};
pub use presets::{build_profit_max_model, build_sox_model, Preset};
