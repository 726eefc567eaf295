//! Leaf-atmosphere exchange.
//!
//! This module converts atmospheric state into the quantities the leaf
//! models consume:
//! - Saturation and actual vapour pressure, vapour pressure deficit
//! - Stomatal conductance implied by a transpiration rate under perfect
//!   leaf-air coupling
//!
//! # References
//!
//! - Tetens, O. (1930). "Über einige meteorologische Begriffe." Z. Geophys.
//! - Lowe, P.R. (1977). "An approximating polynomial for the computation of
//!   saturation vapor pressure." J. Appl. Meteor.
//! - Jones, H.G. (2013). "Plants and Microclimate", chapter 6.

mod leaf_air_coupling;
mod vapour_pressure;

pub use leaf_air_coupling::LeafAirCoupling;
pub use vapour_pressure::{
    saturation_vapour_pressure, vapour_pressure, vapour_pressure_deficit,
    SaturatedVapourPressurePolynomial, MINIMUM_VAPOUR_PRESSURE_DEFICIT,
};
