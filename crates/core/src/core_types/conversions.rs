//! Unit conversion helpers
//!
//! Stateless conversions between the unit systems that meet in the model:
//! SI magnitude prefixes, moles and grams, radiation, time, temperature and
//! the diffusivity ratios between stomatal and boundary-layer conductances.
//!
//! # References
//! - Jones, H.G. (2013). "Plants and Microclimate", 3rd ed., Cambridge University Press
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental Biophysics"

use crate::core_types::error::ModelError;
use crate::core_types::units::{Celsius, Kelvin};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// CONVERSION CONSTANTS
// ============================================================================

/// Grams per mole of water
pub const GRAMS_PER_MOLE_OF_WATER: f64 = 18.02;
/// Grams per mole of carbon
pub const GRAMS_PER_MOLE_OF_CARBON: f64 = 12.0;

/// Photosynthetically active radiation per unit short wave radiation
pub const PAR_PER_UNIT_SHORT_WAVE: f64 = 2.3;
/// Energy per micromole of photons (J µmol⁻¹)
pub const JOULES_PER_MICRO_MOLE_OF_LIGHT: f64 = 4.57;

pub const SECONDS_PER_HALF_HOUR: f64 = 1800.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Ratio of the diffusivities of water vapour and CO2 through stomata
pub const STOMATAL_WATER_TO_CARBON_RATIO: f64 = 1.57;
/// Leaf boundary layer conductance ratio of carbon to heat
pub const BOUNDARY_CARBON_TO_HEAT_RATIO: f64 = 1.32;
/// Leaf boundary layer conductance ratio of heat to water
pub const BOUNDARY_HEAT_TO_WATER_RATIO: f64 = 1.075;
/// Leaf boundary layer conductance ratio of carbon to water
pub const BOUNDARY_CARBON_TO_WATER_RATIO: f64 =
    BOUNDARY_CARBON_TO_HEAT_RATIO * BOUNDARY_HEAT_TO_WATER_RATIO;

// ============================================================================
// SI MAGNITUDES
// ============================================================================

/// SI magnitude prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiPrefix {
    Yotta,
    Zetta,
    Exa,
    Peta,
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deca,
    Unit,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
    Femto,
    Atto,
    Zepto,
    Yocto,
}

impl SiPrefix {
    /// Multiplier relative to the unprefixed unit
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            SiPrefix::Yotta => 1e24,
            SiPrefix::Zetta => 1e21,
            SiPrefix::Exa => 1e18,
            SiPrefix::Peta => 1e15,
            SiPrefix::Tera => 1e12,
            SiPrefix::Giga => 1e9,
            SiPrefix::Mega => 1e6,
            SiPrefix::Kilo => 1e3,
            SiPrefix::Hecto => 1e2,
            SiPrefix::Deca => 1e1,
            SiPrefix::Unit => 1.0,
            SiPrefix::Deci => 1e-1,
            SiPrefix::Centi => 1e-2,
            SiPrefix::Milli => 1e-3,
            SiPrefix::Micro => 1e-6,
            SiPrefix::Nano => 1e-9,
            SiPrefix::Pico => 1e-12,
            SiPrefix::Femto => 1e-15,
            SiPrefix::Atto => 1e-18,
            SiPrefix::Zepto => 1e-21,
            SiPrefix::Yocto => 1e-24,
        }
    }

    /// Conventional symbol ("" for the unprefixed unit, "u" for micro)
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            SiPrefix::Yotta => "Y",
            SiPrefix::Zetta => "Z",
            SiPrefix::Exa => "E",
            SiPrefix::Peta => "P",
            SiPrefix::Tera => "T",
            SiPrefix::Giga => "G",
            SiPrefix::Mega => "M",
            SiPrefix::Kilo => "k",
            SiPrefix::Hecto => "h",
            SiPrefix::Deca => "da",
            SiPrefix::Unit => "",
            SiPrefix::Deci => "d",
            SiPrefix::Centi => "c",
            SiPrefix::Milli => "m",
            SiPrefix::Micro => "u",
            SiPrefix::Nano => "n",
            SiPrefix::Pico => "p",
            SiPrefix::Femto => "f",
            SiPrefix::Atto => "a",
            SiPrefix::Zepto => "z",
            SiPrefix::Yocto => "y",
        }
    }
}

impl FromStr for SiPrefix {
    type Err = ModelError;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        let prefix = match symbol {
            "Y" => SiPrefix::Yotta,
            "Z" => SiPrefix::Zetta,
            "E" => SiPrefix::Exa,
            "P" => SiPrefix::Peta,
            "T" => SiPrefix::Tera,
            "G" => SiPrefix::Giga,
            "M" => SiPrefix::Mega,
            "k" => SiPrefix::Kilo,
            "h" => SiPrefix::Hecto,
            "da" => SiPrefix::Deca,
            "" => SiPrefix::Unit,
            "d" => SiPrefix::Deci,
            "c" => SiPrefix::Centi,
            "m" => SiPrefix::Milli,
            "u" | "µ" => SiPrefix::Micro,
            "n" => SiPrefix::Nano,
            "p" => SiPrefix::Pico,
            "f" => SiPrefix::Femto,
            "a" => SiPrefix::Atto,
            "z" => SiPrefix::Zepto,
            "y" => SiPrefix::Yocto,
            other => {
                return Err(ModelError::InvalidInput(format!(
                    "unknown SI prefix '{other}'"
                )))
            }
        };
        Ok(prefix)
    }
}

/// Convert a value between SI magnitudes, e.g. mmol to mol.
///
/// # Arguments
/// * `value` - Value expressed with the `from` prefix
/// * `from` - Current magnitude
/// * `to` - Target magnitude
#[inline]
#[must_use]
pub fn magnitude_conversion(value: f64, from: SiPrefix, to: SiPrefix) -> f64 {
    value * from.scale() / to.scale()
}

// ============================================================================
// MASS, RADIATION AND TIME
// ============================================================================

#[inline]
pub fn moles_water_to_grams(moles: f64) -> f64 {
    moles * GRAMS_PER_MOLE_OF_WATER
}

#[inline]
pub fn grams_water_to_moles(grams: f64) -> f64 {
    grams / GRAMS_PER_MOLE_OF_WATER
}

#[inline]
pub fn moles_carbon_to_grams(moles: f64) -> f64 {
    moles * GRAMS_PER_MOLE_OF_CARBON
}

#[inline]
pub fn grams_carbon_to_moles(grams: f64) -> f64 {
    grams / GRAMS_PER_MOLE_OF_CARBON
}

/// Short wave radiation (W m⁻²) to PAR (µmol m⁻² s⁻¹)
#[inline]
pub fn short_wave_to_par(short_wave: f64) -> f64 {
    short_wave * PAR_PER_UNIT_SHORT_WAVE
}

#[inline]
pub fn par_to_short_wave(par: f64) -> f64 {
    par / PAR_PER_UNIT_SHORT_WAVE
}

#[inline]
pub fn micro_moles_of_light_to_joules(micro_moles: f64) -> f64 {
    micro_moles * JOULES_PER_MICRO_MOLE_OF_LIGHT
}

#[inline]
pub fn joules_to_micro_moles_of_light(joules: f64) -> f64 {
    joules / JOULES_PER_MICRO_MOLE_OF_LIGHT
}

#[inline]
pub fn half_hours_to_seconds(half_hours: f64) -> f64 {
    half_hours * SECONDS_PER_HALF_HOUR
}

#[inline]
pub fn seconds_to_half_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HALF_HOUR
}

#[inline]
pub fn hours_to_seconds(hours: f64) -> f64 {
    hours * SECONDS_PER_HOUR
}

#[inline]
pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

#[inline]
pub fn days_to_seconds(days: f64) -> f64 {
    days * SECONDS_PER_DAY
}

#[inline]
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

/// Degrees Celsius to Kelvin on bare numbers (for columns read from files)
#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    *Celsius::new(celsius).to_kelvin()
}

#[inline]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    *Kelvin::new(kelvin).to_celsius()
}

// ============================================================================
// CONDUCTANCE RATIOS
// ============================================================================

#[inline]
pub fn stomatal_conductance_carbon_to_water(conductance_carbon: f64) -> f64 {
    conductance_carbon * STOMATAL_WATER_TO_CARBON_RATIO
}

#[inline]
pub fn stomatal_conductance_water_to_carbon(conductance_water: f64) -> f64 {
    conductance_water / STOMATAL_WATER_TO_CARBON_RATIO
}

#[inline]
pub fn boundary_conductance_carbon_to_heat(conductance_carbon: f64) -> f64 {
    conductance_carbon * BOUNDARY_CARBON_TO_HEAT_RATIO
}

#[inline]
pub fn boundary_conductance_heat_to_carbon(conductance_heat: f64) -> f64 {
    conductance_heat / BOUNDARY_CARBON_TO_HEAT_RATIO
}

#[inline]
pub fn boundary_conductance_heat_to_water(conductance_heat: f64) -> f64 {
    conductance_heat * BOUNDARY_HEAT_TO_WATER_RATIO
}

#[inline]
pub fn boundary_conductance_water_to_heat(conductance_water: f64) -> f64 {
    conductance_water / BOUNDARY_HEAT_TO_WATER_RATIO
}

#[inline]
pub fn boundary_conductance_carbon_to_water(conductance_carbon: f64) -> f64 {
    conductance_carbon * BOUNDARY_CARBON_TO_WATER_RATIO
}

#[inline]
pub fn boundary_conductance_water_to_carbon(conductance_water: f64) -> f64 {
    conductance_water / BOUNDARY_CARBON_TO_WATER_RATIO
}
