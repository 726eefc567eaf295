//! Fundamental physical constants used across the models

/// Molar gas constant (J K⁻¹ mol⁻¹)
pub const MOLAR_GAS_CONSTANT: f64 = 8.314;

/// Latent heat of vaporisation of water (J kg⁻¹)
pub const LATENT_HEAT_OF_WATER: f64 = 2.501e6;

/// Molar mass of water (kg mol⁻¹)
pub const MOLAR_MASS_OF_WATER: f64 = 18e-3;

/// Molar mass of dry air (kg mol⁻¹)
pub const MOLAR_MASS_OF_AIR: f64 = 29.0e-3;

/// Specific gas constant of dry air (J kg⁻¹ K⁻¹)
pub const SPECIFIC_GAS_CONSTANT_OF_DRY_AIR: f64 = 287.058;

/// Specific heat of dry air at constant pressure (J kg⁻¹ K⁻¹)
pub const SPECIFIC_HEAT_OF_DRY_AIR: f64 = 1010.0;

/// Stefan-Boltzmann constant (W m⁻² K⁻⁴)
pub const STEFAN_BOLTZMANN: f64 = 5.6704e-8;

/// Molecular diffusivity of heat in air (m² s⁻¹)
pub const MOLECULAR_DIFFUSIVITY_OF_HEAT: f64 = 21.5e-6;

/// Ratio of the molar masses of water vapour and dry air
pub const WATER_TO_AIR_MOLAR_MASS_RATIO: f64 = 0.622;
