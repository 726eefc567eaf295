//! Environmental forcing for one optimisation timestep

use crate::core_types::error::{ModelError, ModelResult};
use crate::core_types::units::Kelvin;
use crate::photosynthesis::{LeafConditions, DEFAULT_INTERCELLULAR_O2};
use serde::{Deserialize, Serialize};

/// One timestep of drivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drivers {
    /// Soil water potential (`MPa`)
    pub soil_water_potential: f64,
    /// Leaf temperature, taken equal to the air temperature
    pub leaf_temperature: Kelvin,
    /// Vapour pressure deficit (kPa)
    pub vapour_pressure_deficit: f64,
    /// Air pressure (kPa)
    pub air_pressure: f64,
    /// Atmospheric CO₂ (µmol mol⁻¹)
    pub atmospheric_co2: f64,
    /// Intercellular O₂ (mmol mol⁻¹)
    #[serde(default = "default_intercellular_o2")]
    pub intercellular_o2: f64,
    /// Utilised PAR (µmol m⁻² s⁻¹)
    #[serde(default)]
    pub utilised_par: Option<f64>,
}

fn default_intercellular_o2() -> f64 {
    DEFAULT_INTERCELLULAR_O2
}

impl Drivers {
    pub fn new(
        soil_water_potential: f64,
        leaf_temperature: Kelvin,
        vapour_pressure_deficit: f64,
        air_pressure: f64,
        atmospheric_co2: f64,
    ) -> Self {
        Self {
            soil_water_potential,
            leaf_temperature,
            vapour_pressure_deficit,
            air_pressure,
            atmospheric_co2,
            intercellular_o2: DEFAULT_INTERCELLULAR_O2,
            utilised_par: None,
        }
    }

    pub fn with_utilised_par(mut self, utilised_par: f64) -> Self {
        self.utilised_par = Some(utilised_par);
        self
    }

    pub fn with_intercellular_o2(mut self, intercellular_o2: f64) -> Self {
        self.intercellular_o2 = intercellular_o2;
        self
    }

    /// Reject drivers the optimiser cannot use.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] naming the first offending driver.
    pub fn validate(&self) -> ModelResult<()> {
        let checks = [
            (
                "soil water potential",
                self.soil_water_potential,
                self.soil_water_potential.is_finite(),
            ),
            ("leaf temperature", *self.leaf_temperature, *self.leaf_temperature > 0.0),
            (
                "vapour pressure deficit",
                self.vapour_pressure_deficit,
                self.vapour_pressure_deficit > 0.0,
            ),
            ("air pressure", self.air_pressure, self.air_pressure > 0.0),
            ("atmospheric CO2", self.atmospheric_co2, self.atmospheric_co2 > 0.0),
            ("intercellular O2", self.intercellular_o2, self.intercellular_o2 >= 0.0),
        ];
        for (name, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(ModelError::InvalidInput(format!(
                    "{name} must be finite and in range, got {value}"
                )));
            }
        }
        if let Some(par) = self.utilised_par {
            if !(par.is_finite() && par >= 0.0) {
                return Err(ModelError::InvalidInput(format!(
                    "utilised PAR must be finite and non-negative, got {par}"
                )));
            }
        }
        Ok(())
    }

    /// Leaf state at a stomatal conductance to CO₂ (mol m⁻² s⁻¹)
    pub fn leaf_conditions(&self, stomatal_conductance: f64) -> LeafConditions {
        LeafConditions {
            stomatal_conductance,
            atmospheric_co2: self.atmospheric_co2,
            leaf_temperature: self.leaf_temperature,
            intercellular_o2: self.intercellular_o2,
            utilised_par: self.utilised_par,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Celsius;

    fn drivers() -> Drivers {
        Drivers::new(-0.5, Celsius::new(25.0).to_kelvin(), 1.5, 101.325, 400.0)
    }

    #[test]
    fn test_valid_drivers() {
        assert!(drivers().validate().is_ok());
        assert!(drivers().with_utilised_par(0.0).validate().is_ok());
        assert_eq!(drivers().intercellular_o2, 210.0);
    }

    #[test]
    fn test_invalid_drivers_rejected() {
        let mut d = drivers();
        d.vapour_pressure_deficit = 0.0;
        assert!(matches!(d.validate(), Err(ModelError::InvalidInput(_))));

        let mut d = drivers();
        d.soil_water_potential = f64::NAN;
        assert!(d.validate().is_err());

        assert!(drivers().with_utilised_par(-1.0).validate().is_err());
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let json = r#"{
            "soil_water_potential": -1.0,
            "leaf_temperature": 293.15,
            "vapour_pressure_deficit": 1.0,
            "air_pressure": 100.0,
            "atmospheric_co2": 410.0
        }"#;
        let d: Drivers = serde_json::from_str(json).unwrap();
        assert_eq!(d.intercellular_o2, 210.0);
        assert_eq!(d.utilised_par, None);
    }
}
