//! Driver series for the batch runner: CSV input or a synthetic drydown

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::f64::consts::PI;
use std::path::Path;
use stomatal_core::atmosphere::{vapour_pressure_deficit, MINIMUM_VAPOUR_PRESSURE_DEFICIT};
use stomatal_core::core_types::conversions::{short_wave_to_par, SECONDS_PER_DAY, SECONDS_PER_HOUR};
use stomatal_core::{Celsius, Drivers};

/// One CSV row. Temperatures in °C, pressures in kPa.
#[derive(Debug, Deserialize)]
struct DriverRecord {
    soil_water_potential: f64,
    air_temperature: f64,
    vapour_pressure_deficit: f64,
    air_pressure: f64,
    atmospheric_co2: f64,
    #[serde(default)]
    intercellular_o2: Option<f64>,
    #[serde(default)]
    par: Option<f64>,
}

impl DriverRecord {
    fn into_drivers(self, row: usize) -> Result<Drivers> {
        // Celsius::new rejects sub-absolute-zero input by panicking
        if !(self.air_temperature.is_finite() && self.air_temperature > -273.15) {
            bail!("row {}: air temperature {} °C is not physical", row, self.air_temperature);
        }
        let mut drivers = Drivers::new(
            self.soil_water_potential,
            Celsius::new(self.air_temperature).to_kelvin(),
            self.vapour_pressure_deficit,
            self.air_pressure,
            self.atmospheric_co2,
        );
        if let Some(o2) = self.intercellular_o2 {
            drivers = drivers.with_intercellular_o2(o2);
        }
        if let Some(par) = self.par {
            drivers = drivers.with_utilised_par(par);
        }
        Ok(drivers)
    }
}

/// Read drivers from a CSV file with a header row.
pub fn read_drivers(path: &Path) -> Result<Vec<Drivers>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening drivers file {}", path.display()))?;
    let mut drivers = Vec::new();
    for (row, record) in reader.deserialize::<DriverRecord>().enumerate() {
        let record =
            record.with_context(|| format!("parsing row {} of {}", row + 1, path.display()))?;
        drivers.push(record.into_drivers(row + 1)?);
    }
    if drivers.is_empty() {
        bail!("{} contains no driver rows", path.display());
    }
    Ok(drivers)
}

/// Parameters of the synthetic forcing.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticForcing {
    pub days: usize,
    /// s
    pub timestep: f64,
    pub seed: u64,
    /// Soil water potential on the first day (`MPa`)
    pub initial_soil_water_potential: f64,
    /// Daily fall of the soil water potential (`MPa` day⁻¹)
    pub drydown_rate: f64,
}

/// Clear-sky diurnal cycle over a drying soil, with seeded weather noise.
pub fn synthetic_drivers(forcing: &SyntheticForcing) -> Result<Vec<Drivers>> {
    if !(forcing.timestep > 0.0 && forcing.timestep <= SECONDS_PER_DAY) {
        bail!("timestep must lie in (0, 86400] s, got {}", forcing.timestep);
    }
    let steps_per_day = (SECONDS_PER_DAY / forcing.timestep).round() as usize;
    let mut rng = StdRng::seed_from_u64(forcing.seed);

    let drivers = (0..forcing.days * steps_per_day)
        .map(|step| {
            let elapsed = step as f64 * forcing.timestep;
            let hour = (elapsed % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
            // Sunrise at 06:00, sunset at 18:00
            let daylight = (PI * (hour - 6.0) / 12.0).sin().max(0.0);
            let cloudiness = rng.random_range(0.7..1.0);

            let air_temperature =
                Celsius::new(15.0 + 12.0 * daylight + rng.random_range(-1.0..1.0));
            let specific_humidity = rng.random_range(0.006..0.009);
            let air_pressure_pa = 101_325.0 + rng.random_range(-500.0..500.0);
            let vpd = vapour_pressure_deficit(
                air_temperature.to_kelvin(),
                specific_humidity,
                air_pressure_pa,
                MINIMUM_VAPOUR_PRESSURE_DEFICIT,
            );
            let short_wave = 900.0 * daylight * cloudiness;
            let soil = forcing.initial_soil_water_potential
                - forcing.drydown_rate * elapsed / SECONDS_PER_DAY;

            Drivers::new(
                soil,
                air_temperature.to_kelvin(),
                vpd,
                air_pressure_pa / 1000.0,
                410.0 + rng.random_range(-5.0..5.0),
            )
            .with_utilised_par(short_wave_to_par(short_wave))
        })
        .collect();
    Ok(drivers)
}
