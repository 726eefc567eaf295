//! Semantic temperature types for type-safe driver handling
//!
//! Leaf and air temperatures enter the biochemistry in Kelvin, while forcing
//! files and humans think in degrees Celsius. These newtypes stop the two from
//! being mixed up when drivers are assembled.
//!
//! # Design Philosophy
//! - Temperatures are f64 because Arrhenius exponents amplify rounding error
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//! - Private inner fields with validated constructors
//! - Serde support (serialized as the bare number)
//!
//! # Usage
//! ```
//! use stomatal_core::core_types::units::{Celsius, Kelvin};
//!
//! let temp = Celsius::new(25.0);
//! let kelvin: Kelvin = temp.into();
//! assert!((*kelvin - 298.15).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Offset between the Celsius and Kelvin scales (0°C = 273.15 K)
const CELSIUS_KELVIN_OFFSET: f64 = 273.15;

// ============================================================================
// CELSIUS
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Reference temperature of the temperature-response functions
    pub const REFERENCE: Celsius = Celsius(25.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -CELSIUS_KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Celsius {
        k.to_celsius()
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

// ============================================================================
// KELVIN
// ============================================================================

/// Absolute temperature in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kelvin(f64);

impl Eq for Kelvin {}

impl PartialOrd for Kelvin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kelvin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Kelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Kelvin {
    /// 0°C
    pub const FREEZING: Kelvin = Kelvin(CELSIUS_KELVIN_OFFSET);

    /// 25°C, where the temperature-response functions are parameterised
    pub const REFERENCE: Kelvin = Kelvin(298.15);

    /// Create a new Kelvin temperature. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Kelvin::new: value is below absolute zero");
        Kelvin(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius(self.0 - CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}K", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_kelvin_round_trip() {
        let c = Celsius::new(21.5);
        let k = c.to_kelvin();
        assert!((*k - 294.65).abs() < 1e-12, "Kelvin was {}", *k);
        assert!((*Celsius::from(k) - 21.5).abs() < 1e-12);
    }

    #[test]
    fn test_reference_temperatures_agree() {
        assert!((*Celsius::REFERENCE.to_kelvin() - *Kelvin::REFERENCE).abs() < 1e-12);
        assert_eq!(Celsius::FREEZING.to_kelvin(), Kelvin::FREEZING);
    }

    #[test]
    fn test_total_ordering() {
        let cold = Kelvin::new(270.0);
        let warm = Kelvin::new(300.0);
        assert_eq!(cold.max(warm), warm);
        assert!(Celsius::new(-5.0) < Celsius::FREEZING);
    }

    #[test]
    #[should_panic(expected = "below absolute zero")]
    fn test_negative_kelvin_rejected() {
        let _ = Kelvin::new(-1.0);
    }
}
