use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    AIR_GAS_CONSTANT, GRAVITY, HEAT_CAPACITY_RATIO, ISA_LAPSE_RATE, ISA_SEA_LEVEL_PRESSURE,
    ISA_SEA_LEVEL_TEMP, ISA_TROPOPAUSE_ALT,
};

/// Standard-atmosphere state at the current altitude.
///
/// Linear lapse below the tropopause, isothermal above. Pure function of
/// altitude; `update` may be called any number of times per step without
/// hysteresis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Static air temperature (K).
    pub temperature: f64,
    /// Static pressure (Pa).
    pub pressure: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    /// Speed of sound (m/s).
    pub speed_of_sound: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        let mut atmosphere = Self {
            temperature: 0.0,
            pressure: 0.0,
            density: 0.0,
            speed_of_sound: 0.0,
        };
        atmosphere.update(0.0);
        atmosphere
    }
}

impl Atmosphere {
    pub fn new(altitude_asl: f64) -> Self {
        let mut atmosphere = Self::default();
        atmosphere.update(altitude_asl);
        atmosphere
    }

    /// Recomputes all properties for the given altitude above sea level (m).
    pub fn update(&mut self, altitude_asl: f64) {
        // Negative altitudes extrapolate the troposphere segment
        let (temperature, pressure) = if altitude_asl <= ISA_TROPOPAUSE_ALT {
            let t = ISA_SEA_LEVEL_TEMP + ISA_LAPSE_RATE * altitude_asl;
            let p = ISA_SEA_LEVEL_PRESSURE
                * (t / ISA_SEA_LEVEL_TEMP).powf(-GRAVITY / (AIR_GAS_CONSTANT * ISA_LAPSE_RATE));
            (t, p)
        } else {
            let t11 = ISA_SEA_LEVEL_TEMP + ISA_LAPSE_RATE * ISA_TROPOPAUSE_ALT;
            let p11 = ISA_SEA_LEVEL_PRESSURE
                * (t11 / ISA_SEA_LEVEL_TEMP).powf(-GRAVITY / (AIR_GAS_CONSTANT * ISA_LAPSE_RATE));
            let p = p11 * (-GRAVITY * (altitude_asl - ISA_TROPOPAUSE_ALT) / (AIR_GAS_CONSTANT * t11))
                .exp();
            (t11, p)
        };

        self.temperature = temperature;
        self.pressure = pressure;
        self.density = pressure / (AIR_GAS_CONSTANT * temperature);
        self.speed_of_sound = (HEAT_CAPACITY_RATIO * AIR_GAS_CONSTANT * temperature).sqrt();
    }
}
