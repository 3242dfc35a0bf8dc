pub const GRAVITY: f64 = 9.80665; // m/s^2
pub const AIR_GAS_CONSTANT: f64 = 287.05287; // J/(kg·K)
pub const HEAT_CAPACITY_RATIO: f64 = 1.4; // dry air

pub const ISA_SEA_LEVEL_TEMP: f64 = 288.15; // K
pub const ISA_SEA_LEVEL_PRESSURE: f64 = 101325.0; // Pa
pub const ISA_SEA_LEVEL_DENSITY: f64 = 1.225; // kg/m^3
pub const ISA_LAPSE_RATE: f64 = -0.0065; // K/m, below the tropopause
pub const ISA_TROPOPAUSE_ALT: f64 = 11_000.0; // m

pub const FDM_TIME_STEP_MIN: f64 = 0.001; // s
pub const FDM_TIME_STEP_MAX: f64 = 0.1; // s
pub const FDM_TIME_STEP_DEFAULT: f64 = 0.005; // s, 200 Hz

// Physical limits applied after integration
pub const MAX_VELOCITY: f64 = 1000.0; // m/s
pub const MAX_ANGULAR_VELOCITY: f64 = 100.0; // rad/s
