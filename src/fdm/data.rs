use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pilot control inputs, normalized lever/stick positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Longitudinal stick, -1..1, positive aft (nose up).
    pub stick_pitch: f64,
    /// Lateral stick, -1..1, positive right.
    pub stick_roll: f64,
    /// Pedals, -1..1, positive right.
    pub pedals: f64,
    /// Collective lever, 0..1 (rotor variants).
    pub collective: f64,
    /// Throttle/power lever, 0..1.
    pub throttle: f64,
    /// Flap lever, 0..1.
    pub flaps: f64,
    /// Wheel brakes, 0..1.
    pub brakes: f64,
    /// Trim offsets, -1..1 of full travel authority.
    pub trim_pitch: f64,
    pub trim_roll: f64,
    pub trim_yaw: f64,
    /// Landing gear lever.
    pub gear_down: bool,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            stick_pitch: 0.0,
            stick_roll: 0.0,
            pedals: 0.0,
            collective: 0.0,
            throttle: 0.0,
            flaps: 0.0,
            brakes: 0.0,
            trim_pitch: 0.0,
            trim_roll: 0.0,
            trim_yaw: 0.0,
            gear_down: true,
        }
    }
}

/// Environment overrides supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvironmentInputs {
    /// Mean wind in the NED frame (m/s).
    pub wind_ned: Vector3<f64>,
    pub turbulence: bool,
    /// Gust intensity (m/s).
    pub turbulence_intensity: f64,
    pub turbulence_seed: u64,
}

impl Default for EnvironmentInputs {
    fn default() -> Self {
        Self {
            wind_ned: Vector3::zeros(),
            turbulence: false,
            turbulence_intensity: 0.0,
            turbulence_seed: 0,
        }
    }
}

/// Discrete engine commands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct EngineCommands {
    /// Starter engaged.
    pub starter: bool,
    /// Fuel/ignition cut; stops all engines while held.
    pub fuel_shutoff: bool,
}

/// Runtime-supplied masses (kg), consumed by mass points declared variable
/// in the vehicle configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct MassInputs {
    pub pilot: f64,
    pub copilot: f64,
    pub fuel: f64,
    pub cargo: f64,
}

/// Per-step input to the FDM. Read-only; produced by the external caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DataInp {
    pub controls: ControlInputs,
    pub environment: EnvironmentInputs,
    pub engine: EngineCommands,
    pub masses: MassInputs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PositionOut {
    /// NED position relative to the simulation origin (m).
    pub north: f64,
    pub east: f64,
    /// Altitude above sea level (m).
    pub altitude_asl: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct AttitudeOut {
    /// Euler angles (rad).
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct VelocityOut {
    /// Body-axis linear velocity (m/s).
    pub u: f64,
    pub v: f64,
    pub w: f64,
    /// Body-axis angular velocity (rad/s).
    pub p: f64,
    pub q: f64,
    pub r: f64,
    /// Positive-up climb rate (m/s).
    pub climb_rate: f64,
    pub groundspeed: f64,
    /// Ground-track direction of the NED velocity (rad, atan2 convention).
    pub ground_track: f64,
    /// Flight-path angle (rad), positive climbing.
    pub flight_path: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct AccelerationOut {
    /// Body-axis acceleration including gravity (m/s^2).
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    /// Normal load factor (g).
    pub load_factor: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct AirDataOut {
    pub airspeed_true: f64,
    pub airspeed_indicated: f64,
    /// Angle of attack (rad).
    pub alpha: f64,
    /// Sideslip angle (rad).
    pub beta: f64,
    /// Pressure altitude from the static pressure (m).
    pub altitude_baro: f64,
    pub density: f64,
    pub pressure: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct EngineOut {
    pub running: bool,
    /// Shaft speed (RPM).
    pub rpm: f64,
    /// Shaft torque (N·m).
    pub torque: f64,
    /// Thrust (N).
    pub thrust: f64,
    /// Fuel flow (kg/s).
    pub fuel_flow: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct GearOut {
    /// Strut compression (m).
    pub compression: f64,
    pub contact: bool,
}

/// Per-step telemetry snapshot. Rebuilt in full every step; a consumer
/// never observes a partially written frame.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataOut {
    pub time: f64,
    pub position: PositionOut,
    pub attitude: AttitudeOut,
    pub velocity: VelocityOut,
    pub acceleration: AccelerationOut,
    pub air: AirDataOut,
    pub engines: Vec<EngineOut>,
    pub gear: Vec<GearOut>,
    pub on_ground: bool,
    /// Vehicle-specific extension fields, appended by the variant's output
    /// stage (control surface positions, rotor states).
    pub extra: BTreeMap<String, f64>,
}
