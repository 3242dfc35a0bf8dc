//! The FDM façade: the sole interface crossing into caller code.
//!
//! Consumes a [`DataInp`] and produces a [`DataOut`] once per step; all
//! simulation state lives behind it in the owned [`Aircraft`].

mod data;

pub use data::{
    AccelerationOut, AirDataOut, AttitudeOut, ControlInputs, DataInp, DataOut, EngineCommands,
    EngineOut, EnvironmentInputs, GearOut, MassInputs, PositionOut, VelocityOut,
};

use log::{info, warn};

use crate::config::{ConfigDocument, DataDir};
use crate::physics::SpatialState;
use crate::utils::constants::{
    AIR_GAS_CONSTANT, FDM_TIME_STEP_DEFAULT, FDM_TIME_STEP_MAX, FDM_TIME_STEP_MIN, GRAVITY,
    ISA_LAPSE_RATE, ISA_SEA_LEVEL_DENSITY, ISA_SEA_LEVEL_PRESSURE, ISA_SEA_LEVEL_TEMP,
};
use crate::utils::math::{
    flight_path_angle, heading_from_velocity, quaternion_to_euler, rad_to_deg,
};
use crate::utils::SimError;
use crate::vehicles::{Aircraft, VehicleVariant};

/// Convergence parameters for the on-ground settling procedure.
///
/// The exact thresholds are deliberately configurable; callers with softer
/// gear or heavier vehicles tune them rather than rely on fixed constants.
#[derive(Debug, Clone, Copy)]
pub struct SettleConfig {
    /// Iteration bound before settling is abandoned.
    pub max_iterations: usize,
    /// Vertical-speed window considered at rest (m/s).
    pub vertical_speed_tolerance: f64,
    /// Consecutive in-window steps required with ground contact.
    pub hold_steps: usize,
    /// Timestep used while settling (s).
    pub dt: f64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            max_iterations: 600,
            vertical_speed_tolerance: 0.05,
            hold_steps: 50,
            dt: FDM_TIME_STEP_DEFAULT,
        }
    }
}

/// Result of the settling procedure. Not settling is a status the caller
/// decides about, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStatus {
    Settled { iterations: usize },
    NotSettled,
}

/// Pressure altitude in the troposphere segment of the standard
/// atmosphere (m).
fn pressure_altitude(pressure: f64) -> f64 {
    let ratio = (pressure / ISA_SEA_LEVEL_PRESSURE)
        .powf(-AIR_GAS_CONSTANT * ISA_LAPSE_RATE / GRAVITY);
    ISA_SEA_LEVEL_TEMP / ISA_LAPSE_RATE * (ratio - 1.0)
}

/// Flight dynamics model façade.
pub struct Fdm {
    aircraft: Aircraft,
    output: DataOut,
    time: f64,
}

impl Fdm {
    /// Constructs the aircraft from its configuration file, resolved
    /// against the base data directory. Configuration errors are fatal to
    /// the instance and propagate out of the constructor.
    pub fn new(data_dir: &DataDir, vehicle_file: &str, seed: u64) -> Result<Self, SimError> {
        let path = data_dir.resolve(vehicle_file);
        let doc = ConfigDocument::load(&path).map_err(SimError::Config)?;
        Self::from_document(&doc, seed)
    }

    pub fn from_document(doc: &ConfigDocument, seed: u64) -> Result<Self, SimError> {
        let aircraft = Aircraft::from_config(doc, seed)?;
        info!("FDM ready for '{}'", aircraft.name());
        Ok(Self {
            aircraft,
            output: DataOut::default(),
            time: 0.0,
        })
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.aircraft
    }

    pub fn aircraft_mut(&mut self) -> &mut Aircraft {
        &mut self.aircraft
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// The last telemetry snapshot.
    pub fn output(&self) -> &DataOut {
        &self.output
    }

    /// Advances the simulation one step and rebuilds the output snapshot.
    ///
    /// `dt` outside the supported range is clamped, never rejected.
    pub fn step(&mut self, input: &DataInp, dt: f64) -> &DataOut {
        let dt = dt.clamp(FDM_TIME_STEP_MIN, FDM_TIME_STEP_MAX);
        self.aircraft.update(input, dt);
        self.time += dt;
        self.update_data_out();
        &self.output
    }

    /// On-ground settling: repeatedly steps from the supplied initial
    /// altitude until the vertical speed stays inside the tolerance with
    /// ground contact, or the iteration bound runs out.
    pub fn settle_on_ground(
        &mut self,
        input: &DataInp,
        initial_altitude: f64,
        config: &SettleConfig,
    ) -> SettleStatus {
        self.aircraft
            .set_spatial(SpatialState::at_altitude(initial_altitude));

        let mut held = 0;
        for iteration in 0..config.max_iterations {
            self.step(input, config.dt);

            let spatial = self.aircraft.spatial();
            let at_rest = spatial.climb_rate().abs() < config.vertical_speed_tolerance
                && self.aircraft.on_ground();
            held = if at_rest { held + 1 } else { 0 };

            if held >= config.hold_steps {
                info!("settled on ground after {} iterations", iteration + 1);
                return SettleStatus::Settled {
                    iterations: iteration + 1,
                };
            }
        }

        warn!(
            "ground settling did not converge within {} iterations",
            config.max_iterations
        );
        SettleStatus::NotSettled
    }

    /// Fills the generic output fields, then appends the vehicle variant's
    /// extension fields. The snapshot is replaced wholesale; a consumer
    /// never sees a partially updated frame.
    fn update_data_out(&mut self) {
        let aircraft = &self.aircraft;
        let spatial = aircraft.spatial();
        let air = aircraft.air_data();
        let atmosphere = aircraft.atmosphere();
        let euler = quaternion_to_euler(&spatial.attitude);
        let velocity_ned = spatial.velocity_ned();
        let acceleration = aircraft.acceleration();

        let mut out = DataOut {
            time: self.time,
            position: PositionOut {
                north: spatial.position.x,
                east: spatial.position.y,
                altitude_asl: spatial.altitude_asl(),
            },
            attitude: AttitudeOut {
                roll: euler.x,
                pitch: euler.y,
                heading: euler.z.rem_euclid(std::f64::consts::TAU),
            },
            velocity: VelocityOut {
                u: spatial.velocity.x,
                v: spatial.velocity.y,
                w: spatial.velocity.z,
                p: spatial.angular_velocity.x,
                q: spatial.angular_velocity.y,
                r: spatial.angular_velocity.z,
                climb_rate: spatial.climb_rate(),
                groundspeed: (velocity_ned.x * velocity_ned.x + velocity_ned.y * velocity_ned.y)
                    .sqrt(),
                ground_track: heading_from_velocity(&velocity_ned),
                flight_path: flight_path_angle(&velocity_ned),
            },
            acceleration: AccelerationOut {
                ax: acceleration.x,
                ay: acceleration.y,
                az: acceleration.z,
                load_factor: aircraft.load_factor(),
            },
            air: AirDataOut {
                airspeed_true: air.true_airspeed,
                airspeed_indicated: air.true_airspeed
                    * (air.density / ISA_SEA_LEVEL_DENSITY).sqrt(),
                alpha: air.alpha,
                beta: air.beta,
                altitude_baro: pressure_altitude(atmosphere.pressure),
                density: atmosphere.density,
                pressure: atmosphere.pressure,
                temperature: atmosphere.temperature,
            },
            engines: aircraft
                .propulsion()
                .engines()
                .iter()
                .map(|engine| EngineOut {
                    running: engine.running(),
                    rpm: engine.rpm(),
                    torque: engine.torque(),
                    thrust: engine.thrust(),
                    fuel_flow: engine.fuel_flow(),
                })
                .collect(),
            gear: aircraft
                .gear_states()
                .iter()
                .map(|state| GearOut {
                    compression: state.compression,
                    contact: state.contact,
                })
                .collect(),
            on_ground: aircraft.on_ground(),
            extra: Default::default(),
        };

        match aircraft.variant() {
            VehicleVariant::Airplane => Self::airplane_extension(aircraft, &mut out),
            VehicleVariant::RotorRig => Self::rotor_rig_extension(aircraft, &mut out),
        }

        self.output = out;
    }

    /// Airplane variant: control-surface positions in degrees.
    fn airplane_extension(aircraft: &Aircraft, out: &mut DataOut) {
        let deflections = aircraft.deflections();
        out.extra
            .insert("elevator_deg".into(), rad_to_deg(deflections.elevator));
        out.extra
            .insert("aileron_deg".into(), rad_to_deg(deflections.aileron));
        out.extra
            .insert("rudder_deg".into(), rad_to_deg(deflections.rudder));
        out.extra
            .insert("flaps_deg".into(), rad_to_deg(deflections.flaps));
    }

    /// Rotor rig variant: rotor and governor state.
    fn rotor_rig_extension(aircraft: &Aircraft, out: &mut DataOut) {
        let propulsion = aircraft.propulsion();
        if let Some(rotor) = propulsion.rotor() {
            out.extra.insert("rotor_azimuth".into(), rotor.azimuth());
            if let Some(blade) = rotor.blades().first() {
                out.extra.insert("blade_flap".into(), blade.flap);
                out.extra.insert("blade_lag".into(), blade.lag);
            }
        }
        out.extra
            .insert("rotor_thrust".into(), propulsion.rotor_reaction().thrust);
        if let Some(governor) = propulsion.governor() {
            out.extra.insert("governor_pitch".into(), governor.pitch());
        }
    }
}
