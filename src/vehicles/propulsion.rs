use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

use crate::config::{ConfigError, ConfigNode};
use crate::control::Inertia;
use crate::fdm::EngineCommands;
use crate::physics::{Force, ForceCategory, Moment};
use crate::rotor::{Rotor, RotorReaction};
use crate::utils::constants::ISA_SEA_LEVEL_DENSITY;
use crate::utils::math::{deg_to_rad, Table1};
use crate::vehicles::module::{Module, StepContext};

/// Shaft speed fraction above which the starter can hand over.
const START_SPEED_FRACTION: f64 = 0.1;
/// Starter motor torque as a fraction of rated torque.
const STARTER_TORQUE_FRACTION: f64 = 0.2;
/// Shaft speed fraction where the starter stops helping.
const STARTER_CUTOUT_FRACTION: f64 = 0.3;

/// Constant-speed governor.
///
/// Maps the normalized lever position to a target shaft speed through a
/// configured curve, then drives a pitch command through two gain stages.
/// Only the last computed pitch persists between steps.
#[derive(Debug, Clone)]
pub struct Governor {
    curve: Table1,
    gain_1: f64,
    gain_2: f64,
    min_pitch: f64,
    max_pitch: f64,
    pitch: f64,
}

impl Governor {
    pub fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        let curve = node.table1("curve")?;
        let (lever_min, lever_max) = curve.domain();
        if lever_min > 0.0 || lever_max < 1.0 {
            return Err(ConfigError::Validation(format!(
                "governor curve covers {:.2}..{:.2}, must span the full lever range 0..1",
                lever_min, lever_max
            )));
        }

        Ok(Self {
            curve,
            gain_1: node.f64("gain_1")?,
            gain_2: node.f64("gain_2")?,
            min_pitch: deg_to_rad(node.f64_or("min_pitch", 0.0)?),
            max_pitch: deg_to_rad(node.f64_or("max_pitch", 90.0)?),
            pitch: 0.0,
        })
    }

    /// Target shaft speed (rad/s) for a lever position.
    pub fn target_speed(&self, lever: f64) -> f64 {
        self.curve.get(lever)
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Overspeed raises the pitch (and with it the shaft load), pulling the
    /// speed back toward the target.
    pub fn update(&mut self, lever: f64, shaft_speed: f64, dt: f64) -> f64 {
        if dt > 0.0 {
            let error = shaft_speed - self.target_speed(lever);
            let pitch_rate = self.gain_2 * (self.gain_1 * error);
            self.pitch = (self.pitch + pitch_rate * dt).clamp(self.min_pitch, self.max_pitch);
        }
        self.pitch
    }
}

#[derive(Debug, Clone)]
struct EngineConfig {
    name: String,
    /// Thrust line origin in the body frame (m).
    position: Point3<f64>,
    /// Static thrust range (N).
    max_thrust: f64,
    min_thrust: f64,
    /// Spool time constants (s).
    spool_up: f64,
    spool_down: f64,
    /// Thrust-specific fuel consumption (kg/(N·s)).
    tsfc: f64,
    /// Power-specific fuel consumption (kg/(W·s)), for shaft-driven loads.
    psfc: f64,
    /// Rated shaft torque (N·m) at rated speed (rad/s).
    rated_torque: f64,
    rated_speed: f64,
    /// Rotating assembly inertia (kg·m^2).
    shaft_inertia: f64,
    /// Extra shaft load per radian of governor pitch.
    pitch_load: f64,
}

impl EngineConfig {
    fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        Ok(Self {
            name: node.string("name")?,
            position: node.vector3("position")?.into(),
            max_thrust: node.f64_or("max_thrust", 0.0)?,
            min_thrust: node.f64_or("min_thrust", 0.0)?,
            spool_up: node.f64("spool_up")?,
            spool_down: node.f64("spool_down")?,
            tsfc: node.f64_or("tsfc", 0.0)?,
            psfc: node.f64_or("psfc", 0.0)?,
            rated_torque: node.f64("rated_torque")?,
            rated_speed: node.f64("rated_speed")?,
            shaft_inertia: node.f64("shaft_inertia")?,
            pitch_load: node.f64_or("pitch_load", 0.0)?,
        })
    }
}

/// One engine: spool dynamics, thrust/torque production and shaft speed as
/// an integrable state.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    spool: Inertia,
    running: bool,
    starter_engaged: bool,
    /// Shaft speed (rad/s), advanced in post-integration bookkeeping.
    shaft_speed: f64,
    /// Baseline load coefficient so the unloaded shaft settles at rated
    /// speed under full torque.
    load_coef: f64,
    torque: f64,
    thrust: f64,
    fuel_flow: f64,
    /// Shaft load handed over by an external consumer (the rotor), N·m.
    external_load: Option<f64>,
    governor_pitch: f64,
}

impl Engine {
    fn new(config: EngineConfig) -> Self {
        let load_coef = config.rated_torque / (config.rated_speed * config.rated_speed);
        let spool = Inertia::new(config.spool_up, config.spool_down);
        Self {
            config,
            spool,
            running: false,
            starter_engaged: false,
            shaft_speed: 0.0,
            load_coef,
            torque: 0.0,
            thrust: 0.0,
            fuel_flow: 0.0,
            external_load: None,
            governor_pitch: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn shaft_speed(&self) -> f64 {
        self.shaft_speed
    }

    pub fn rpm(&self) -> f64 {
        self.shaft_speed * 60.0 / TAU
    }

    pub fn torque(&self) -> f64 {
        self.torque
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn fuel_flow(&self) -> f64 {
        self.fuel_flow
    }

    fn handle_commands(&mut self, commands: &EngineCommands) {
        self.starter_engaged = commands.starter;
        if commands.fuel_shutoff {
            self.running = false;
        } else if !self.running
            && commands.starter
            && self.shaft_speed > START_SPEED_FRACTION * self.config.rated_speed
        {
            self.running = true;
        }
    }

    /// Advances spool state and recomputes torque, thrust and fuel flow
    /// from the current air state.
    fn update(&mut self, commands: &EngineCommands, throttle: f64, ctx: &StepContext) {
        self.handle_commands(commands);

        let target = if self.running {
            throttle.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let fraction = self.spool.update(target, ctx.dt).clamp(0.0, 1.0);

        let density_ratio = (ctx.atmosphere.density / ISA_SEA_LEVEL_DENSITY).max(0.01);
        self.torque = self.config.rated_torque * fraction * density_ratio;

        // Ram and density corrections per the thrust model
        let mach = ctx.air_data.true_airspeed / ctx.atmosphere.speed_of_sound;
        let ram_factor = (1.0 - 0.1 * mach).max(0.0);
        let max_thrust = (self.config.max_thrust * density_ratio.sqrt() * ram_factor).max(0.0);
        let min_thrust = (self.config.min_thrust * density_ratio.sqrt()).max(0.0);
        let effective_max = max_thrust.max(min_thrust);
        self.thrust = if self.running {
            min_thrust + (effective_max - min_thrust) * fraction
        } else {
            0.0
        };

        self.fuel_flow = if self.running {
            let inefficiency = 1.0 + 0.2 * fraction;
            (self.thrust * self.config.tsfc
                + self.torque * self.shaft_speed * self.config.psfc)
                * inefficiency
        } else {
            0.0
        };
    }

    /// Integrates the shaft speed from the torque balance. Runs after the
    /// rigid-body integration, once the shaft's consumers have reported
    /// their load.
    fn post_integrate(&mut self, dt: f64) {
        let starter_torque = if self.starter_engaged
            && self.shaft_speed < STARTER_CUTOUT_FRACTION * self.config.rated_speed
        {
            STARTER_TORQUE_FRACTION * self.config.rated_torque
        } else {
            0.0
        };

        let load = match self.external_load.take() {
            Some(torque) => torque,
            None => {
                self.load_coef
                    * self.shaft_speed
                    * self.shaft_speed
                    * (1.0 + self.config.pitch_load * self.governor_pitch)
            }
        };

        let net_torque = self.torque + starter_torque - load;
        self.shaft_speed =
            (self.shaft_speed + net_torque / self.config.shaft_inertia * dt).max(0.0);
    }
}

/// Propulsion subsystem: engines, optional governor, optional rotor.
#[derive(Debug, Clone, Default)]
pub struct Propulsion {
    engines: Vec<Engine>,
    governor: Option<Governor>,
    rotor: Option<Rotor>,
    rotor_reaction: RotorReaction,
}

impl Propulsion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn governor(&self) -> Option<&Governor> {
        self.governor.as_ref()
    }

    pub fn rotor(&self) -> Option<&Rotor> {
        self.rotor.as_ref()
    }

    pub fn rotor_reaction(&self) -> &RotorReaction {
        &self.rotor_reaction
    }

    /// Advances the integrable engine/rotor shaft states. Called by the
    /// aircraft during post-integration bookkeeping.
    pub fn post_integrate(&mut self, dt: f64) {
        for engine in &mut self.engines {
            engine.post_integrate(dt);
        }
    }
}

impl Module for Propulsion {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError> {
        self.engines = node
            .children("engines")?
            .iter()
            .map(|engine| EngineConfig::read_data(engine).map(Engine::new))
            .collect::<Result<_, _>>()?;
        if self.engines.is_empty() {
            return Err(ConfigError::Validation(
                "propulsion requires at least one engine".into(),
            ));
        }

        self.governor = match node.try_child("governor") {
            Some(governor) => Some(Governor::read_data(&governor)?),
            None => None,
        };
        self.rotor = match node.try_child("rotor") {
            Some(rotor) => Some(Rotor::read_data(&rotor)?),
            None => None,
        };
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext) {
        let throttle = ctx.deflections.throttle;

        for engine in &mut self.engines {
            engine.update(&ctx.input.engine, throttle, ctx);

            if engine.thrust > 0.0 {
                ctx.forces.add_force(Force::body_at(
                    Vector3::new(engine.thrust, 0.0, 0.0),
                    engine.config.position,
                    ForceCategory::Propulsive,
                ));
            }
        }

        // Governor drives pitch from the shaft speed of the first engine
        let governor_pitch = match &mut self.governor {
            Some(governor) => {
                let lever = if self.rotor.is_some() {
                    ctx.input.controls.collective
                } else {
                    throttle
                };
                governor.update(lever, self.engines[0].shaft_speed, ctx.dt)
            }
            None => 0.0,
        };
        for engine in &mut self.engines {
            engine.governor_pitch = governor_pitch;
        }

        if let Some(rotor) = &mut self.rotor {
            let collective = ctx.deflections.collective + governor_pitch;
            self.rotor_reaction = rotor.update(
                self.engines[0].shaft_speed,
                collective,
                ctx.deflections.cyclic_lon,
                ctx.deflections.cyclic_lat,
                ctx.atmosphere.density,
                ctx.spatial.velocity,
                ctx.dt,
            );
            self.engines[0].external_load = Some(self.rotor_reaction.shaft_torque);

            ctx.forces.add_force(Force::body(
                self.rotor_reaction.force_bas,
                ForceCategory::Propulsive,
            ));
            ctx.forces.add_moment(Moment::body(
                self.rotor_reaction.moment_bas,
                ForceCategory::Propulsive,
            ));
        }
    }
}
