use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigNode};
use crate::control::Lag;
use crate::utils::math::deg_to_rad;
use crate::vehicles::module::{Module, StepContext};

/// Resolved control-surface and lever positions for one step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ControlDeflections {
    /// Elevator deflection (rad), positive trailing-edge down.
    pub elevator: f64,
    /// Aileron deflection (rad), positive right-roll command.
    pub aileron: f64,
    /// Rudder deflection (rad), positive nose-right.
    pub rudder: f64,
    /// Flap deflection (rad).
    pub flaps: f64,
    /// Power lever position, 0..1.
    pub throttle: f64,
    /// Brake application, 0..1.
    pub brakes: f64,
    /// Collective pitch (rad), rotor variants.
    pub collective: f64,
    /// Longitudinal cyclic pitch (rad).
    pub cyclic_lon: f64,
    /// Lateral cyclic pitch (rad).
    pub cyclic_lat: f64,
}

/// One control channel: travel limit plus actuator lag.
#[derive(Debug, Clone)]
struct Channel {
    travel: f64,
    actuator: Lag,
}

impl Channel {
    fn unused() -> Self {
        Self {
            travel: 0.0,
            actuator: Lag::new(0.0),
        }
    }

    fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        Ok(Self {
            travel: deg_to_rad(node.f64("travel")?),
            actuator: Lag::new(node.f64_or("lag", 0.0)?),
        })
    }

    /// Drives the actuator toward `command` (normalized -1..1) and returns
    /// the deflection.
    fn update(&mut self, command: f64, dt: f64) -> f64 {
        let target = command.clamp(-1.0, 1.0) * self.travel;
        self.actuator.update(target, dt)
    }
}

/// Flight controls: maps pilot inputs to surface deflections through
/// per-channel travel limits, trim authority and actuator lags.
#[derive(Debug, Clone)]
pub struct Controls {
    elevator: Channel,
    aileron: Channel,
    rudder: Channel,
    flaps: Channel,
    collective: Channel,
    cyclic_lon: Channel,
    cyclic_lat: Channel,
    trim_authority: f64,
    deflections: ControlDeflections,
}

impl Controls {
    pub fn new() -> Self {
        Self {
            elevator: Channel::unused(),
            aileron: Channel::unused(),
            rudder: Channel::unused(),
            flaps: Channel::unused(),
            collective: Channel::unused(),
            cyclic_lon: Channel::unused(),
            cyclic_lat: Channel::unused(),
            trim_authority: 0.0,
            deflections: ControlDeflections::default(),
        }
    }

    pub fn deflections(&self) -> &ControlDeflections {
        &self.deflections
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Controls {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError> {
        self.elevator = Channel::read_data(&node.child("elevator")?)?;
        self.aileron = Channel::read_data(&node.child("aileron")?)?;
        self.rudder = Channel::read_data(&node.child("rudder")?)?;
        self.flaps = Channel::read_data(&node.child("flaps")?)?;
        self.trim_authority = node.f64_or("trim_authority", 0.0)?;

        // Rotor variants carry collective and cyclic channels
        if let Some(collective) = node.try_child("collective") {
            self.collective = Channel::read_data(&collective)?;
        }
        if let Some(cyclic) = node.try_child("cyclic") {
            // Both cyclic axes share the swashplate geometry
            self.cyclic_lon = Channel::read_data(&cyclic)?;
            self.cyclic_lat = Channel::read_data(&cyclic)?;
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext) {
        let input = &ctx.input.controls;
        let dt = ctx.dt;
        let trim = self.trim_authority;

        self.deflections.elevator = self
            .elevator
            .update(input.stick_pitch + trim * input.trim_pitch, dt);
        self.deflections.aileron = self
            .aileron
            .update(input.stick_roll + trim * input.trim_roll, dt);
        self.deflections.rudder = self.rudder.update(input.pedals + trim * input.trim_yaw, dt);
        self.deflections.flaps = self.flaps.update(input.flaps.clamp(0.0, 1.0), dt);
        self.deflections.collective = self
            .collective
            .update(input.collective.clamp(0.0, 1.0), dt);
        self.deflections.cyclic_lon = self.cyclic_lon.update(input.stick_pitch, dt);
        self.deflections.cyclic_lat = self.cyclic_lat.update(input.stick_roll, dt);
        self.deflections.throttle = input.throttle.clamp(0.0, 1.0);
        self.deflections.brakes = input.brakes.clamp(0.0, 1.0);

        ctx.deflections = self.deflections;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::fdm::DataInp;
    use crate::physics::SpatialState;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const CONTROLS_DOC: &str = r#"
elevator: { travel: 25.0, lag: 0.0 }
aileron: { travel: 20.0, lag: 0.0 }
rudder: { travel: 30.0, lag: 0.0 }
flaps: { travel: 30.0, lag: 0.0 }
trim_authority: 0.2
"#;

    fn make_controls() -> Controls {
        let doc = ConfigDocument::from_str(CONTROLS_DOC).unwrap();
        let mut controls = Controls::new();
        controls.read_data(&doc.root()).unwrap();
        controls
    }

    #[test]
    fn test_full_deflection() {
        let mut controls = make_controls();
        let mut input = DataInp::default();
        input.controls.stick_pitch = 1.0;

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        controls.update(&mut ctx);

        assert_relative_eq!(ctx.deflections.elevator, 25.0 * PI / 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_command_clamped_to_travel() {
        let mut controls = make_controls();
        let mut input = DataInp::default();
        input.controls.stick_roll = 2.0;

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        controls.update(&mut ctx);

        assert_relative_eq!(ctx.deflections.aileron, 20.0 * PI / 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trim_adds_to_command() {
        let mut controls = make_controls();
        let mut input = DataInp::default();
        input.controls.trim_pitch = 0.5;

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        controls.update(&mut ctx);

        // 0.2 authority * 0.5 trim * 25 deg travel
        assert_relative_eq!(
            ctx.deflections.elevator,
            0.1 * 25.0 * PI / 180.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_actuator_lag_delays_response() {
        let doc = ConfigDocument::from_str(
            r#"
elevator: { travel: 25.0, lag: 0.5 }
aileron: { travel: 20.0, lag: 0.0 }
rudder: { travel: 30.0, lag: 0.0 }
flaps: { travel: 30.0, lag: 0.0 }
"#,
        )
        .unwrap();
        let mut controls = Controls::new();
        controls.read_data(&doc.root()).unwrap();

        let mut input = DataInp::default();
        input.controls.stick_pitch = 1.0;
        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        controls.update(&mut ctx);

        let full = 25.0 * PI / 180.0;
        assert!(ctx.deflections.elevator > 0.0);
        assert!(ctx.deflections.elevator < 0.5 * full);
    }
}
