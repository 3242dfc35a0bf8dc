use nalgebra::Vector3;
use std::f64::consts::TAU;

use crate::config::{ConfigError, ConfigNode};
use crate::rotor::blade::{Blade, BladeConfig, BladeEnvironment};
use crate::rotor::frames::{Frame, FrameSet};
use crate::utils::math::deg_to_rad;
use nalgebra::UnitQuaternion;

/// Summed hub reaction of all blades, expressed in body axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotorReaction {
    /// Hub force (N).
    pub force_bas: Vector3<f64>,
    /// Reaction moment on the airframe (N·m).
    pub moment_bas: Vector3<f64>,
    /// Torque the rotor demands from the shaft (N·m).
    pub shaft_torque: f64,
    /// Out-of-plane thrust along the shaft, positive up (N).
    pub thrust: f64,
}

/// A rotor of `N` identical blades at evenly spaced azimuths.
#[derive(Debug, Clone)]
pub struct Rotor {
    blades: Vec<Blade>,
    shaft_tilt: f64,
    /// +1 counter-clockwise seen from above, -1 clockwise.
    direction: f64,
    azimuth: f64,
}

impl Rotor {
    pub fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        let blade_count = node.u64("blades")? as usize;
        if blade_count == 0 {
            return Err(ConfigError::Validation(
                "rotor needs at least one blade".into(),
            ));
        }
        let blade_config = BladeConfig::read_data(&node.child("blade")?)?;
        let direction = if node.bool_or("counter_clockwise", true)? {
            1.0
        } else {
            -1.0
        };

        Ok(Self {
            blades: (0..blade_count)
                .map(|_| Blade::new(blade_config.clone()))
                .collect(),
            shaft_tilt: deg_to_rad(node.f64_or("shaft_tilt", 0.0)?),
            direction,
            azimuth: 0.0,
        })
    }

    pub fn blade_count(&self) -> usize {
        self.blades.len()
    }

    pub fn blades(&self) -> &[Blade] {
        &self.blades
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Updates every blade at its own azimuth, advances the hub azimuth and
    /// sums the blade reactions at the hub.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        rotor_speed: f64,
        collective: f64,
        cyclic_lon: f64,
        cyclic_lat: f64,
        air_density: f64,
        velocity_bas: Vector3<f64>,
        dt: f64,
    ) -> RotorReaction {
        let blade_count = self.blades.len();
        let mut thrust = 0.0;
        let mut torque = 0.0;

        for (index, blade) in self.blades.iter_mut().enumerate() {
            let azimuth = self.azimuth + TAU * index as f64 / blade_count as f64;
            let frames = FrameSet::new(&UnitQuaternion::identity(), self.shaft_tilt, azimuth);
            let env = BladeEnvironment {
                rotor_speed,
                azimuth,
                collective,
                cyclic_lon,
                cyclic_lat,
                air_density,
                velocity_ras: frames.rotate(&velocity_bas, Frame::Bas, Frame::Ras),
            };
            let reaction = blade.update(&env, dt);
            thrust += reaction.thrust;
            torque += reaction.torque;
        }

        self.azimuth = (self.azimuth + self.direction * rotor_speed * dt).rem_euclid(TAU);

        // Hub loads act along the shaft; tilt them back into body axes
        let shaft = FrameSet::new(&UnitQuaternion::identity(), self.shaft_tilt, 0.0);
        let force_bas = shaft.rotate(&Vector3::new(0.0, 0.0, -thrust), Frame::Ras, Frame::Bas);
        // Driving the rotor reacts the torque onto the airframe, opposing
        // the direction of rotation
        let moment_bas = shaft.rotate(
            &Vector3::new(0.0, 0.0, self.direction * torque),
            Frame::Ras,
            Frame::Bas,
        );

        RotorReaction {
            force_bas,
            moment_bas,
            shaft_torque: torque,
            thrust,
        }
    }
}
