use nalgebra::Vector3;

use crate::config::{ConfigError, ConfigNode};

/// Geometry and structural parameters of one blade.
#[derive(Debug, Clone)]
pub struct BladeConfig {
    /// Blade mass (kg).
    pub mass: f64,
    /// Rotor radius (m).
    pub radius: f64,
    /// Flap/lag hinge offset from the shaft (m).
    pub hinge_offset: f64,
    /// Blade chord (m).
    pub chord: f64,
    /// Section lift-curve slope (per rad).
    pub lift_slope: f64,
    /// Section profile drag coefficient.
    pub drag_coef: f64,
    /// Hinge spring stiffness (N·m/rad) and damping (N·m·s/rad).
    pub flap_spring: f64,
    pub flap_damper: f64,
    pub lag_spring: f64,
    pub lag_damper: f64,
    /// Number of spanwise integration stations.
    pub stations: usize,
}

impl BladeConfig {
    pub fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        Ok(Self {
            mass: node.f64("mass")?,
            radius: node.f64("radius")?,
            hinge_offset: node.f64_or("hinge_offset", 0.0)?,
            chord: node.f64("chord")?,
            lift_slope: node.f64("lift_slope")?,
            drag_coef: node.f64_or("drag_coef", 0.01)?,
            flap_spring: node.f64_or("flap_spring", 0.0)?,
            flap_damper: node.f64_or("flap_damper", 0.0)?,
            lag_spring: node.f64_or("lag_spring", 0.0)?,
            lag_damper: node.f64_or("lag_damper", 0.0)?,
            stations: node.u64_or("stations", 10)? as usize,
        })
    }
}

/// Airflow and control environment a blade sees for one step.
#[derive(Debug, Clone, Copy)]
pub struct BladeEnvironment {
    /// Shaft speed (rad/s).
    pub rotor_speed: f64,
    /// Blade azimuth (rad), measured from aft over the tail boom.
    pub azimuth: f64,
    /// Collective pitch (rad).
    pub collective: f64,
    /// Cyclic pitch amplitudes (rad).
    pub cyclic_lon: f64,
    pub cyclic_lat: f64,
    /// Air density (kg/m^3).
    pub air_density: f64,
    /// Hub velocity in rotor axes, z down along the shaft (m/s).
    pub velocity_ras: Vector3<f64>,
}

/// Reaction of one blade at the hub, in rotor axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BladeReaction {
    /// Out-of-plane force along the shaft, positive up (N).
    pub thrust: f64,
    /// In-plane torque about the shaft opposing rotation (N·m).
    pub torque: f64,
}

/// One rotor blade with independent flap and lag degrees of freedom.
///
/// `update` integrates the section aerodynamics along the span, then
/// advances the blade's own second-order flap/lag equations of motion.
#[derive(Debug, Clone)]
pub struct Blade {
    config: BladeConfig,
    /// Moment of inertia about the flap hinge (kg·m^2).
    hinge_inertia: f64,
    /// Flap angle (rad), positive up, and rate (rad/s).
    pub flap: f64,
    pub flap_rate: f64,
    /// Lag angle (rad), positive opposing rotation, and rate (rad/s).
    pub lag: f64,
    pub lag_rate: f64,
    /// Feather (pitch) angle (rad) from collective and cyclic.
    pub feather: f64,
}

impl Blade {
    pub fn new(config: BladeConfig) -> Self {
        let span = config.radius - config.hinge_offset;
        // Uniform blade about the hinge
        let hinge_inertia = config.mass * span * span / 3.0;
        Self {
            config,
            hinge_inertia,
            flap: 0.0,
            flap_rate: 0.0,
            lag: 0.0,
            lag_rate: 0.0,
            feather: 0.0,
        }
    }

    pub fn config(&self) -> &BladeConfig {
        &self.config
    }

    /// Advances flap/lag state one step and returns the hub reaction.
    pub fn update(&mut self, env: &BladeEnvironment, dt: f64) -> BladeReaction {
        self.feather = env.collective
            + env.cyclic_lat * env.azimuth.cos()
            + env.cyclic_lon * env.azimuth.sin();

        let cfg = &self.config;
        let span = cfg.radius - cfg.hinge_offset;
        let dr = span / cfg.stations as f64;

        // Axial inflow, positive when it reduces section incidence (climb)
        let inflow = -env.velocity_ras.z;
        // In-plane hub velocity component along the blade's direction of
        // travel: the advancing side sees it added to the rotational speed
        let in_plane =
            env.velocity_ras.x * env.azimuth.sin() - env.velocity_ras.y * env.azimuth.cos();

        let mut thrust = 0.0;
        let mut torque = 0.0;
        let mut flap_moment = 0.0;
        let mut lag_moment = 0.0;

        for i in 0..cfg.stations {
            let r = cfg.hinge_offset + (i as f64 + 0.5) * dr;
            let u_t = env.rotor_speed * r + in_plane;
            let u_p = inflow + self.flap_rate * (r - cfg.hinge_offset);
            if u_t.abs() < 1e-9 {
                continue;
            }

            let phi = u_p.atan2(u_t);
            let aoa = self.feather - phi;
            let q_local = 0.5 * env.air_density * (u_t * u_t + u_p * u_p);
            let d_lift = q_local * cfg.chord * cfg.lift_slope * aoa * dr;
            let d_drag = q_local * cfg.chord * cfg.drag_coef * dr;

            thrust += d_lift * self.flap.cos();
            torque += (d_drag + d_lift * phi.sin()) * r;
            flap_moment += d_lift * (r - cfg.hinge_offset);
            lag_moment += (d_drag + d_lift * phi.sin()) * (r - cfg.hinge_offset);
        }

        // Flap: aerodynamic moment against hinge spring, damper and
        // centrifugal stiffening
        let omega_sq = env.rotor_speed * env.rotor_speed;
        let flap_accel = (flap_moment
            - cfg.flap_spring * self.flap
            - cfg.flap_damper * self.flap_rate)
            / self.hinge_inertia
            - omega_sq * self.flap;
        self.flap_rate += flap_accel * dt;
        self.flap += self.flap_rate * dt;

        // Lag: drag torque pushes the blade back against its own hinge
        let lag_accel = (lag_moment - cfg.lag_spring * self.lag - cfg.lag_damper * self.lag_rate)
            / self.hinge_inertia
            - omega_sq * self.lag;
        self.lag_rate += lag_accel * dt;
        self.lag += self.lag_rate * dt;

        BladeReaction { thrust, torque }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::utils::math::deg_to_rad;

    const BLADE_DOC: &str = r#"
mass: 35.0
radius: 5.0
hinge_offset: 0.25
chord: 0.3
lift_slope: 5.7
drag_coef: 0.012
flap_spring: 500.0
flap_damper: 800.0
lag_spring: 2000.0
lag_damper: 1500.0
stations: 12
"#;

    fn make_blade() -> Blade {
        let doc = ConfigDocument::from_str(BLADE_DOC).unwrap();
        Blade::new(BladeConfig::read_data(&doc.root()).unwrap())
    }

    fn hover_env(collective: f64) -> BladeEnvironment {
        BladeEnvironment {
            rotor_speed: 30.0,
            azimuth: 0.0,
            collective,
            cyclic_lon: 0.0,
            cyclic_lat: 0.0,
            air_density: 1.225,
            velocity_ras: Vector3::zeros(),
        }
    }

    #[test]
    fn test_zero_collective_zero_thrust() {
        let mut blade = make_blade();
        let reaction = blade.update(&hover_env(0.0), 0.001);

        assert!(reaction.thrust.abs() < 1e-6);
    }

    #[test]
    fn test_collective_produces_thrust_and_coning() {
        let mut blade = make_blade();
        let mut reaction = BladeReaction::default();

        for _ in 0..2000 {
            reaction = blade.update(&hover_env(deg_to_rad(8.0)), 0.001);
        }

        assert!(reaction.thrust > 0.0);
        assert!(reaction.torque > 0.0);
        // Blade cones up toward equilibrium
        assert!(blade.flap > 0.0);
        assert!(blade.flap < deg_to_rad(20.0));
        // Drag swings the blade back on its lag hinge
        assert!(blade.lag > 0.0);
    }

    #[test]
    fn test_climb_inflow_reduces_thrust() {
        let mut hover_blade = make_blade();
        let mut climb_blade = make_blade();

        let hover = hover_env(deg_to_rad(8.0));
        let mut climb = hover;
        climb.velocity_ras = Vector3::new(0.0, 0.0, -5.0);

        let mut hover_thrust = 0.0;
        let mut climb_thrust = 0.0;
        for _ in 0..2000 {
            hover_thrust = hover_blade.update(&hover, 0.001).thrust;
            climb_thrust = climb_blade.update(&climb, 0.001).thrust;
        }

        assert!(climb_thrust < hover_thrust);
    }

    #[test]
    fn test_cyclic_modulates_feather_with_azimuth() {
        let mut blade = make_blade();
        let mut env = hover_env(deg_to_rad(6.0));
        env.cyclic_lon = deg_to_rad(3.0);

        env.azimuth = 0.0;
        blade.update(&env, 0.001);
        let aft = blade.feather;

        env.azimuth = std::f64::consts::FRAC_PI_2;
        blade.update(&env, 0.001);
        let advancing = blade.feather;

        assert!((aft - deg_to_rad(6.0)).abs() < 1e-12);
        assert!((advancing - deg_to_rad(9.0)).abs() < 1e-12);
    }
}
