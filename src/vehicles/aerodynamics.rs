use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{ConfigError, ConfigNode};
use crate::physics::{Force, ForceCategory, Moment, SpatialState};
use crate::utils::math::Table1;
use crate::vehicles::module::{Module, StepContext};

const MIN_AIRSPEED_THRESHOLD: f64 = 1e-6;

/// Air data derived from the body-relative airflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct AirData {
    /// True airspeed (m/s).
    pub true_airspeed: f64,
    /// Angle of attack (rad).
    pub alpha: f64,
    /// Sideslip angle (rad).
    pub beta: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    /// Dynamic pressure (Pa).
    pub dynamic_pressure: f64,
    /// Airflow-relative velocity in the body frame (m/s).
    pub relative_velocity: Vector3<f64>,
}

impl AirData {
    /// Computes air data from the body-axis velocity and the NED wind.
    pub fn calculate(spatial: &SpatialState, wind_ned: Vector3<f64>, density: f64) -> Self {
        let wind_body = spatial.attitude.inverse() * wind_ned;
        let relative_velocity = spatial.velocity - wind_body;
        let airspeed = relative_velocity.norm();

        let alpha = if airspeed > MIN_AIRSPEED_THRESHOLD {
            relative_velocity.z.atan2(relative_velocity.x)
        } else {
            0.0
        };
        let beta = if airspeed > MIN_AIRSPEED_THRESHOLD {
            (relative_velocity.y / airspeed).asin()
        } else {
            0.0
        };

        Self {
            true_airspeed: airspeed,
            alpha,
            beta,
            density,
            dynamic_pressure: 0.5 * density * airspeed * airspeed,
            relative_velocity,
        }
    }
}

/// Reference geometry for coefficient non-dimensionalization.
#[derive(Debug, Clone, Copy, Default)]
struct Geometry {
    wing_area: f64,
    wing_span: f64,
    mac: f64,
}

/// Longitudinal coefficients: table-driven statics plus rate and control
/// derivatives.
#[derive(Debug, Clone)]
struct LongitudinalCoefficients {
    /// CL vs alpha.
    lift_curve: Table1,
    /// CD vs alpha.
    drag_polar: Table1,
    /// Cm vs alpha.
    pitch_curve: Table1,
    c_l_q: f64,
    c_l_deltae: f64,
    c_d_beta: f64,
    c_m_q: f64,
    c_m_deltae: f64,
}

/// Lateral-directional stability and control derivatives.
#[derive(Debug, Clone, Copy, Default)]
struct LateralCoefficients {
    c_y_beta: f64,
    c_y_r: f64,
    c_y_deltar: f64,
    c_l_beta: f64,
    c_l_p: f64,
    c_l_r: f64,
    c_l_deltaa: f64,
    c_l_deltar: f64,
    c_n_beta: f64,
    c_n_p: f64,
    c_n_r: f64,
    c_n_deltaa: f64,
    c_n_deltar: f64,
}

/// Flap increments, per radian of flap deflection.
#[derive(Debug, Clone, Copy, Default)]
struct FlapCoefficients {
    lift: f64,
    drag: f64,
    pitch: f64,
}

/// Stability-derivative aerodynamics model.
///
/// Static coefficients come from configuration tables; dynamic and control
/// derivatives are scalar parameters.
#[derive(Debug, Clone)]
pub struct Aerodynamics {
    geometry: Geometry,
    longitudinal: LongitudinalCoefficients,
    lateral: LateralCoefficients,
    flaps: FlapCoefficients,
}

impl Aerodynamics {
    pub fn new() -> Self {
        Self {
            geometry: Geometry::default(),
            longitudinal: LongitudinalCoefficients {
                lift_curve: Table1::constant(0.0),
                drag_polar: Table1::constant(0.0),
                pitch_curve: Table1::constant(0.0),
                c_l_q: 0.0,
                c_l_deltae: 0.0,
                c_d_beta: 0.0,
                c_m_q: 0.0,
                c_m_deltae: 0.0,
            },
            lateral: LateralCoefficients::default(),
            flaps: FlapCoefficients::default(),
        }
    }

    /// Body-frame forces and moments for the current airflow.
    fn calculate_forces_moments(
        &self,
        air_data: &AirData,
        angular_velocity: &Vector3<f64>,
        elevator: f64,
        aileron: f64,
        rudder: f64,
        flaps: f64,
    ) -> (Vector3<f64>, Vector3<f64>) {
        if air_data.dynamic_pressure <= 1e-6 || air_data.true_airspeed <= 0.1 {
            return (Vector3::zeros(), Vector3::zeros());
        }

        let alpha = air_data.alpha.clamp(-10.0 * PI / 180.0, 40.0 * PI / 180.0);
        let beta = air_data.beta.clamp(-20.0 * PI / 180.0, 20.0 * PI / 180.0);
        let p = angular_velocity.x.clamp(-100.0 * PI / 180.0, 100.0 * PI / 180.0);
        let q = angular_velocity.y.clamp(-50.0 * PI / 180.0, 50.0 * PI / 180.0);
        let r = angular_velocity.z.clamp(-50.0 * PI / 180.0, 50.0 * PI / 180.0);

        let airspeed = air_data.true_airspeed;
        let span = self.geometry.wing_span;
        let mac = self.geometry.mac;
        let v_denom = 2.0 * airspeed + 1e-9;
        let p_hat = (span / v_denom) * p;
        let q_hat = (mac / v_denom) * q;
        let r_hat = (span / v_denom) * r;

        let lon = &self.longitudinal;
        let lat = &self.lateral;

        let c_l = lon.lift_curve.get(alpha)
            + lon.c_l_q * q_hat
            + lon.c_l_deltae * elevator
            + self.flaps.lift * flaps;

        let c_d = lon.drag_polar.get(alpha) + lon.c_d_beta * beta.abs() + self.flaps.drag * flaps;

        let c_y = lat.c_y_beta * beta + lat.c_y_r * r_hat + lat.c_y_deltar * rudder;

        let c_l_roll = lat.c_l_beta * beta
            + lat.c_l_p * p_hat
            + lat.c_l_r * r_hat
            + lat.c_l_deltaa * aileron
            + lat.c_l_deltar * rudder;

        let c_m = lon.pitch_curve.get(alpha)
            + lon.c_m_q * q_hat
            + lon.c_m_deltae * elevator
            + self.flaps.pitch * flaps;

        let c_n = lat.c_n_beta * beta
            + lat.c_n_p * p_hat
            + lat.c_n_r * r_hat
            + lat.c_n_deltaa * aileron
            + lat.c_n_deltar * rudder;

        let q_dyn = air_data.dynamic_pressure;
        let area = self.geometry.wing_area;

        // Standard aero axes: drag opposes +x, lift opposes +z
        let forces_body = Vector3::new(-q_dyn * area * c_d, q_dyn * area * c_y, -q_dyn * area * c_l);
        let moments_body = Vector3::new(
            q_dyn * area * span * c_l_roll,
            q_dyn * area * mac * c_m,
            q_dyn * area * span * c_n,
        );

        (forces_body, moments_body)
    }
}

impl Default for Aerodynamics {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Aerodynamics {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError> {
        let geometry = node.child("geometry")?;
        self.geometry = Geometry {
            wing_area: geometry.f64("wing_area")?,
            wing_span: geometry.f64("wing_span")?,
            mac: geometry.f64("mac")?,
        };

        let lift = node.child("lift")?;
        let drag = node.child("drag")?;
        let pitch = node.child("pitch")?;
        self.longitudinal = LongitudinalCoefficients {
            lift_curve: lift.table1("curve")?,
            drag_polar: drag.table1("polar")?,
            pitch_curve: pitch.table1("curve")?,
            c_l_q: lift.f64_or("q", 0.0)?,
            c_l_deltae: lift.f64_or("deltae", 0.0)?,
            c_d_beta: drag.f64_or("beta", 0.0)?,
            c_m_q: pitch.f64_or("q", 0.0)?,
            c_m_deltae: pitch.f64_or("deltae", 0.0)?,
        };

        let side = node.child("side_force")?;
        let roll = node.child("roll")?;
        let yaw = node.child("yaw")?;
        self.lateral = LateralCoefficients {
            c_y_beta: side.f64_or("beta", 0.0)?,
            c_y_r: side.f64_or("r", 0.0)?,
            c_y_deltar: side.f64_or("deltar", 0.0)?,
            c_l_beta: roll.f64_or("beta", 0.0)?,
            c_l_p: roll.f64_or("p", 0.0)?,
            c_l_r: roll.f64_or("r", 0.0)?,
            c_l_deltaa: roll.f64_or("deltaa", 0.0)?,
            c_l_deltar: roll.f64_or("deltar", 0.0)?,
            c_n_beta: yaw.f64_or("beta", 0.0)?,
            c_n_p: yaw.f64_or("p", 0.0)?,
            c_n_r: yaw.f64_or("r", 0.0)?,
            c_n_deltaa: yaw.f64_or("deltaa", 0.0)?,
            c_n_deltar: yaw.f64_or("deltar", 0.0)?,
        };

        if let Some(flaps) = node.try_child("flaps") {
            self.flaps = FlapCoefficients {
                lift: flaps.f64_or("lift", 0.0)?,
                drag: flaps.f64_or("drag", 0.0)?,
                pitch: flaps.f64_or("pitch", 0.0)?,
            };
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext) {
        let (forces_body, moments_body) = self.calculate_forces_moments(
            &ctx.air_data,
            &ctx.spatial.angular_velocity,
            ctx.deflections.elevator,
            ctx.deflections.aileron,
            ctx.deflections.rudder,
            ctx.deflections.flaps,
        );

        if forces_body.norm_squared() > 1e-9 {
            ctx.forces
                .add_force(Force::body(forces_body, ForceCategory::Aerodynamic));
        }
        if moments_body.norm_squared() > 1e-9 {
            ctx.forces
                .add_moment(Moment::body(moments_body, ForceCategory::Aerodynamic));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::fdm::DataInp;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    const AERO_DOC: &str = r#"
geometry: { wing_area: 16.0, wing_span: 11.0, mac: 1.5 }
lift:
  curve: { breakpoints: [-0.3, 0.0, 0.3], values: [-1.2, 0.3, 1.8] }
  q: 3.9
  deltae: 0.43
drag:
  polar: { breakpoints: [-0.3, 0.0, 0.3], values: [0.08, 0.03, 0.12] }
  beta: 0.17
side_force: { beta: -0.31, r: 0.21, deltar: 0.096 }
roll: { beta: -0.089, p: -0.47, r: 0.096, deltaa: 0.178 }
pitch:
  curve: { breakpoints: [-0.3, 0.0, 0.3], values: [0.4, 0.04, -0.5] }
  q: -12.4
  deltae: -1.28
yaw: { beta: 0.065, p: -0.03, r: -0.099, deltar: -0.043 }
"#;

    fn make_aero() -> Aerodynamics {
        let doc = ConfigDocument::from_str(AERO_DOC).unwrap();
        let mut aero = Aerodynamics::new();
        aero.read_data(&doc.root()).unwrap();
        aero
    }

    #[test]
    fn test_stationary_air_data() {
        let spatial = SpatialState::default();
        let air = AirData::calculate(&spatial, Vector3::zeros(), 1.225);

        assert!(air.true_airspeed < MIN_AIRSPEED_THRESHOLD);
        assert_relative_eq!(air.alpha, 0.0);
        assert_relative_eq!(air.beta, 0.0);
        assert_relative_eq!(air.dynamic_pressure, 0.0);
    }

    #[test]
    fn test_alpha_from_climb_and_descent() {
        let mut spatial = SpatialState::default();
        let cases = [
            (50.0, 0.0, 0.0),
            (50.0, 8.816, 10.0 * PI / 180.0),
            (50.0, -8.816, -10.0 * PI / 180.0),
        ];

        for (vx, vz, expected_alpha) in cases {
            spatial.velocity = Vector3::new(vx, 0.0, vz);
            let air = AirData::calculate(&spatial, Vector3::zeros(), 1.225);
            assert_relative_eq!(air.alpha, expected_alpha, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_wind_changes_relative_velocity() {
        let mut spatial = SpatialState::default();
        spatial.velocity = Vector3::new(50.0, 0.0, 0.0);
        spatial.attitude = UnitQuaternion::identity();

        // 10 m/s headwind from the north while flying north
        let air = AirData::calculate(&spatial, Vector3::new(-10.0, 0.0, 0.0), 1.225);
        assert_relative_eq!(air.true_airspeed, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lift_and_drag_directions() {
        let aero = make_aero();
        let mut spatial = SpatialState::default();
        spatial.velocity = Vector3::new(50.0, 0.0, 0.0);
        let air = AirData::calculate(&spatial, Vector3::zeros(), 1.225);

        let (forces, _) =
            aero.calculate_forces_moments(&air, &Vector3::zeros(), 0.0, 0.0, 0.0, 0.0);

        // Positive CL at zero alpha: lift up (body -z), drag aft (body -x)
        assert!(forces.z < 0.0);
        assert!(forces.x < 0.0);
    }

    #[test]
    fn test_no_forces_in_still_air() {
        let aero = make_aero();
        let air = AirData::calculate(&SpatialState::default(), Vector3::zeros(), 1.225);

        let (forces, moments) =
            aero.calculate_forces_moments(&air, &Vector3::zeros(), 0.0, 0.0, 0.0, 0.0);

        assert_eq!(forces, Vector3::zeros());
        assert_eq!(moments, Vector3::zeros());
    }

    #[test]
    fn test_elevator_produces_pitch_moment() {
        let aero = make_aero();
        let mut spatial = SpatialState::default();
        spatial.velocity = Vector3::new(50.0, 0.0, 0.0);
        let air = AirData::calculate(&spatial, Vector3::zeros(), 1.225);

        let (_, neutral) =
            aero.calculate_forces_moments(&air, &Vector3::zeros(), 0.0, 0.0, 0.0, 0.0);
        let (_, deflected) =
            aero.calculate_forces_moments(&air, &Vector3::zeros(), 0.1, 0.0, 0.0, 0.0);

        // Negative c_m_deltae: trailing-edge-down elevator pitches nose down
        assert!(deflected.y < neutral.y);
    }

    #[test]
    fn test_module_adds_forces_to_context() {
        let mut aero = make_aero();
        let input = DataInp::default();
        let mut spatial = SpatialState::default();
        spatial.velocity = Vector3::new(50.0, 0.0, 0.0);

        let mut ctx = StepContext::new(0.01, &input, spatial);
        ctx.air_data = AirData::calculate(&spatial, Vector3::zeros(), 1.225);
        aero.update(&mut ctx);

        let aero_force = ctx.forces.force_by_category(ForceCategory::Aerodynamic);
        assert!(aero_force.norm() > 0.0);
    }
}
