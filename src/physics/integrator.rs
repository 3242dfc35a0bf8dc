use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};

use crate::physics::SpatialState;
use crate::utils::constants::{MAX_ANGULAR_VELOCITY, MAX_VELOCITY};

/// Mass properties about the centre of gravity, re-derived by the mass
/// subsystem whenever a variable mass changes.
#[derive(Debug, Clone, Copy)]
pub struct MassProperties {
    /// Total mass (kg).
    pub mass: f64,
    /// Centre of gravity in the body frame (m).
    pub cg: Point3<f64>,
    /// Inertia tensor about the CG (kg·m^2).
    pub inertia: Matrix3<f64>,
    pub inertia_inv: Matrix3<f64>,
}

impl MassProperties {
    pub fn new(mass: f64, cg: Point3<f64>, inertia: Matrix3<f64>) -> Self {
        let inertia_inv = inertia
            .try_inverse()
            .unwrap_or_else(Matrix3::identity);
        Self {
            mass,
            cg,
            inertia,
            inertia_inv,
        }
    }
}

/// State derivatives at one RK stage.
struct StateDerivatives {
    position_dot: Vector3<f64>,
    velocity_dot: Vector3<f64>,
    angular_acceleration: Vector3<f64>,
}

/// Derivatives of the body-axis equations of motion.
///
/// The applied force and moment are frozen over the step (they were
/// computed from the pre-step state); only the kinematic coupling terms are
/// re-evaluated per stage.
fn calculate_derivatives(
    mass_props: &MassProperties,
    attitude: &UnitQuaternion<f64>,
    velocity: &Vector3<f64>,
    angular_velocity: &Vector3<f64>,
    force_body: &Vector3<f64>,
    moment_body: &Vector3<f64>,
) -> StateDerivatives {
    let position_dot = attitude * velocity;

    let omega = *angular_velocity;
    let velocity_dot = force_body / mass_props.mass - omega.cross(velocity);

    let gyro_term = omega.cross(&(mass_props.inertia * omega));
    let angular_acceleration = mass_props.inertia_inv * (moment_body - gyro_term);

    StateDerivatives {
        position_dot,
        velocity_dot,
        angular_acceleration,
    }
}

/// Advances the spatial state one step with an RK4 sweep over the frozen
/// force/moment sum, then renormalizes the attitude quaternion.
pub fn integrate_state(
    spatial: &mut SpatialState,
    mass_props: &MassProperties,
    force_body: Vector3<f64>,
    moment_body: Vector3<f64>,
    dt: f64,
) {
    if dt <= 0.0 {
        return;
    }

    let initial_position = spatial.position;
    let initial_velocity = spatial.velocity;
    let initial_attitude = spatial.attitude;
    let initial_angular_velocity = spatial.angular_velocity;

    let attitude_at = |omega: &Vector3<f64>, h: f64| -> UnitQuaternion<f64> {
        if omega.norm() > 0.0 {
            initial_attitude * UnitQuaternion::from_scaled_axis(omega * h)
        } else {
            initial_attitude
        }
    };

    let k1 = calculate_derivatives(
        mass_props,
        &initial_attitude,
        &initial_velocity,
        &initial_angular_velocity,
        &force_body,
        &moment_body,
    );

    let k2_velocity = initial_velocity + k1.velocity_dot * (dt / 2.0);
    let k2_angular_vel = initial_angular_velocity + k1.angular_acceleration * (dt / 2.0);
    let k2_attitude = attitude_at(&k2_angular_vel, dt / 2.0);
    let k2 = calculate_derivatives(
        mass_props,
        &k2_attitude,
        &k2_velocity,
        &k2_angular_vel,
        &force_body,
        &moment_body,
    );

    let k3_velocity = initial_velocity + k2.velocity_dot * (dt / 2.0);
    let k3_angular_vel = initial_angular_velocity + k2.angular_acceleration * (dt / 2.0);
    let k3_attitude = attitude_at(&k3_angular_vel, dt / 2.0);
    let k3 = calculate_derivatives(
        mass_props,
        &k3_attitude,
        &k3_velocity,
        &k3_angular_vel,
        &force_body,
        &moment_body,
    );

    let k4_velocity = initial_velocity + k3.velocity_dot * dt;
    let k4_angular_vel = initial_angular_velocity + k3.angular_acceleration * dt;
    let k4_attitude = attitude_at(&k4_angular_vel, dt);
    let k4 = calculate_derivatives(
        mass_props,
        &k4_attitude,
        &k4_velocity,
        &k4_angular_vel,
        &force_body,
        &moment_body,
    );

    spatial.position = initial_position
        + (dt / 6.0)
            * (k1.position_dot
                + 2.0 * k2.position_dot
                + 2.0 * k3.position_dot
                + k4.position_dot);
    spatial.velocity = initial_velocity
        + (dt / 6.0)
            * (k1.velocity_dot + 2.0 * k2.velocity_dot + 2.0 * k3.velocity_dot + k4.velocity_dot);
    spatial.angular_velocity = initial_angular_velocity
        + (dt / 6.0)
            * (k1.angular_acceleration
                + 2.0 * k2.angular_acceleration
                + 2.0 * k3.angular_acceleration
                + k4.angular_acceleration);

    // Advance attitude with the averaged body rate, then renormalize
    let omega_avg = (1.0 / 6.0)
        * (initial_angular_velocity + 2.0 * k2_angular_vel + 2.0 * k3_angular_vel + k4_angular_vel);
    if omega_avg.norm() > 0.0 {
        spatial.attitude = initial_attitude * UnitQuaternion::from_scaled_axis(omega_avg * dt);
    }
    spatial.attitude =
        UnitQuaternion::from_quaternion(spatial.attitude.into_inner().normalize());

    apply_velocity_limits(spatial);
}

/// Clamps velocity magnitudes after integration.
fn apply_velocity_limits(spatial: &mut SpatialState) {
    let velocity_norm = spatial.velocity.norm();
    if velocity_norm > MAX_VELOCITY {
        spatial.velocity *= MAX_VELOCITY / velocity_norm;
    }

    let angular_velocity_norm = spatial.angular_velocity.norm();
    if angular_velocity_norm > MAX_ANGULAR_VELOCITY {
        spatial.angular_velocity *= MAX_ANGULAR_VELOCITY / angular_velocity_norm;
    }
}
