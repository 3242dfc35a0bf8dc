use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid-body spatial state.
///
/// Position is NED (north, east, down) with the ground plane at `z = 0`;
/// linear and angular velocity are body-axis. Attitude rotates body vectors
/// into NED.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpatialState {
    /// NED position (m). Altitude above sea level is `-position.z`.
    pub position: Vector3<f64>,
    /// Body-to-NED rotation.
    pub attitude: UnitQuaternion<f64>,
    /// Body-axis linear velocity `[u, v, w]` (m/s).
    pub velocity: Vector3<f64>,
    /// Body-axis angular velocity `[p, q, r]` (rad/s).
    pub angular_velocity: Vector3<f64>,
}

impl Default for SpatialState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl SpatialState {
    pub fn at_altitude(altitude_asl: f64) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, -altitude_asl),
            ..Default::default()
        }
    }

    pub fn altitude_asl(&self) -> f64 {
        -self.position.z
    }

    /// NED velocity derived from the body-axis velocity.
    pub fn velocity_ned(&self) -> Vector3<f64> {
        self.attitude * self.velocity
    }

    /// Positive climb rate (m/s).
    pub fn climb_rate(&self) -> f64 {
        -self.velocity_ned().z
    }

    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.attitude.euler_angles()
    }
}

/// Ordered, fixed-length view of the integrable degrees of freedom.
///
/// Layout: `[x, y, z, qw, qx, qy, qz, u, v, w, p, q, r]`. Owned by the
/// aircraft aggregate; only the integration step writes it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector(pub [f64; 13]);

impl StateVector {
    pub const LEN: usize = 13;

    pub fn pack(spatial: &SpatialState) -> Self {
        let q = spatial.attitude.as_ref();
        Self([
            spatial.position.x,
            spatial.position.y,
            spatial.position.z,
            q.w,
            q.i,
            q.j,
            q.k,
            spatial.velocity.x,
            spatial.velocity.y,
            spatial.velocity.z,
            spatial.angular_velocity.x,
            spatial.angular_velocity.y,
            spatial.angular_velocity.z,
        ])
    }

    pub fn unpack(&self) -> SpatialState {
        let v = &self.0;
        SpatialState {
            position: Vector3::new(v[0], v[1], v[2]),
            attitude: UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
                v[3], v[4], v[5], v[6],
            )),
            velocity: Vector3::new(v[7], v[8], v[9]),
            angular_velocity: Vector3::new(v[10], v[11], v[12]),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
