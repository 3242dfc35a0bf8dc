use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Reference frames used by the rotor model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// North-East-Down, earth-fixed.
    Ned,
    /// East-North-Up, earth-fixed.
    Enu,
    /// Body axes: x forward, y right, z down.
    Bas,
    /// Rotor axes: z down along the shaft, rotating with azimuth.
    Ras,
}

/// Orthogonal rotation-matrix registry for one aircraft attitude and rotor
/// shaft position.
///
/// Every transform's inverse is its transpose; `transform(a, b)` and
/// `transform(b, a)` are exact transposes of one another.
#[derive(Debug, Clone)]
pub struct FrameSet {
    bas_to_ned: Matrix3<f64>,
    ras_to_bas: Matrix3<f64>,
}

/// NED and ENU swap north/east and negate down; the matrix is its own
/// inverse.
fn ned_to_enu() -> Matrix3<f64> {
    Matrix3::new(0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0)
}

fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

impl FrameSet {
    /// `shaft_tilt` pitches the shaft about body y (positive forward);
    /// `azimuth` rotates the blade frame about the shaft.
    pub fn new(attitude: &UnitQuaternion<f64>, shaft_tilt: f64, azimuth: f64) -> Self {
        let bas_to_ned = *attitude.to_rotation_matrix().matrix();
        // Coordinates transform BAS -> RAS by tilting onto the shaft, then
        // rotating with the blade; RAS -> BAS is the transpose.
        let bas_to_ras = rotation_z(azimuth) * rotation_y(shaft_tilt);
        Self {
            bas_to_ned,
            ras_to_bas: bas_to_ras.transpose(),
        }
    }

    fn to_ned(&self, frame: Frame) -> Matrix3<f64> {
        match frame {
            Frame::Ned => Matrix3::identity(),
            Frame::Enu => ned_to_enu(),
            Frame::Bas => self.bas_to_ned,
            Frame::Ras => self.bas_to_ned * self.ras_to_bas,
        }
    }

    /// Rotation taking coordinates in `from` to coordinates in `to`.
    pub fn transform(&self, from: Frame, to: Frame) -> Matrix3<f64> {
        self.to_ned(to).transpose() * self.to_ned(from)
    }

    pub fn rotate(&self, vector: &Vector3<f64>, from: Frame, to: Frame) -> Vector3<f64> {
        self.transform(from, to) * vector
    }
}
