use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

use crate::config::ConfigError;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(start: f64, end: f64, factor: f64) -> f64 {
    start + (end - start) * factor.clamp(0.0, 1.0)
}

/// Calculate the flight path angle from an NED velocity vector
pub fn flight_path_angle(velocity: &Vector3<f64>) -> f64 {
    -velocity
        .z
        .atan2((velocity.x.powi(2) + velocity.y.powi(2)).sqrt())
}

/// Calculate heading from an NED velocity vector
pub fn heading_from_velocity(velocity: &Vector3<f64>) -> f64 {
    velocity.y.atan2(velocity.x)
}

/// Convert a quaternion to Euler angles (roll, pitch, yaw)
pub fn quaternion_to_euler(quat: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = quat.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// One-dimensional lookup table with linear interpolation.
///
/// Breakpoints are strictly increasing by construction. Queries beyond
/// either end of the domain return the nearest edge value.
#[derive(Debug, Clone, PartialEq)]
pub struct Table1 {
    breakpoints: Vec<f64>,
    values: Vec<f64>,
}

impl Table1 {
    pub fn new(breakpoints: Vec<f64>, values: Vec<f64>) -> Result<Self, ConfigError> {
        if breakpoints.is_empty() {
            return Err(ConfigError::Validation(
                "table requires at least one breakpoint".into(),
            ));
        }
        if breakpoints.len() != values.len() {
            return Err(ConfigError::Validation(format!(
                "table has {} breakpoints but {} values",
                breakpoints.len(),
                values.len()
            )));
        }
        if breakpoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::Validation(
                "table breakpoints must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            breakpoints,
            values,
        })
    }

    /// Table with a single constant value over the whole domain.
    pub fn constant(value: f64) -> Self {
        Self {
            breakpoints: vec![0.0],
            values: vec![value],
        }
    }

    /// Interpolated value at `x`, clamped to the edge values outside the domain.
    pub fn get(&self, x: f64) -> f64 {
        let n = self.breakpoints.len();
        if x <= self.breakpoints[0] {
            return self.values[0];
        }
        if x >= self.breakpoints[n - 1] {
            return self.values[n - 1];
        }
        // x is strictly inside the domain here, so i in [1, n-1]
        let i = self.breakpoints.partition_point(|&b| b <= x);
        let x0 = self.breakpoints[i - 1];
        let x1 = self.breakpoints[i];
        let t = (x - x0) / (x1 - x0);
        lerp(self.values[i - 1], self.values[i], t)
    }

    pub fn domain(&self) -> (f64, f64) {
        (
            self.breakpoints[0],
            self.breakpoints[self.breakpoints.len() - 1],
        )
    }
}

/// Two-dimensional lookup table with bilinear interpolation and the same
/// clamped-edge behaviour as [`Table1`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table2 {
    rows: Vec<f64>,
    cols: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl Table2 {
    pub fn new(rows: Vec<f64>, cols: Vec<f64>, values: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        if rows.is_empty() || cols.is_empty() {
            return Err(ConfigError::Validation(
                "table requires at least one row and one column".into(),
            ));
        }
        if rows.windows(2).any(|w| w[1] <= w[0]) || cols.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::Validation(
                "table breakpoints must be strictly increasing".into(),
            ));
        }
        if values.len() != rows.len() || values.iter().any(|r| r.len() != cols.len()) {
            return Err(ConfigError::Validation(format!(
                "table values must form a {}x{} grid",
                rows.len(),
                cols.len()
            )));
        }
        Ok(Self { rows, cols, values })
    }

    pub fn get(&self, row: f64, col: f64) -> f64 {
        let (i, ti) = Self::locate(&self.rows, row);
        let (j, tj) = Self::locate(&self.cols, col);
        let v00 = self.values[i][j];
        let v01 = self.values[i][(j + 1).min(self.cols.len() - 1)];
        let v10 = self.values[(i + 1).min(self.rows.len() - 1)][j];
        let v11 = self.values[(i + 1).min(self.rows.len() - 1)][(j + 1).min(self.cols.len() - 1)];
        lerp(lerp(v00, v01, tj), lerp(v10, v11, tj), ti)
    }

    /// Lower bracket index and interpolation factor, clamped to the domain.
    fn locate(breakpoints: &[f64], x: f64) -> (usize, f64) {
        let n = breakpoints.len();
        if n == 1 || x <= breakpoints[0] {
            return (0, 0.0);
        }
        if x >= breakpoints[n - 1] {
            return (n - 1, 0.0);
        }
        let i = breakpoints.partition_point(|&b| b <= x) - 1;
        let t = (x - breakpoints[i]) / (breakpoints[i + 1] - breakpoints[i]);
        (i, t)
    }
}
