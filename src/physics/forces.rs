use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Source category of a force or moment contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceCategory {
    Aerodynamic,
    Propulsive,
    Gravitational,
    Ground,
}

/// Reference frame a contribution is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// NED, earth-fixed.
    Inertial,
    /// Body-fixed.
    Body,
}

/// A force vector with optional application point.
#[derive(Debug, Clone, Copy)]
pub struct Force {
    /// Force vector (N).
    pub vector: Vector3<f64>,
    /// Application point in body frame; `None` applies at the CG.
    pub point: Option<Point3<f64>>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

impl Force {
    pub fn body(vector: Vector3<f64>, category: ForceCategory) -> Self {
        Self {
            vector,
            point: None,
            frame: ReferenceFrame::Body,
            category,
        }
    }

    pub fn body_at(vector: Vector3<f64>, point: Point3<f64>, category: ForceCategory) -> Self {
        Self {
            vector,
            point: Some(point),
            frame: ReferenceFrame::Body,
            category,
        }
    }

    pub fn inertial_at(vector: Vector3<f64>, point: Point3<f64>, category: ForceCategory) -> Self {
        Self {
            vector,
            point: Some(point),
            frame: ReferenceFrame::Inertial,
            category,
        }
    }

    pub fn inertial(vector: Vector3<f64>, category: ForceCategory) -> Self {
        Self {
            vector,
            point: None,
            frame: ReferenceFrame::Inertial,
            category,
        }
    }
}

/// A moment/torque vector (N·m).
#[derive(Debug, Clone, Copy)]
pub struct Moment {
    pub vector: Vector3<f64>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

impl Moment {
    pub fn body(vector: Vector3<f64>, category: ForceCategory) -> Self {
        Self {
            vector,
            frame: ReferenceFrame::Body,
            category,
        }
    }
}

/// Per-step force and moment summation.
///
/// Rebuilt from scratch every step; no contribution survives into the next
/// one. Moments are taken about the CG passed to [`net_moment_body`], which
/// the mass subsystem derives after force-producing subsystems have already
/// registered their contributions.
///
/// [`net_moment_body`]: ForceAccumulator::net_moment_body
#[derive(Debug, Clone)]
pub struct ForceAccumulator {
    attitude: UnitQuaternion<f64>,
    forces: Vec<Force>,
    moments: Vec<Moment>,
}

impl ForceAccumulator {
    pub fn new() -> Self {
        Self {
            attitude: UnitQuaternion::identity(),
            forces: Vec::new(),
            moments: Vec::new(),
        }
    }

    /// Clears the previous step's contributions and fixes the attitude used
    /// for frame transforms this step.
    pub fn begin_step(&mut self, attitude: UnitQuaternion<f64>) {
        self.attitude = attitude;
        self.forces.clear();
        self.moments.clear();
    }

    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    pub fn add_moment(&mut self, moment: Moment) {
        self.moments.push(moment);
    }

    fn force_in_body(&self, force: &Force) -> Vector3<f64> {
        match force.frame {
            ReferenceFrame::Body => force.vector,
            ReferenceFrame::Inertial => self.attitude.inverse() * force.vector,
        }
    }

    /// Net force in the body frame.
    pub fn net_force_body(&self) -> Vector3<f64> {
        self.forces.iter().map(|f| self.force_in_body(f)).sum()
    }

    /// Net moment about `cg` in the body frame, including the moments of
    /// forces applied away from the CG.
    pub fn net_moment_body(&self, cg: &Point3<f64>) -> Vector3<f64> {
        let force_moments: Vector3<f64> = self
            .forces
            .iter()
            .filter_map(|force| {
                force.point.map(|point| {
                    let arm = point - cg;
                    arm.cross(&self.force_in_body(force))
                })
            })
            .sum();

        let direct_moments: Vector3<f64> = self
            .moments
            .iter()
            .map(|moment| match moment.frame {
                ReferenceFrame::Body => moment.vector,
                ReferenceFrame::Inertial => self.attitude.inverse() * moment.vector,
            })
            .sum();

        force_moments + direct_moments
    }

    /// Net body-frame force restricted to one category.
    pub fn force_by_category(&self, category: ForceCategory) -> Vector3<f64> {
        self.forces
            .iter()
            .filter(|f| f.category == category)
            .map(|f| self.force_in_body(f))
            .sum()
    }
}

impl Default for ForceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_net_force_body_frame() {
        let mut accumulator = ForceAccumulator::new();
        accumulator.begin_step(UnitQuaternion::identity());
        accumulator.add_force(Force::body(
            Vector3::new(1.0, 0.0, 0.0),
            ForceCategory::Propulsive,
        ));

        assert_relative_eq!(accumulator.net_force_body(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_inertial_force_rotated_into_body() {
        let mut accumulator = ForceAccumulator::new();
        // Nose pointing straight up: NED down pulls along body -x
        accumulator.begin_step(UnitQuaternion::from_euler_angles(0.0, PI / 2.0, 0.0));
        accumulator.add_force(Force::inertial(
            Vector3::new(0.0, 0.0, 1.0),
            ForceCategory::Gravitational,
        ));

        let net = accumulator.net_force_body();
        assert_relative_eq!(net.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(net.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_moment_from_offset_force() {
        let mut accumulator = ForceAccumulator::new();
        accumulator.begin_step(UnitQuaternion::identity());
        accumulator.add_force(Force::body_at(
            Vector3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            ForceCategory::Ground,
        ));
        accumulator.add_moment(Moment::body(
            Vector3::new(0.0, 0.0, 1.0),
            ForceCategory::Aerodynamic,
        ));

        // r x F = (0,1,0) x (1,0,0) = (0,0,-1), plus the direct unit moment
        assert_relative_eq!(
            accumulator.net_moment_body(&Point3::origin()),
            Vector3::new(0.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_moment_about_shifted_cg() {
        let mut accumulator = ForceAccumulator::new();
        accumulator.begin_step(UnitQuaternion::identity());
        accumulator.add_force(Force::body_at(
            Vector3::new(0.0, 0.0, -1.0),
            Point3::new(2.0, 0.0, 0.0),
            ForceCategory::Ground,
        ));

        // Arm is (1,0,0) after the CG shift: (1,0,0) x (0,0,-1) = (0,1,0)
        assert_relative_eq!(
            accumulator.net_moment_body(&Point3::new(1.0, 0.0, 0.0)),
            Vector3::new(0.0, 1.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_category_filter() {
        let mut accumulator = ForceAccumulator::new();
        accumulator.begin_step(UnitQuaternion::identity());
        accumulator.add_force(Force::body(
            Vector3::new(1.0, 0.0, 0.0),
            ForceCategory::Aerodynamic,
        ));
        accumulator.add_force(Force::body(
            Vector3::new(2.0, 0.0, 0.0),
            ForceCategory::Propulsive,
        ));

        assert_relative_eq!(
            accumulator.force_by_category(ForceCategory::Propulsive).x,
            2.0
        );
        assert_relative_eq!(
            accumulator.force_by_category(ForceCategory::Aerodynamic).x,
            1.0
        );
    }
}
