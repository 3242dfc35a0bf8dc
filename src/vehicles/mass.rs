use nalgebra::{Matrix3, Point3, Vector3};

use crate::config::{ConfigError, ConfigNode};
use crate::fdm::MassInputs;
use crate::physics::MassProperties;
use crate::utils::SimError;
use crate::vehicles::module::{Module, StepContext};

/// Runtime input slot a variable mass draws its magnitude from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MassChannel {
    Pilot,
    Copilot,
    Fuel,
    Cargo,
}

impl MassChannel {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "pilot" => Some(Self::Pilot),
            "copilot" => Some(Self::Copilot),
            "fuel" => Some(Self::Fuel),
            "cargo" => Some(Self::Cargo),
            _ => None,
        }
    }

    fn value(&self, inputs: &MassInputs) -> f64 {
        match self {
            Self::Pilot => inputs.pilot,
            Self::Copilot => inputs.copilot,
            Self::Fuel => inputs.fuel,
            Self::Cargo => inputs.cargo,
        }
    }
}

/// One point mass. Fixed points carry their mass from configuration;
/// variable points are bound to a runtime channel during initialization.
#[derive(Debug, Clone)]
struct PointMass {
    name: String,
    position: Point3<f64>,
    /// Fixed magnitude (kg); zero until resolved for variable masses.
    mass: f64,
    variable: bool,
    channel: Option<MassChannel>,
}

/// Mass/inertia subsystem.
///
/// Accumulates the empty airframe and all point masses into total mass,
/// centre of gravity and the inertia tensor about the CG, re-deriving the
/// result whenever a variable mass changes.
#[derive(Debug, Clone)]
pub struct Mass {
    empty_mass: f64,
    empty_cg: Point3<f64>,
    /// Empty-airframe inertia about its own CG.
    empty_inertia: Matrix3<f64>,
    points: Vec<PointMass>,
    properties: MassProperties,
}

impl Mass {
    pub fn new() -> Self {
        Self {
            empty_mass: 0.0,
            empty_cg: Point3::origin(),
            empty_inertia: Matrix3::zeros(),
            points: Vec::new(),
            properties: MassProperties::new(1.0, Point3::origin(), Matrix3::identity()),
        }
    }

    pub fn properties(&self) -> &MassProperties {
        &self.properties
    }

    /// Parallel-axis accumulation of the empty airframe and every point
    /// mass about the combined CG.
    fn derive_properties(&self, inputs: &MassInputs) -> MassProperties {
        let mut total_mass = self.empty_mass;
        let mut moment = self.empty_mass * self.empty_cg.coords;

        let resolved: Vec<(f64, Point3<f64>)> = self
            .points
            .iter()
            .map(|point| {
                let mass = match point.channel {
                    Some(channel) => channel.value(inputs).max(0.0),
                    None => point.mass,
                };
                (mass, point.position)
            })
            .collect();

        for &(mass, position) in &resolved {
            total_mass += mass;
            moment += mass * position.coords;
        }

        let cg = Point3::from(moment / total_mass);

        let mut inertia = self.empty_inertia + parallel_axis(self.empty_mass, self.empty_cg - cg);
        for &(mass, position) in &resolved {
            inertia += parallel_axis(mass, position - cg);
        }

        MassProperties::new(total_mass, cg, inertia)
    }
}

/// Point-mass inertia contribution about an axis offset by `d`.
fn parallel_axis(mass: f64, d: Vector3<f64>) -> Matrix3<f64> {
    mass * (Matrix3::identity() * d.norm_squared() - d * d.transpose())
}

impl Default for Mass {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Mass {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError> {
        let empty = node.child("empty")?;
        self.empty_mass = empty.f64("mass")?;
        self.empty_cg = empty.vector3("cg")?.into();

        let inertia = empty.child("inertia")?;
        let ixx = inertia.f64("ixx")?;
        let iyy = inertia.f64("iyy")?;
        let izz = inertia.f64("izz")?;
        let ixz = inertia.f64_or("ixz", 0.0)?;
        self.empty_inertia = Matrix3::new(ixx, 0.0, -ixz, 0.0, iyy, 0.0, -ixz, 0.0, izz);

        self.points = node
            .children("points")?
            .iter()
            .map(|point| {
                let variable = point.bool_or("variable", false)?;
                Ok(PointMass {
                    name: point.string("name")?,
                    position: point.vector3("position")?.into(),
                    mass: if variable { 0.0 } else { point.f64("mass")? },
                    variable,
                    channel: None,
                })
            })
            .collect::<Result<_, ConfigError>>()?;
        Ok(())
    }

    /// Binds every variable mass to its runtime channel. A declared
    /// variable mass with no matching channel is a configuration error and
    /// fails initialization permanently.
    fn initialize(&mut self) -> Result<(), SimError> {
        for point in &mut self.points {
            if point.variable {
                point.channel = Some(MassChannel::resolve(&point.name).ok_or_else(|| {
                    SimError::Config(ConfigError::Validation(format!(
                        "variable mass '{}' has no runtime input channel",
                        point.name
                    )))
                })?);
            }
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext) {
        self.properties = self.derive_properties(&ctx.input.masses);
        ctx.mass_props = self.properties;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::fdm::DataInp;
    use crate::physics::SpatialState;
    use approx::assert_relative_eq;

    const MASS_DOC: &str = r#"
empty:
  mass: 1000.0
  cg: [0.0, 0.0, 0.0]
  inertia: { ixx: 1300.0, iyy: 1800.0, izz: 2600.0, ixz: 40.0 }
points:
  - { name: pilot, position: [1.0, 0.0, 0.0], variable: true }
  - { name: fuel, position: [0.0, 0.0, 0.5], variable: true }
  - { name: battery, position: [2.0, 0.0, 0.0], mass: 20.0 }
"#;

    fn make_mass() -> Mass {
        let doc = ConfigDocument::from_str(MASS_DOC).unwrap();
        let mut mass = Mass::new();
        mass.read_data(&doc.root()).unwrap();
        mass.initialize().unwrap();
        mass
    }

    #[test]
    fn test_total_mass_and_cg() {
        let mut mass = make_mass();
        let mut input = DataInp::default();
        input.masses.pilot = 80.0;
        input.masses.fuel = 100.0;

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        mass.update(&mut ctx);

        let props = mass.properties();
        assert_relative_eq!(props.mass, 1200.0);
        // CG pulled forward by pilot and battery, down by fuel
        assert_relative_eq!(props.cg.x, (80.0 + 40.0) / 1200.0, epsilon = 1e-12);
        assert_relative_eq!(props.cg.z, 50.0 / 1200.0, epsilon = 1e-12);
    }

    #[test]
    fn test_variable_mass_changes_properties() {
        let mut mass = make_mass();
        let mut input = DataInp::default();
        input.masses.fuel = 200.0;

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        mass.update(&mut ctx);
        let full = mass.properties().mass;

        input.masses.fuel = 0.0;
        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        mass.update(&mut ctx);
        let empty = mass.properties().mass;

        assert_relative_eq!(full - empty, 200.0);
    }

    #[test]
    fn test_unlinked_variable_mass_fails_initialization() {
        let doc = ConfigDocument::from_str(
            r#"
empty:
  mass: 1000.0
  cg: [0.0, 0.0, 0.0]
  inertia: { ixx: 1300.0, iyy: 1800.0, izz: 2600.0 }
points:
  - { name: ballast, position: [0.0, 0.0, 0.0], variable: true }
"#,
        )
        .unwrap();
        let mut mass = Mass::new();
        mass.read_data(&doc.root()).unwrap();

        match mass.initialize() {
            Err(SimError::Config(ConfigError::Validation(message))) => {
                assert!(message.contains("ballast"));
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_inertia_grows_with_offset_mass() {
        let mut mass = make_mass();
        let mut input = DataInp::default();

        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        mass.update(&mut ctx);
        let baseline_iyy = mass.properties().inertia[(1, 1)];

        input.masses.pilot = 80.0;
        let mut ctx = StepContext::new(0.01, &input, SpatialState::default());
        mass.update(&mut ctx);
        let loaded_iyy = mass.properties().inertia[(1, 1)];

        assert!(loaded_iyy > baseline_iyy);
    }
}
