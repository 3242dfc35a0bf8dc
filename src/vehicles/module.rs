use nalgebra::{Matrix3, Point3, Vector3};

use crate::config::{ConfigError, ConfigNode};
use crate::environment::Atmosphere;
use crate::fdm::DataInp;
use crate::physics::{ForceAccumulator, MassProperties, SpatialState};
use crate::utils::SimError;
use crate::vehicles::aerodynamics::AirData;
use crate::vehicles::controls::ControlDeflections;

/// Shared per-step scratch state, threaded through the subsystem chain in
/// the aircraft's fixed evaluation order.
///
/// `spatial` is a copy of the previous step's state: every subsystem sees
/// the same pre-integration snapshot, which is what makes the scheme
/// semi-implicit.
pub struct StepContext<'a> {
    pub dt: f64,
    pub input: &'a DataInp,
    pub spatial: SpatialState,
    pub atmosphere: Atmosphere,
    /// Total NED wind this step (mean + gusts).
    pub wind_ned: Vector3<f64>,
    pub air_data: AirData,
    /// Resolved control-surface deflections, written by the controls
    /// subsystem before anything downstream reads them.
    pub deflections: ControlDeflections,
    /// Current mass properties, written by the mass subsystem.
    pub mass_props: MassProperties,
    pub forces: ForceAccumulator,
}

impl<'a> StepContext<'a> {
    pub fn new(dt: f64, input: &'a DataInp, spatial: SpatialState) -> Self {
        let mut forces = ForceAccumulator::new();
        forces.begin_step(spatial.attitude);
        Self {
            dt,
            input,
            spatial,
            atmosphere: Atmosphere::default(),
            wind_ned: Vector3::zeros(),
            air_data: AirData::default(),
            deflections: ControlDeflections::default(),
            mass_props: MassProperties::new(1.0, Point3::origin(), Matrix3::identity()),
            forces,
        }
    }
}

/// Common lifecycle shared by every simulated subsystem.
///
/// `read_data` populates parameters from the configuration tree;
/// `initialize` resolves cross-subsystem references and runs exactly once
/// after every subsystem's `read_data`; `update` advances subsystem state
/// once per step, in the aggregate's evaluation order.
pub trait Module {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError>;

    fn initialize(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext);
}
