use nalgebra::Vector3;

use crate::config::{ConfigDocument, ConfigError};
use crate::environment::{Atmosphere, WindModel};
use crate::fdm::DataInp;
use crate::physics::{
    integrate_state, Force, ForceCategory, MassProperties, SpatialState, StateVector,
};
use crate::utils::constants::GRAVITY;
use crate::utils::SimError;
use crate::vehicles::aerodynamics::{AirData, Aerodynamics};
use crate::vehicles::controls::{ControlDeflections, Controls};
use crate::vehicles::gear::{GearLegState, LandingGear};
use crate::vehicles::mass::Mass;
use crate::vehicles::module::{Module, StepContext};
use crate::vehicles::propulsion::Propulsion;

/// Vehicle variant, selecting the vehicle-specific telemetry extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleVariant {
    Airplane,
    RotorRig,
}

impl VehicleVariant {
    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "airplane" => Ok(Self::Airplane),
            "rotor_rig" => Ok(Self::RotorRig),
            other => Err(ConfigError::Validation(format!(
                "unknown vehicle type '{}'",
                other
            ))),
        }
    }
}

/// The aircraft aggregate.
///
/// Owns one instance of each subsystem, the environment models and the
/// state vector. `update` runs the subsystems in a fixed order: controls,
/// environment, air data, aerodynamics, propulsion, mass, gravity, landing
/// gear, 6-DOF integration, then post-integration bookkeeping. Every
/// subsystem sees the previous step's spatial state, so the applied forces
/// lag the state by one step.
pub struct Aircraft {
    name: String,
    variant: VehicleVariant,
    controls: Controls,
    aerodynamics: Aerodynamics,
    propulsion: Propulsion,
    mass: Mass,
    gear: LandingGear,
    atmosphere: Atmosphere,
    wind: WindModel,
    spatial: SpatialState,
    air_data: AirData,
    deflections: ControlDeflections,
    mass_props: MassProperties,
    /// Body-axis acceleration of the last step, gravity included (m/s^2).
    acceleration: Vector3<f64>,
    load_factor: f64,
    on_ground: bool,
}

impl Aircraft {
    /// Builds the aircraft from one configuration document: `read_data` on
    /// every subsystem, then a single `initialize` pass to resolve
    /// cross-subsystem references.
    pub fn from_config(doc: &ConfigDocument, seed: u64) -> Result<Self, SimError> {
        let root = doc.root();
        let vehicle = root.child("vehicle")?;
        let name = vehicle.string("name")?;
        let variant = VehicleVariant::parse(&vehicle.string("type")?)?;

        let mut controls = Controls::new();
        let mut aerodynamics = Aerodynamics::new();
        let mut propulsion = Propulsion::new();
        let mut mass = Mass::new();
        let mut gear = LandingGear::new();

        controls.read_data(&root.child("controls")?)?;
        aerodynamics.read_data(&root.child("aerodynamics")?)?;
        propulsion.read_data(&root.child("propulsion")?)?;
        mass.read_data(&root.child("mass")?)?;
        gear.read_data(&root.child("gear")?)?;

        // Initialization runs once, after every subsystem has read its data
        controls.initialize()?;
        aerodynamics.initialize()?;
        propulsion.initialize()?;
        mass.initialize()?;
        gear.initialize()?;

        log::info!("aircraft '{}' configured", name);

        Ok(Self {
            name,
            variant,
            controls,
            aerodynamics,
            propulsion,
            mass,
            gear,
            atmosphere: Atmosphere::default(),
            wind: WindModel::new(seed),
            spatial: SpatialState::default(),
            air_data: AirData::default(),
            deflections: ControlDeflections::default(),
            mass_props: MassProperties::new(1.0, nalgebra::Point3::origin(), nalgebra::Matrix3::identity()),
            acceleration: Vector3::zeros(),
            load_factor: 1.0,
            on_ground: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> VehicleVariant {
        self.variant
    }

    pub fn spatial(&self) -> &SpatialState {
        &self.spatial
    }

    pub fn set_spatial(&mut self, spatial: SpatialState) {
        self.spatial = spatial;
    }

    pub fn state_vector(&self) -> StateVector {
        StateVector::pack(&self.spatial)
    }

    pub fn air_data(&self) -> &AirData {
        &self.air_data
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn deflections(&self) -> &ControlDeflections {
        &self.deflections
    }

    pub fn mass_props(&self) -> &MassProperties {
        &self.mass_props
    }

    pub fn propulsion(&self) -> &Propulsion {
        &self.propulsion
    }

    pub fn gear_states(&self) -> Vec<GearLegState> {
        self.gear.leg_states()
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.acceleration
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Advances the whole aircraft one timestep.
    pub fn update(&mut self, input: &DataInp, dt: f64) {
        let mut ctx = StepContext::new(dt, input, self.spatial);

        // 1. Controls: pilot inputs into surface deflections
        self.controls.update(&mut ctx);

        // 2. Environment: air properties at the current altitude, wind
        self.atmosphere.update(ctx.spatial.altitude_asl());
        ctx.atmosphere = self.atmosphere;
        self.wind.reseed(input.environment.turbulence_seed);
        self.wind.set_mean(input.environment.wind_ned);
        self.wind.set_turbulence(
            input.environment.turbulence,
            input.environment.turbulence_intensity,
        );
        ctx.wind_ned = self.wind.update(dt);
        ctx.air_data = AirData::calculate(&ctx.spatial, ctx.wind_ned, ctx.atmosphere.density);

        // 3-5. Force-producing subsystems, then mass properties
        self.aerodynamics.update(&mut ctx);
        self.propulsion.update(&mut ctx);
        self.mass.update(&mut ctx);

        // Weight acts at the CG and produces no moment about it
        ctx.forces.add_force(Force::inertial(
            Vector3::new(0.0, 0.0, ctx.mass_props.mass * GRAVITY),
            ForceCategory::Gravitational,
        ));

        // 6. Ground contact joins the same summation before integration
        self.gear.update(&mut ctx);

        // 7. Integrate the 6-DOF equations of motion
        let force_body = ctx.forces.net_force_body();
        let moment_body = ctx.forces.net_moment_body(&ctx.mass_props.cg);

        self.acceleration = force_body / ctx.mass_props.mass;
        let gravity_body = ctx.forces.force_by_category(ForceCategory::Gravitational);
        let specific_force = (force_body - gravity_body) / ctx.mass_props.mass;
        self.load_factor = -specific_force.z / GRAVITY;

        integrate_state(
            &mut self.spatial,
            &ctx.mass_props,
            force_body,
            moment_body,
            dt,
        );

        // 8. Post-integration bookkeeping: shaft states, cached outputs
        self.propulsion.post_integrate(dt);
        self.air_data = ctx.air_data;
        self.deflections = ctx.deflections;
        self.mass_props = ctx.mass_props;
        self.on_ground = self.gear.any_contact();
    }
}
