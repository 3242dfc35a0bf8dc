use nalgebra::{Point3, Vector3};

use crate::config::{ConfigError, ConfigNode};
use crate::physics::{Force, ForceCategory};
use crate::vehicles::module::{Module, StepContext};

const MIN_SLIP_SPEED: f64 = 0.05;

/// One landing-gear leg: strut spring/damper plus tyre friction.
#[derive(Debug, Clone)]
struct GearLeg {
    name: String,
    /// Wheel contact point in the body frame at full extension (m).
    position: Point3<f64>,
    /// Strut spring constant (N/m) and damping (N·s/m).
    spring: f64,
    damper: f64,
    rolling_friction: f64,
    braking_friction: f64,
    /// Nose-wheel steering authority, side force per unit rudder.
    steering_gain: f64,
    steerable: bool,
    retractable: bool,
    compression: f64,
    contact: bool,
}

impl GearLeg {
    fn read_data(node: &ConfigNode) -> Result<Self, ConfigError> {
        Ok(Self {
            name: node.string("name")?,
            position: node.vector3("position")?.into(),
            spring: node.f64("spring")?,
            damper: node.f64("damper")?,
            rolling_friction: node.f64_or("rolling_friction", 0.02)?,
            braking_friction: node.f64_or("braking_friction", 0.5)?,
            steering_gain: node.f64_or("steering_gain", 0.0)?,
            steerable: node.bool_or("steerable", false)?,
            retractable: node.bool_or("retractable", false)?,
            compression: 0.0,
            contact: false,
        })
    }
}

/// Per-gear state exported to telemetry.
#[derive(Debug, Clone, Copy, Default)]
pub struct GearLegState {
    pub compression: f64,
    pub contact: bool,
}

/// Ground-contact model over a flat plane at zero altitude.
///
/// Each wheel produces a spring/damper normal force from strut penetration
/// plus rolling/braking friction opposing the contact-point velocity. Gear
/// forces join the same per-step summation the integrator consumes.
#[derive(Debug, Clone, Default)]
pub struct LandingGear {
    legs: Vec<GearLeg>,
}

impl LandingGear {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leg_states(&self) -> Vec<GearLegState> {
        self.legs
            .iter()
            .map(|leg| GearLegState {
                compression: leg.compression,
                contact: leg.contact,
            })
            .collect()
    }

    pub fn any_contact(&self) -> bool {
        self.legs.iter().any(|leg| leg.contact)
    }
}

impl Module for LandingGear {
    fn read_data(&mut self, node: &ConfigNode) -> Result<(), ConfigError> {
        self.legs = node
            .children("legs")?
            .iter()
            .map(GearLeg::read_data)
            .collect::<Result<_, _>>()?;
        if self.legs.is_empty() {
            return Err(ConfigError::Validation(
                "landing gear requires at least one leg".into(),
            ));
        }
        for leg in &self.legs {
            log::debug!("configured gear leg '{}'", leg.name);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut StepContext) {
        let spatial = &ctx.spatial;
        let gear_down = ctx.input.controls.gear_down;
        let brakes = ctx.deflections.brakes;
        let rudder = ctx.deflections.rudder;

        for leg in &mut self.legs {
            if leg.retractable && !gear_down {
                leg.compression = 0.0;
                leg.contact = false;
                continue;
            }

            // Wheel position and velocity in NED
            let wheel_ned = spatial.position + spatial.attitude * leg.position.coords;
            let wheel_velocity_ned = spatial.attitude
                * (spatial.velocity + spatial.angular_velocity.cross(&leg.position.coords));

            // Ground plane at z = 0, z positive down
            leg.compression = wheel_ned.z.max(0.0);
            leg.contact = leg.compression > 0.0;
            if !leg.contact {
                continue;
            }

            // Strut normal force, spring against penetration plus damping
            // against sink rate, never pulling the wheel down
            let normal = (leg.spring * leg.compression + leg.damper * wheel_velocity_ned.z)
                .max(0.0);
            let mut force_ned = Vector3::new(0.0, 0.0, -normal);

            // Friction opposes the horizontal contact-point velocity
            let horizontal = Vector3::new(wheel_velocity_ned.x, wheel_velocity_ned.y, 0.0);
            let slip_speed = horizontal.norm();
            if slip_speed > MIN_SLIP_SPEED {
                let mu = leg.rolling_friction
                    + (leg.braking_friction - leg.rolling_friction) * brakes;
                force_ned -= mu * normal * horizontal / slip_speed;
            }

            ctx.forces.add_force(Force::inertial_at(
                force_ned,
                leg.position,
                ForceCategory::Ground,
            ));

            // Nose-wheel steering as a lateral tyre force
            if leg.steerable && slip_speed > MIN_SLIP_SPEED {
                ctx.forces.add_force(Force::body_at(
                    Vector3::new(0.0, leg.steering_gain * normal * rudder, 0.0),
                    leg.position,
                    ForceCategory::Ground,
                ));
            }
        }
    }
}
