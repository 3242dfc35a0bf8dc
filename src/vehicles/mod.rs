mod aerodynamics;
mod aircraft;
mod controls;
mod gear;
mod mass;
mod module;
mod propulsion;

pub use aerodynamics::{AirData, Aerodynamics};
pub use aircraft::{Aircraft, VehicleVariant};
pub use controls::{ControlDeflections, Controls};
pub use gear::{GearLegState, LandingGear};
pub use mass::Mass;
pub use module::{Module, StepContext};
pub use propulsion::{Engine, Governor, Propulsion};
