mod forces;
mod integrator;
mod state;

pub use forces::{Force, ForceAccumulator, ForceCategory, Moment, ReferenceFrame};
pub use integrator::{integrate_state, MassProperties};
pub use state::{SpatialState, StateVector};
