//! Blade-element rotor model with flap/lag blade dynamics and the
//! reference-frame transforms between inertial, body and rotor-disk axes.

mod blade;
mod frames;
#[allow(clippy::module_inception)]
mod rotor;

pub use blade::{Blade, BladeConfig, BladeEnvironment, BladeReaction};
pub use frames::{Frame, FrameSet};
pub use rotor::{Rotor, RotorReaction};
