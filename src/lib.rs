pub mod config;
pub mod control;
pub mod environment;
pub mod fdm;
pub mod physics;
pub mod rotor;
pub mod utils;
pub mod vehicles;

pub use config::{ConfigDocument, ConfigError, ConfigNode, DataDir};
pub use environment::{Atmosphere, WindModel};
pub use fdm::{DataInp, DataOut, Fdm, SettleConfig, SettleStatus};
pub use physics::{SpatialState, StateVector};
pub use utils::SimError;
pub use vehicles::{Aircraft, VehicleVariant};
