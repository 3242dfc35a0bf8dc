mod atmosphere;
mod wind;

pub use atmosphere::Atmosphere;
pub use wind::WindModel;
