use aerodyne::{DataDir, DataInp, Fdm};
use std::path::PathBuf;

/// Base data directory of the checked-in vehicle configurations.
pub fn data_dir() -> DataDir {
    DataDir::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

/// The light twin, loaded from its configuration document.
pub fn make_airplane() -> Fdm {
    Fdm::new(&data_dir(), "a410.yaml", 42).expect("airplane config should load")
}

/// The rotor test rig.
pub fn make_rotor_rig() -> Fdm {
    Fdm::new(&data_dir(), "rotor_rig.yaml", 42).expect("rotor rig config should load")
}

/// Inputs for an aircraft parked with crew and fuel aboard.
pub fn parked_input() -> DataInp {
    let mut input = DataInp::default();
    input.masses.pilot = 85.0;
    input.masses.fuel = 120.0;
    input
}
