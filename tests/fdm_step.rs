mod common;

use aerodyne::SettleConfig;
use approx::assert_relative_eq;
use common::{make_airplane, parked_input};

/// Out-of-range timesteps are clamped to the documented bounds, never
/// rejected.
#[test]
fn timestep_is_clamped() {
    let mut fdm = make_airplane();
    let input = parked_input();

    fdm.step(&input, 10.0);
    assert_relative_eq!(fdm.time(), 0.1);

    fdm.step(&input, 0.0);
    assert_relative_eq!(fdm.time(), 0.101);
}

/// The telemetry snapshot is rebuilt fully every step.
#[test]
fn output_reflects_current_state() {
    let mut fdm = make_airplane();
    let input = parked_input();
    fdm.settle_on_ground(&input, 1.3, &SettleConfig::default());

    let out = fdm.output().clone();

    assert!(out.on_ground);
    assert!(out.position.altitude_asl > 1.0 && out.position.altitude_asl < 1.3);
    assert_relative_eq!(out.air.temperature, 288.15, epsilon = 0.1);
    assert_relative_eq!(out.air.altitude_baro, out.position.altitude_asl, epsilon = 0.05);
    assert!(out.air.density > 1.2);
    assert!(out.acceleration.load_factor > 0.9 && out.acceleration.load_factor < 1.1);
    assert_eq!(out.engines.len(), 2);
    assert!(!out.engines[0].running);

    // Airplane variant appends its control-surface extension fields
    for key in ["elevator_deg", "aileron_deg", "rudder_deg", "flaps_deg"] {
        assert!(out.extra.contains_key(key), "missing extra field {}", key);
    }
}

/// Starting the engines and opening the throttle accelerates the takeoff
/// roll; indicated airspeed trails true airspeed with density altitude.
#[test]
fn takeoff_roll_accelerates() {
    let mut fdm = make_airplane();
    let mut input = parked_input();
    fdm.settle_on_ground(&input, 1.3, &SettleConfig::default());

    input.engine.starter = true;
    input.controls.throttle = 1.0;

    // Crank until both engines run
    for _ in 0..400 {
        fdm.step(&input, 0.005);
    }
    assert!(fdm.output().engines.iter().all(|e| e.running));
    input.engine.starter = false;

    for _ in 0..800 {
        fdm.step(&input, 0.005);
    }

    let out = fdm.output();
    assert!(out.on_ground, "should still be rolling");
    assert!(
        out.velocity.groundspeed > 15.0,
        "groundspeed only {:.1} m/s",
        out.velocity.groundspeed
    );
    assert!(out.engines.iter().all(|e| e.thrust > 1000.0));
    assert!(out.engines.iter().all(|e| e.fuel_flow > 0.0));
    assert!(out.engines.iter().all(|e| e.rpm > 100.0));
    assert!(out.air.airspeed_true > 0.0);
    assert!(out.air.airspeed_indicated <= out.air.airspeed_true + 1e-9);

    // Rolling straight down the north-aligned runway, path angle level
    assert!(out.velocity.ground_track.abs() < 0.2);
    assert!(out.velocity.flight_path.abs() < 0.1);
}

/// A headwind raises indicated and true airspeed without ground movement.
#[test]
fn wind_shows_up_as_airspeed() {
    let mut fdm = make_airplane();
    let mut input = parked_input();
    fdm.settle_on_ground(&input, 1.3, &SettleConfig::default());

    input.environment.wind_ned = nalgebra::Vector3::new(-8.0, 0.0, 0.0);
    for _ in 0..100 {
        fdm.step(&input, 0.005);
    }

    let out = fdm.output();
    assert!(out.air.airspeed_true > 7.0);
    assert!(out.velocity.groundspeed < 1.0);
}

/// Deterministic turbulence: the same seed replays the same trajectory.
#[test]
fn turbulence_is_reproducible_per_seed() {
    let run = |seed: u64| {
        let mut fdm = make_airplane();
        let mut input = parked_input();
        fdm.settle_on_ground(&input, 1.3, &SettleConfig::default());
        input.environment.turbulence = true;
        input.environment.turbulence_intensity = 4.0;
        input.environment.turbulence_seed = seed;
        for _ in 0..200 {
            fdm.step(&input, 0.005);
        }
        fdm.output().air.airspeed_true
    };

    assert_eq!(run(7).to_bits(), run(7).to_bits());
}
