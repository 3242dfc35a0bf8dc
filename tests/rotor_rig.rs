mod common;

use aerodyne::SettleConfig;
use common::{make_rotor_rig, parked_input};
use std::f64::consts::TAU;

/// Spools the rig up on its skids: governor tracks the lever curve, blades
/// produce thrust, telemetry carries the rotor extension fields.
#[test]
fn rig_spins_up_under_governor() {
    let mut fdm = make_rotor_rig();
    let mut input = parked_input();
    fdm.settle_on_ground(&input, 1.05, &SettleConfig::default());

    input.engine.starter = true;
    input.controls.throttle = 0.3;
    input.controls.collective = 0.2;

    for _ in 0..400 {
        fdm.step(&input, 0.005);
    }
    assert!(fdm.output().engines[0].running);
    input.engine.starter = false;

    // Let the shaft and blade dynamics reach steady state
    for _ in 0..4000 {
        fdm.step(&input, 0.005);
    }

    let out = fdm.output();
    assert!(out.on_ground, "the rig should stay on its skids");

    // Shaft speed settles near the governor target band
    assert!(
        out.engines[0].rpm > 100.0 && out.engines[0].rpm < 400.0,
        "shaft at {:.0} RPM",
        out.engines[0].rpm
    );
    assert!(out.engines[0].torque > 0.0);
    assert!(out.engines[0].fuel_flow > 0.0);

    // Rotor extension fields are present and sane
    let thrust = out.extra["rotor_thrust"];
    assert!(thrust > 0.0, "rotor thrust {:.1} N", thrust);

    let azimuth = out.extra["rotor_azimuth"];
    assert!((0.0..TAU).contains(&azimuth));

    let flap = out.extra["blade_flap"];
    assert!(flap > 0.0 && flap < 0.35, "blade coning {:.3} rad", flap);

    let pitch = out.extra["governor_pitch"];
    assert!((0.0..=0.2).contains(&pitch));
}

/// Cutting fuel winds the rotor down.
#[test]
fn fuel_shutoff_spins_the_rotor_down() {
    let mut fdm = make_rotor_rig();
    let mut input = parked_input();
    fdm.settle_on_ground(&input, 1.05, &SettleConfig::default());

    input.engine.starter = true;
    input.controls.throttle = 0.3;
    input.controls.collective = 0.2;
    for _ in 0..3000 {
        fdm.step(&input, 0.005);
    }
    let running_rpm = fdm.output().engines[0].rpm;
    assert!(running_rpm > 50.0);

    input.engine.fuel_shutoff = true;
    input.engine.starter = false;
    for _ in 0..3000 {
        fdm.step(&input, 0.005);
    }

    let out = fdm.output();
    assert!(!out.engines[0].running);
    assert!(
        out.engines[0].rpm < running_rpm / 2.0,
        "rotor barely slowed: {:.0} -> {:.0} RPM",
        running_rpm,
        out.engines[0].rpm
    );
}
