//! Property-based tests for the flight control laws.

use bevy::math::{DQuat, DVec3};
use proptest::prelude::*;

use crate::control::boostback::{BoostbackConfig, BoostbackState, reorient_step};
use crate::control::hover::HoverConfig;
use crate::control::staging::{SeparationTrigger, StageGate};
use crate::control::thrust::StagedThrustConfig;
use crate::types::{Planet, VehicleState};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The selected band is the first one whose ceiling lies above the altitude.
    #[test]
    fn prop_band_is_first_open_ceiling(altitude in -10.0f64..2_000.0) {
        let table = StagedThrustConfig::ASCENT.table;
        let i = table.band_index(altitude);
        prop_assert!(altitude < table.bands[i].ceiling_km);
        if i > 0 {
            prop_assert!(altitude >= table.bands[i - 1].ceiling_km);
        }
    }

    /// Inside the deadband nothing; outside it, exactly linear in the error.
    #[test]
    fn prop_roll_correction_deadband_and_linearity(roll in -180.0f64..180.0) {
        let cfg = StagedThrustConfig::ASCENT;
        let c = cfg.roll_correction(roll);
        if roll.abs() <= cfg.roll_deadband_deg {
            prop_assert_eq!(c, 0.0);
        } else {
            prop_assert!((c - roll * cfg.roll_gain).abs() < 1e-12);
            prop_assert_eq!(c.signum(), roll.signum());
        }
    }

    /// Above the speed cap the command is exactly the sustain thrust.
    #[test]
    fn prop_overspeed_ignores_altitude_and_roll(
        altitude in 0.0f64..1_000.0,
        speed in 9.001f64..30.0,
        roll in -90.0f64..90.0,
    ) {
        let cfg = StagedThrustConfig::ASCENT;
        let cmd = cfg.command(altitude, speed, Some(roll)).unwrap();
        prop_assert_eq!(cmd.force, DVec3::Y * cfg.sustain_thrust);
    }

    /// The interpolation parameter never decreases and never exceeds one.
    #[test]
    fn prop_reorient_parameter_monotonic(
        increment in 0.001f64..1.0,
        x in -200.0f64..200.0,
        z in -200.0f64..200.0,
        vx in -3.0f64..3.0,
        ticks in 1usize..400,
    ) {
        let planet = Planet::EARTH;
        let config = BoostbackConfig { slerp_increment: increment, ..Default::default() };
        let state = VehicleState {
            velocity: DVec3::new(vx, 0.5, 0.0),
            ..VehicleState::at_rest(DVec3::new(x, 80.0, z), 1.0)
        };
        let mut progress = BoostbackState::default();
        let mut last = 0.0;
        for _ in 0..ticks {
            let attitude = reorient_step(&config, &mut progress, &state, &planet, DVec3::ZERO);
            prop_assert!(progress.t >= last);
            prop_assert!(progress.t <= 1.0);
            if let Some(q) = attitude {
                prop_assert!(q.is_finite());
                prop_assert!((q.length() - 1.0).abs() < 1e-9);
            }
            last = progress.t;
        }
    }

    /// Vertical hover thrust always lies within the configured bounds.
    #[test]
    fn prop_hover_thrust_clamped(
        altitude in prop::num::f64::ANY,
        vz in prop::num::f64::ANY,
    ) {
        let cfg = HoverConfig::default();
        let thrust = cfg.vertical_thrust(altitude, vz);
        prop_assert!(thrust >= cfg.min_thrust);
        prop_assert!(thrust <= cfg.max_thrust);
    }

    /// Lateral hover thrust never exceeds its cap and stays horizontal.
    #[test]
    fn prop_hover_lateral_bounded(
        x in -500.0f64..500.0,
        z in -500.0f64..500.0,
        altitude in 0.0f64..60.0,
        vx in -2.0f64..2.0,
    ) {
        let cfg = HoverConfig::default();
        let planet = Planet::EARTH;
        let state = VehicleState {
            velocity: DVec3::new(vx, -0.1, 0.0),
            ..VehicleState::at_rest(DVec3::new(x, altitude, z), 1.0)
        };
        let cmd = cfg.command(&state, &planet, DVec3::ZERO).unwrap();
        let up = planet.up_at(state.position).unwrap();
        let world = state.orientation * cmd.force;
        let lateral = world - up * world.dot(up);
        prop_assert!(lateral.length() <= cfg.lateral.max_thrust + 1e-6);
    }

    /// However the altitude history wanders, the gate fires at most once.
    #[test]
    fn prop_separation_fires_once(
        altitudes in prop::collection::vec(-10.0f64..200.0, 1..100),
    ) {
        let trigger = SeparationTrigger { altitude_km: Some(70.0), burn_time: None };
        let mut gate = StageGate::new(None);
        let mut fired = 0;
        for (i, alt) in altitudes.iter().enumerate() {
            if gate.evaluate(&trigger, *alt, i as f64).is_some() {
                fired += 1;
            }
        }
        let crossed = altitudes.iter().any(|a| *a >= 70.0);
        prop_assert_eq!(fired, usize::from(crossed));
        prop_assert_eq!(gate.is_separated(), crossed);
    }

    /// Hover commands are expressed in the body frame of an arbitrary attitude.
    #[test]
    fn prop_hover_command_respects_attitude(angle in -3.0f64..3.0) {
        let cfg = HoverConfig::default();
        let planet = Planet::EARTH;
        let upright = VehicleState::at_rest(DVec3::new(0.0, 5.0, 0.0), 1.0);
        let tilted = VehicleState { orientation: DQuat::from_rotation_z(angle), ..upright };

        let a = cfg.command(&upright, &planet, DVec3::ZERO).unwrap();
        let b = cfg.command(&tilted, &planet, DVec3::ZERO).unwrap();
        let world_a = upright.orientation * a.force;
        let world_b = tilted.orientation * b.force;
        prop_assert!((world_a - world_b).length() < 1e-6);
    }
}
