//! Property-based tests for the reference rigid-body world.
//!
//! These check the invariants the flight controller relies on across a
//! wide range of positions, loads and timesteps.

use bevy::math::{DQuat, DVec3};
use proptest::prelude::*;

use crate::physics::{PhysicsWorld, RigidBody, gravity_acceleration};
use crate::test_utils::{assertions, fixtures};
use crate::types::{Planet, VehicleState};
use crate::vehicle::VehicleBody;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Gravity always points at the planet center and falls off as 1/r².
    #[test]
    fn prop_gravity_central_inverse_square(
        x in -20_000.0f64..20_000.0,
        y in -20_000.0f64..20_000.0,
        z in -20_000.0f64..20_000.0,
    ) {
        let planet = Planet::EARTH;
        let pos = DVec3::new(x, y, z);
        let r = (pos - planet.center).length();
        prop_assume!(r > 10.0);

        let g = gravity_acceleration(pos, &planet);
        let toward = (planet.center - pos) / r;
        prop_assert!((g.normalize().dot(toward) - 1.0).abs() < 1e-9);
        prop_assert!((g.length() * r * r / planet.mu() - 1.0).abs() < 1e-9);
    }

    /// Specific energy drifts only slightly over a short ballistic arc.
    #[test]
    fn prop_ballistic_energy_bounded(
        altitude in 50.0f64..500.0,
        speed in 0.0f64..3.0,
        heading in 0.0f64..std::f64::consts::TAU,
    ) {
        let planet = Planet::EARTH;
        let state = fixtures::booster_at(altitude, DVec3::new(heading.cos(), 0.0, heading.sin()) * speed);
        let mut world = PhysicsWorld::new(planet);
        let h = world.add_body(RigidBody::dynamic(state));

        let e0 = assertions::specific_energy(&state, &planet);
        for _ in 0..300 {
            world.step(0.1).unwrap();
        }
        let s = world.body(h).unwrap().state;
        prop_assume!(planet.altitude(s.position) > 0.0);
        let e1 = assertions::specific_energy(&s, &planet);
        assertions::assert_energy_conserved(e0, e1, 1e-3);
    }

    /// A locked child keeps its offset in the parent frame under any load.
    #[test]
    fn prop_lock_holds_relative_pose(
        fx in -1e5f64..1e5,
        fy in -1e5f64..1e5,
        fz in -1e5f64..1e5,
        px in -0.03f64..0.03,
        steps in 1usize..60,
    ) {
        let (mut world, booster, ship, _) = fixtures::stack_in_flight(20.0);
        let offset = DVec3::new(0.0, 0.06, 0.0);

        for _ in 0..steps {
            world
                .body_mut(booster)
                .unwrap()
                .apply_local_force(DVec3::new(fx, fy, fz), DVec3::new(px, -0.035, 0.0));
            world.step(1.0 / 30.0).unwrap();
        }

        let b = world.body(booster).unwrap().state;
        let s = world.body(ship).unwrap().state;
        let local = b.orientation.inverse() * (s.position - b.position);
        prop_assert!((local - offset).length() < 1e-9);
        prop_assert!(s.orientation.angle_between(b.orientation) < 1e-6);
    }

    /// Orientation stays a unit quaternion whatever the applied torque.
    #[test]
    fn prop_orientation_stays_normalized(
        lateral in -1e4f64..1e4,
        angle in -3.0f64..3.0,
        dt in 0.01f64..1.0,
    ) {
        let mut world = PhysicsWorld::new(Planet::EARTH);
        let state = VehicleState {
            orientation: DQuat::from_rotation_x(angle),
            ..fixtures::booster_at(30.0, DVec3::ZERO)
        };
        let h = world.add_body(RigidBody::cylinder(0.005, 0.07, state));
        for _ in 0..50 {
            world
                .body_mut(h)
                .unwrap()
                .apply_local_force(DVec3::new(lateral, 0.0, 0.0), DVec3::new(0.0, -0.035, 0.0));
            world.step(dt).unwrap();
        }
        let q = world.body(h).unwrap().state.orientation;
        prop_assert!((q.length() - 1.0).abs() < 1e-9);
    }

    /// Nothing ends a step below its ground clearance.
    #[test]
    fn prop_ground_never_penetrated(
        x in -50.0f64..50.0,
        vy in -5.0f64..0.0,
        dt in 0.01f64..2.0,
    ) {
        let planet = Planet::EARTH;
        let mut world = PhysicsWorld::new(planet);
        let state = VehicleState {
            velocity: DVec3::new(0.0, vy, 0.0),
            ..fixtures::booster_at(0.5, DVec3::ZERO)
        };
        let state = VehicleState { position: state.position + DVec3::X * x, ..state };
        let h = world.add_body(RigidBody::cylinder(0.005, 0.07, state));
        for _ in 0..20 {
            world.step(dt).unwrap();
            let body = world.body(h).unwrap();
            prop_assert!(planet.altitude(body.state.position) >= body.clearance - 1e-9);
        }
    }
}
