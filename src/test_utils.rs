//! Test utilities for flight and physics tests.
//!
//! Provides fixtures for vehicle states and worlds, plus assertions for
//! physical invariants such as energy conservation.

use bevy::math::DVec3;

use crate::types::{Planet, VehicleState};

/// Booster mass used by the fixtures (kg)
pub const BOOSTER_MASS: f64 = 2.0e6;

/// Ship mass used by the fixtures (kg)
pub const SHIP_MASS: f64 = 2.0e6;

/// Fixtures for creating test states and worlds.
pub mod fixtures {
    use super::*;
    use crate::control::JointId;
    use crate::physics::{BodyHandle, PhysicsWorld, RigidBody};

    /// Upright booster above the pad at the given altitude and velocity.
    pub fn booster_at(altitude: f64, velocity: DVec3) -> VehicleState {
        VehicleState {
            velocity,
            ..VehicleState::at_rest(DVec3::new(0.0, altitude, 0.0), BOOSTER_MASS)
        }
    }

    /// Booster and ship locked together, booster base at `altitude`.
    pub fn stack_in_flight(altitude: f64) -> (PhysicsWorld, BodyHandle, BodyHandle, JointId) {
        let mut world = PhysicsWorld::new(Planet::EARTH);
        let booster = world.add_body(RigidBody::cylinder(
            0.005,
            0.07,
            booster_at(altitude + 0.035, DVec3::ZERO),
        ));
        let ship = world.add_body(RigidBody::cylinder(
            0.005,
            0.05,
            VehicleState::at_rest(DVec3::new(0.0, altitude + 0.095, 0.0), SHIP_MASS),
        ));
        let joint = world
            .add_lock_constraint(booster, ship)
            .expect("fresh bodies can always be locked");
        (world, booster, ship, joint)
    }

    /// Stack standing on the pad.
    pub fn stack_on_pad() -> (PhysicsWorld, BodyHandle, BodyHandle, JointId) {
        stack_in_flight(0.0)
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Specific mechanical energy in the planet's point-mass field.
    ///
    /// E = v²/2 - μ/r
    pub fn specific_energy(state: &VehicleState, planet: &Planet) -> f64 {
        let r = (state.position - planet.center).length();
        let v = state.velocity.length();
        0.5 * v * v - planet.mu() / r
    }

    /// Assert that energy is conserved within tolerance.
    ///
    /// # Panics
    /// Panics if relative energy drift exceeds tolerance.
    pub fn assert_energy_conserved(initial_energy: f64, final_energy: f64, tolerance: f64) {
        let drift = if initial_energy.abs() > 1e-10 {
            ((final_energy - initial_energy) / initial_energy).abs()
        } else {
            (final_energy - initial_energy).abs()
        };
        assert!(
            drift <= tolerance,
            "Energy not conserved: initial={initial_energy:.6e}, final={final_energy:.6e}, drift={drift:.6e}, tolerance={tolerance:.6e}"
        );
    }
}

/// Utilities for creating headless Bevy apps for testing.
pub mod bevy_test {
    use bevy::prelude::*;

    /// Create a minimal Bevy app for testing without rendering.
    ///
    /// This app uses MinimalPlugins for a lightweight test environment.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stack_fixture_is_locked() {
        let (world, booster, ship, joint) = fixtures::stack_on_pad();
        assert!(world.constraint(joint).is_some());
        assert!(world.is_locked_child(ship));
        assert!(!world.is_locked_child(booster));
    }

    #[test]
    fn test_energy_at_rest_on_surface() {
        let planet = Planet::EARTH;
        let e = assertions::specific_energy(&fixtures::booster_at(0.0, DVec3::ZERO), &planet);
        assert_relative_eq!(e, -planet.mu() / planet.radius, epsilon = 1e-6);
    }
}
