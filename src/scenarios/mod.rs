//! Scenario system for predefined flights.
//!
//! Each scenario pairs one [`FlightControllerConfig`] with the vehicles and
//! initial conditions it flies. Scenarios cover:
//! - Single-stack orbital ascent
//! - Hot staging on a burn-time budget
//! - Separation, boostback and hover landing
//! - Hover test from a drop above the pad

pub mod presets;

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::camera::CameraView;
use crate::control::{ConfigError, FlightControllerConfig, JointId};
use crate::physics::{BodyHandle, CollisionShape, PhysicsWorld, RigidBody, ShapeKind, WorldError};
use crate::types::VehicleState;

pub use presets::SCENARIOS;

/// Launch tower position relative to the pad (km)
pub const TOWER_OFFSET: DVec3 = DVec3::new(0.03, 0.0, 0.0);

/// Tower height (km)
pub const TOWER_HEIGHT: f64 = 0.145;

/// Dimensions, mass and look of one vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleSpec {
    /// Mass (kg)
    pub mass: f64,
    /// Body radius (km)
    pub radius: f64,
    /// Body height (km)
    pub height: f64,
    /// glTF model path, if the vehicle has one
    pub model: Option<&'static str>,
}

/// A predefined flight.
#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    /// Unique identifier, also accepted on the command line.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Brief description of the scenario.
    pub description: &'static str,
    /// Controller configuration for this flight.
    pub controller: FlightControllerConfig,
    /// First stage, or the whole vehicle for single-stack flights.
    pub booster: VehicleSpec,
    /// Upper stage stacked on the booster, if any.
    pub ship: Option<VehicleSpec>,
    /// Altitude of the booster base at t=0 (km).
    pub start_altitude: f64,
    /// Initial velocity of the stack (km/s).
    pub start_velocity: DVec3,
    /// Simulated seconds per fixed tick.
    pub dt: f64,
    /// Camera view selected on load.
    pub camera_view: CameraView,
}

impl Scenario {
    /// Validate the controller configuration and initial conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "scenario dt",
                value: self.dt,
            });
        }
        for spec in std::iter::once(&self.booster).chain(self.ship.as_ref()) {
            if !(spec.mass > 0.0 && spec.radius > 0.0 && spec.height > 0.0) {
                return Err(ConfigError::NonPositive {
                    field: "vehicle dimensions",
                    value: spec.mass.min(spec.radius).min(spec.height),
                });
            }
        }
        Ok(())
    }
}

/// Resource tracking the currently loaded scenario.
#[derive(Resource, Clone, Copy, Debug)]
pub struct CurrentScenario {
    pub id: &'static str,
}

impl Default for CurrentScenario {
    fn default() -> Self {
        Self {
            id: presets::DEFAULT_SCENARIO,
        }
    }
}

/// Message requesting a scenario (re)load.
#[derive(Message, Clone, Copy, Debug)]
pub struct LoadScenario {
    /// ID of the scenario to load.
    pub scenario_id: &'static str,
}

/// Bodies created for a scenario.
#[derive(Clone, Debug)]
pub struct FlightSetup {
    pub world: PhysicsWorld,
    pub booster: BodyHandle,
    pub ship: Option<BodyHandle>,
    /// Lock between booster and ship
    pub joint: Option<JointId>,
    pub pad: BodyHandle,
    pub tower: BodyHandle,
}

/// Build a fresh physics world for a scenario.
///
/// The booster stands upright with its base at `start_altitude` above the
/// pad and the ship, if any, sits on top of it held by a lock constraint.
pub fn build_world(scenario: &Scenario) -> Result<FlightSetup, WorldError> {
    let mut world = PhysicsWorld::new(scenario.controller.planet);
    let site = scenario.controller.landing_site;

    let pad = world.add_body(
        RigidBody::fixed(site).with_shape(
            CollisionShape::new(ShapeKind::Cuboid {
                half_extents: DVec3::new(0.02, 0.001, 0.02),
            })
            .at(DVec3::new(0.0, -0.001, 0.0)),
        ),
    );
    let tower = world.add_body(
        RigidBody::fixed(site + TOWER_OFFSET).with_shape(
            CollisionShape::new(ShapeKind::Cuboid {
                half_extents: DVec3::new(0.006, TOWER_HEIGHT / 2.0, 0.006),
            })
            .at(DVec3::new(0.0, TOWER_HEIGHT / 2.0, 0.0)),
        ),
    );

    let b = scenario.booster;
    let booster_center = site + DVec3::Y * (scenario.start_altitude + b.height / 2.0);
    let booster = world.add_body(RigidBody::cylinder(
        b.radius,
        b.height,
        VehicleState {
            velocity: scenario.start_velocity,
            ..VehicleState::at_rest(booster_center, b.mass)
        },
    ));

    let (ship, joint) = match scenario.ship {
        Some(s) => {
            let center = booster_center + DVec3::Y * (b.height / 2.0 + s.height / 2.0);
            let ship = world.add_body(RigidBody::cylinder(
                s.radius,
                s.height,
                VehicleState {
                    velocity: scenario.start_velocity,
                    ..VehicleState::at_rest(center, s.mass)
                },
            ));
            let joint = world.add_lock_constraint(booster, ship)?;
            (Some(ship), Some(joint))
        }
        None => (None, None),
    };

    Ok(FlightSetup {
        world,
        booster,
        ship,
        joint,
        pad,
        tower,
    })
}

/// Get a scenario by ID.
pub fn get_scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_every_preset_validates() {
        for scenario in SCENARIOS {
            assert_eq!(scenario.validate(), Ok(()), "scenario {}", scenario.id);
        }
    }

    #[test]
    fn test_default_scenario_exists() {
        assert!(get_scenario(presets::DEFAULT_SCENARIO).is_some());
        assert!(get_scenario("no_such_flight").is_none());
    }

    #[test]
    fn test_two_stage_world_is_stacked() {
        let scenario = get_scenario("boostback_landing").unwrap();
        let setup = build_world(scenario).unwrap();

        let booster = setup.world.body(setup.booster).unwrap().state;
        let ship = setup.world.body(setup.ship.unwrap()).unwrap().state;
        let b = scenario.booster;
        let s = scenario.ship.unwrap();
        assert_relative_eq!(booster.position.y, b.height / 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            ship.position.y - booster.position.y,
            (b.height + s.height) / 2.0,
            epsilon = 1e-12
        );
        assert!(setup.world.constraint(setup.joint.unwrap()).is_some());
    }

    #[test]
    fn test_single_stack_has_no_joint() {
        let setup = build_world(get_scenario("orbital_ascent").unwrap()).unwrap();
        assert!(setup.ship.is_none());
        assert!(setup.joint.is_none());
        // Pad, tower, vehicle
        assert_eq!(setup.world.body_count(), 3);
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let mut scenario = *get_scenario("hover_test").unwrap();
        scenario.dt = 0.0;
        assert!(scenario.validate().is_err());
    }
}
