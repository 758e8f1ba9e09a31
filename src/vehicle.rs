//! Vehicle identity and the read/write interface the controller talks through.
//!
//! The controller never touches the physics world directly. It reads a
//! [`VehicleState`] snapshot at the start of a tick and submits forces
//! through [`VehicleBody`], which lets the control logic run against a
//! test double as easily as against the live world.

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;

use crate::types::VehicleState;

/// Which part of the launch stack a body represents.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleRole {
    /// First stage. Carries the stack during ascent, then flies back.
    Booster,
    /// Upper stage. Continues the ascent after separation.
    Ship,
}

impl VehicleRole {
    /// Display label for telemetry.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleRole::Booster => "Booster",
            VehicleRole::Ship => "Ship",
        }
    }
}

/// Minimal read/write access to a simulated vehicle.
pub trait VehicleBody {
    /// Position in km
    fn position(&self) -> DVec3;

    /// Velocity in km/s
    fn velocity(&self) -> DVec3;

    /// Body-to-world rotation
    fn orientation(&self) -> DQuat;

    /// Mass in kg
    fn mass(&self) -> f64;

    /// Apply a force given in the body frame at a body-frame point.
    ///
    /// The force is accumulated until the next physics step.
    fn apply_local_force(&mut self, force: DVec3, point: DVec3);

    /// Overwrite the body orientation (kinematic attitude command).
    fn set_orientation(&mut self, orientation: DQuat);

    /// Snapshot of the current state.
    fn snapshot(&self) -> VehicleState {
        VehicleState {
            position: self.position(),
            velocity: self.velocity(),
            orientation: self.orientation(),
            mass: self.mass(),
        }
    }
}

/// A detached vehicle that records what the controller asked of it.
///
/// Used wherever control output needs to be inspected without a world.
#[derive(Clone, Debug, Default)]
pub struct RecordingVehicle {
    /// State reported to the controller
    pub state: VehicleState,
    /// Every `(force, point)` pair submitted, in order
    pub forces: Vec<(DVec3, DVec3)>,
}

impl RecordingVehicle {
    /// Create a recorder reporting the given state.
    pub fn new(state: VehicleState) -> Self {
        Self {
            state,
            forces: Vec::new(),
        }
    }

    /// Sum of all recorded body-frame forces.
    pub fn total_force(&self) -> DVec3 {
        self.forces.iter().map(|(f, _)| *f).sum()
    }
}

impl VehicleBody for RecordingVehicle {
    fn position(&self) -> DVec3 {
        self.state.position
    }

    fn velocity(&self) -> DVec3 {
        self.state.velocity
    }

    fn orientation(&self) -> DQuat {
        self.state.orientation
    }

    fn mass(&self) -> f64 {
        self.state.mass
    }

    fn apply_local_force(&mut self, force: DVec3, point: DVec3) {
        self.forces.push((force, point));
    }

    fn set_orientation(&mut self, orientation: DQuat) {
        self.state.orientation = orientation;
    }
}
