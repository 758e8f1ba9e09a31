//! Rigid lock constraints between two bodies.
//!
//! A locked child rides on its parent: its pose is recomputed from the
//! parent's after every step, and any force applied to it is moved onto
//! the parent before integration. Constraints are one level deep; a child
//! cannot itself be a parent.

use bevy::math::{DQuat, DVec3};

use crate::control::JointId;
use crate::types::VehicleState;

use super::BodyHandle;

/// A rigid joint holding `child` fixed in `parent`'s body frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LockConstraint {
    pub id: JointId,
    pub parent: BodyHandle,
    pub child: BodyHandle,
    /// Child center in the parent body frame (km)
    pub offset: DVec3,
    /// Child orientation relative to the parent
    pub relative_rotation: DQuat,
}

impl LockConstraint {
    /// Lock two bodies in their current relative pose.
    pub fn between(
        id: JointId,
        parent: BodyHandle,
        parent_state: &VehicleState,
        child: BodyHandle,
        child_state: &VehicleState,
    ) -> Self {
        let inv = parent_state.orientation.inverse();
        Self {
            id,
            parent,
            child,
            offset: inv * (child_state.position - parent_state.position),
            relative_rotation: (inv * child_state.orientation).normalize(),
        }
    }

    /// Child state implied by a parent state and angular velocity.
    ///
    /// Velocity includes the `ω × r` term so the child keeps the right
    /// momentum when the lock is later released.
    pub fn child_state(
        &self,
        parent: &VehicleState,
        parent_angular_velocity: DVec3,
        child_mass: f64,
    ) -> VehicleState {
        let lever = parent.orientation * self.offset;
        VehicleState {
            position: parent.position + lever,
            velocity: parent.velocity + parent_angular_velocity.cross(lever),
            orientation: (parent.orientation * self.relative_rotation).normalize(),
            mass: child_mass,
        }
    }

    /// Force and torque on the parent equivalent to a force/torque on the child.
    pub fn transfer_load(
        &self,
        parent: &VehicleState,
        child_force: DVec3,
        child_torque: DVec3,
    ) -> (DVec3, DVec3) {
        let lever = parent.orientation * self.offset;
        (child_force, child_torque + lever.cross(child_force))
    }
}

/// Mass and inertia of a parent with its locked children folded in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeMass {
    /// Total mass (kg)
    pub mass: f64,
    /// Scalar moment of inertia about the parent center (kg·km²)
    pub inertia: f64,
}

impl CompositeMass {
    pub fn new(mass: f64, inertia: f64) -> Self {
        Self { mass, inertia }
    }

    /// Fold in a rigidly attached body (parallel-axis theorem).
    pub fn attach(&mut self, mass: f64, inertia: f64, offset: DVec3) {
        self.mass += mass;
        self.inertia += inertia + mass * offset.length_squared();
    }
}
