//! Fixed-step rigid-body integration.
//!
//! Semi-implicit (symplectic) Euler: velocities are updated from the
//! current accelerations first, then positions from the new velocities.
//! Stable for the short fixed steps the flight loop runs at, and cheap
//! enough to keep every tick deterministic.

use bevy::math::{DQuat, DVec3};

use crate::types::{Planet, VehicleState};

/// Advance linear motion by one step.
#[inline]
pub fn integrate_linear(state: &mut VehicleState, acceleration: DVec3, dt: f64) {
    state.velocity += acceleration * dt;
    state.position += state.velocity * dt;
}

/// Advance angular motion by one step.
///
/// Angular velocity is in world frame (rad/s). The orientation is rotated
/// by the axis-angle `ω·dt` and renormalized.
#[inline]
pub fn integrate_angular(
    orientation: DQuat,
    angular_velocity: &mut DVec3,
    angular_acceleration: DVec3,
    dt: f64,
) -> DQuat {
    *angular_velocity += angular_acceleration * dt;
    let delta = *angular_velocity * dt;
    if delta.length_squared() == 0.0 {
        return orientation;
    }
    (DQuat::from_scaled_axis(delta) * orientation).normalize()
}

/// Keep a body from sinking into the planet.
///
/// If the body's center is closer than `clearance` to the surface it is
/// moved back out along local up, and any inward velocity is removed.
/// Returns whether a correction was applied.
pub fn project_to_surface(state: &mut VehicleState, planet: &Planet, clearance: f64) -> bool {
    let Some(up) = planet.up_at(state.position) else {
        return false;
    };
    if planet.altitude(state.position) >= clearance {
        return false;
    }

    state.position = planet.center + up * (planet.radius + clearance);
    let inward = state.velocity.dot(up);
    if inward < 0.0 {
        state.velocity -= up * inward;
    }
    true
}
