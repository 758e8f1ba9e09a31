//! Boostback reorientation and burn.
//!
//! After separation the booster turns toward a blend of "back toward the
//! landing site" and "local up", then fires a fixed retrograde burn for a
//! capped duration. The turn is a spherical interpolation between the
//! attitude at the start of the turn and a target frozen at that moment.

use bevy::math::{DQuat, DVec3};

use crate::control::thrust::ThrustCommand;
use crate::types::{BODY_FORWARD, Planet, VehicleState, safe_normalize};

/// Tuning for the boostback maneuver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostbackConfig {
    /// Weight of the horizontal toward-site direction in the target blend
    pub retrograde_weight: f64,
    /// Weight of local up in the target blend
    pub up_weight: f64,
    /// Interpolation advance per tick, in (0, 1]
    pub slerp_increment: f64,
    /// Burn thrust along the body axis (kg·km/s²)
    pub burn_thrust: f64,
    /// Total burn duration in simulated time units
    pub burn_budget: f64,
    /// Engine-bell offset from the center of mass, body frame (km)
    pub application_point: DVec3,
}

impl BoostbackConfig {
    pub const DEFAULT: BoostbackConfig = BoostbackConfig {
        retrograde_weight: 0.7,
        up_weight: 0.3,
        slerp_increment: 0.01,
        burn_thrust: 60_000.0,
        burn_budget: 40.0,
        application_point: DVec3::new(0.0, -0.035, 0.0),
    };
}

impl Default for BoostbackConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Progress of the boostback maneuver.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoostbackState {
    /// Interpolation parameter. Non-decreasing, clamped to 1.
    pub t: f64,
    /// Attitude captured when the turn began
    pub start: Option<DQuat>,
    /// Target attitude captured when the turn began
    pub target: Option<DQuat>,
    /// Accumulated burn time
    pub burn_elapsed: f64,
}

impl BoostbackState {
    /// Whether the turn has finished.
    pub fn is_reoriented(&self) -> bool {
        self.t >= 1.0
    }

    /// Whether the burn budget is spent.
    pub fn is_burn_complete(&self, config: &BoostbackConfig) -> bool {
        self.burn_elapsed >= config.burn_budget
    }
}

/// Direction the booster's body axis should point for the boostback burn.
///
/// Blends the horizontal direction toward the landing site with local up.
/// When the booster is directly above the site, the horizontal retrograde
/// direction is used instead; when that is degenerate too, local up alone.
/// `None` only if local up itself is undefined.
pub fn target_direction(
    config: &BoostbackConfig,
    state: &VehicleState,
    planet: &Planet,
    landing_site: DVec3,
) -> Option<DVec3> {
    let up = planet.up_at(state.position)?;

    let to_site = landing_site - state.position;
    let horizontal = safe_normalize(to_site - up * to_site.dot(up))
        .or_else(|| safe_normalize(-state.horizontal_velocity(planet)));

    match horizontal {
        Some(h) => safe_normalize(h * config.retrograde_weight + up * config.up_weight).or(Some(up)),
        None => Some(up),
    }
}

/// Shortest-arc rotation taking the body forward axis onto `direction`.
///
/// `direction` must be a unit vector.
pub fn target_orientation(direction: DVec3) -> DQuat {
    DQuat::from_rotation_arc(BODY_FORWARD, direction)
}

/// Advance the reorientation by one tick.
///
/// Returns the commanded attitude while turning (including the tick that
/// reaches `t == 1`), `None` once the turn is complete.
pub fn reorient_step(
    config: &BoostbackConfig,
    progress: &mut BoostbackState,
    state: &VehicleState,
    planet: &Planet,
    landing_site: DVec3,
) -> Option<DQuat> {
    if progress.is_reoriented() {
        return None;
    }

    let start = *progress.start.get_or_insert(state.orientation);
    let target = *progress.target.get_or_insert_with(|| {
        target_direction(config, state, planet, landing_site)
            .map(target_orientation)
            .unwrap_or(start)
    });

    progress.t = (progress.t + config.slerp_increment).min(1.0);
    Some(start.slerp(target, progress.t).normalize())
}

/// Advance the boostback burn by one tick.
///
/// Fires only after the turn is complete and until the budget is spent.
pub fn burn_step(
    config: &BoostbackConfig,
    progress: &mut BoostbackState,
    dt: f64,
) -> Option<ThrustCommand> {
    if !progress.is_reoriented() || progress.is_burn_complete(config) {
        return None;
    }
    progress.burn_elapsed = (progress.burn_elapsed + dt).min(config.burn_budget);
    Some(ThrustCommand {
        force: BODY_FORWARD * config.burn_thrust,
        point: config.application_point,
    })
}
