//! Central gravity toward the planet center.

use bevy::math::DVec3;

use crate::types::Planet;

/// Distance (km) from the planet center below which gravity is softened.
///
/// Keeps the field finite if a body ever reaches the center.
pub const MIN_GRAVITY_DISTANCE_KM: f64 = 1.0;

/// Gravitational acceleration at a position, in km/s².
///
/// `a = -μ r̂ / r²` pointing at the planet center. Inside
/// [`MIN_GRAVITY_DISTANCE_KM`] the distance is clamped, so the magnitude
/// saturates instead of diverging.
#[inline]
pub fn gravity_acceleration(position: DVec3, planet: &Planet) -> DVec3 {
    let delta = planet.center - position;
    let r_squared = delta.length_squared();
    if r_squared == 0.0 || !r_squared.is_finite() {
        return DVec3::ZERO;
    }

    let r = r_squared.sqrt();
    let soft = r.max(MIN_GRAVITY_DISTANCE_KM);
    // delta / r is the unit vector toward the center
    delta * (planet.mu() / (soft * soft * r))
}

/// Weight of a mass at a position (kg·km/s²).
pub fn weight(mass: f64, position: DVec3, planet: &Planet) -> f64 {
    mass * gravity_acceleration(position, planet).length()
}
