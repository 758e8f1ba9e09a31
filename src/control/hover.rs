//! Terminal-descent hover controller.
//!
//! A proportional-derivative loop on altitude error and vertical velocity
//! sets the vertical thrust; a second PD loop on downrange offset and
//! lateral velocity steers toward the landing site, with a gain that
//! rises as the vehicle gets closer to the ground.

use bevy::math::DVec3;

use crate::control::thrust::ThrustCommand;
use crate::types::{Planet, VehicleState};

/// Altitude-scheduled lateral gains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LateralGains {
    /// Position gain at and above `far_altitude`
    pub k_far: f64,
    /// Position gain at and below `near_altitude`
    pub k_near: f64,
    /// Altitude (km) where the near gain takes over fully
    pub near_altitude: f64,
    /// Altitude (km) where the far gain applies fully
    pub far_altitude: f64,
    /// Lateral velocity damping gain
    pub kd: f64,
    /// Upper bound on lateral thrust magnitude
    pub max_thrust: f64,
}

impl LateralGains {
    pub const DEFAULT: LateralGains = LateralGains {
        k_far: 500.0,
        k_near: 2_000.0,
        near_altitude: 5.0,
        far_altitude: 60.0,
        kd: 50_000.0,
        max_thrust: 20_000.0,
    };

    /// Position gain scheduled by altitude, linear between the two altitudes.
    pub fn position_gain(&self, altitude_km: f64) -> f64 {
        if altitude_km <= self.near_altitude {
            return self.k_near;
        }
        if altitude_km >= self.far_altitude {
            return self.k_far;
        }
        let span = self.far_altitude - self.near_altitude;
        let s = (altitude_km - self.near_altitude) / span;
        self.k_near + (self.k_far - self.k_near) * s
    }

    /// Lateral thrust vector (world frame, horizontal).
    ///
    /// `-K(alt)·offset - Kd·lateral_velocity`, clamped in magnitude.
    pub fn correction(&self, altitude_km: f64, offset: DVec3, lateral_velocity: DVec3) -> DVec3 {
        let raw = -offset * self.position_gain(altitude_km) - lateral_velocity * self.kd;
        if !raw.is_finite() {
            return DVec3::ZERO;
        }
        raw.clamp_length_max(self.max_thrust)
    }
}

impl Default for LateralGains {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tuning for the hover/landing loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverConfig {
    /// Engage once separated and below this altitude (km)
    pub engage_altitude: f64,
    /// Altitude to hold (km)
    pub target_altitude: f64,
    /// Thrust with zero error, roughly the vehicle weight
    pub baseline: f64,
    /// Signed gain on `altitude - target`
    pub kp: f64,
    /// Signed gain on vertical velocity
    pub kd: f64,
    /// Lower clamp on vertical thrust
    pub min_thrust: f64,
    /// Upper clamp on vertical thrust
    pub max_thrust: f64,
    /// Lateral steering toward the landing site
    pub lateral: LateralGains,
    /// Engine-bell offset from the center of mass, body frame (km)
    pub application_point: DVec3,
}

impl HoverConfig {
    pub const DEFAULT: HoverConfig = HoverConfig {
        engage_altitude: 60.0,
        target_altitude: 0.1,
        // 2000 t booster at 0.00982 km/s²
        baseline: 19_640.0,
        // Overdamped; a 10 m/s sink moves thrust under 5% off baseline
        kp: -1_000.0,
        kd: -90_000.0,
        min_thrust: 0.0,
        max_thrust: 80_000.0,
        lateral: LateralGains::DEFAULT,
        // Through the center of mass, so lateral steering adds no torque
        application_point: DVec3::ZERO,
    };
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl HoverConfig {
    /// Clamped vertical thrust for the given altitude and climb rate.
    ///
    /// Infinite errors saturate at the matching bound. When the two terms
    /// cancel into an undefined value the engine idles at `min_thrust`.
    pub fn vertical_thrust(&self, altitude_km: f64, vertical_velocity: f64) -> f64 {
        let p = self.kp * (altitude_km - self.target_altitude);
        let d = self.kd * vertical_velocity;
        let raw = self.baseline + p + d;
        if raw.is_nan() {
            return self.min_thrust;
        }
        raw.clamp(self.min_thrust, self.max_thrust)
    }

    /// Full hover command in the vehicle body frame.
    ///
    /// Vertical thrust acts along local up, lateral thrust along the horizontal
    /// offset from the landing site. Returns `None` when local up is undefined.
    pub fn command(
        &self,
        state: &VehicleState,
        planet: &Planet,
        landing_site: DVec3,
    ) -> Option<ThrustCommand> {
        let up = planet.up_at(state.position)?;
        let altitude = planet.altitude(state.position);

        let vertical = self.vertical_thrust(altitude, state.velocity.dot(up));

        let to_vehicle = state.position - landing_site;
        let offset = to_vehicle - up * to_vehicle.dot(up);
        let lateral = self
            .lateral
            .correction(altitude, offset, state.horizontal_velocity(planet));

        let world_force = up * vertical + lateral;
        Some(ThrustCommand {
            force: state.orientation.inverse() * world_force,
            point: self.application_point,
        })
    }
}
