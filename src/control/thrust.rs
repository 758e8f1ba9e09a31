//! Altitude-gated staged-thrust controller.
//!
//! Produces a body-frame thrust vector from altitude and speed:
//! - a base thrust picked from an altitude band table
//! - a proportional roll correction on the lateral axis outside a deadband
//! - a constant assist below a speed floor, or a minimal sustain thrust above a cap

use bevy::math::DVec3;

use crate::types::{
    BODY_FORWARD, BODY_LATERAL, Planet, RAD_TO_DEG, VehicleState, safe_normalize,
};

/// Number of altitude bands in a thrust table.
pub const BAND_COUNT: usize = 4;

/// One row of the altitude thrust table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrustBand {
    /// Band applies while altitude (km) is strictly below this value.
    /// The last band must be open-ended (`f64::INFINITY`).
    pub ceiling_km: f64,
    /// Base thrust along the body axis (kg·km/s²)
    pub thrust: f64,
}

/// Altitude thrust table, evaluated low-to-high; the first band matched wins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrustTable {
    pub bands: [ThrustBand; BAND_COUNT],
}

impl ThrustTable {
    /// Index of the band an altitude falls in.
    pub fn band_index(&self, altitude_km: f64) -> usize {
        self.bands
            .iter()
            .position(|band| altitude_km < band.ceiling_km)
            .unwrap_or(BAND_COUNT - 1)
    }

    /// Base thrust for an altitude.
    #[inline]
    pub fn base_thrust(&self, altitude_km: f64) -> f64 {
        self.bands[self.band_index(altitude_km)].thrust
    }
}

/// A force to submit to the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrustCommand {
    /// Force in the vehicle body frame (kg·km/s²)
    pub force: DVec3,
    /// Application point in the vehicle body frame (km)
    pub point: DVec3,
}

impl ThrustCommand {
    /// Force expressed in the world frame for a given body orientation.
    pub fn world_force(&self, orientation: bevy::math::DQuat) -> DVec3 {
        orientation * self.force
    }

    /// Thrust magnitude.
    pub fn magnitude(&self) -> f64 {
        self.force.length()
    }
}

/// Tuning for the staged-thrust controller.
///
/// All values are per-scenario tuning constants rather than derived quantities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StagedThrustConfig {
    /// Base thrust by altitude band
    pub table: ThrustTable,
    /// Roll errors with magnitude at or below this (degrees) get no correction
    pub roll_deadband_deg: f64,
    /// Lateral thrust per degree of roll error
    pub roll_gain: f64,
    /// Below this speed (km/s) the assist thrust is added
    pub assist_below_speed: f64,
    /// Extra thrust along the body axis while under the speed floor
    pub assist_thrust: f64,
    /// Above this speed (km/s) total thrust is overridden by the sustain value
    pub sustain_above_speed: f64,
    /// Thrust used once above the speed cap
    pub sustain_thrust: f64,
    /// Engine-bell offset from the center of mass, body frame (km)
    pub application_point: DVec3,
}

impl StagedThrustConfig {
    /// Tuning of the single-stack orbital ascent.
    pub const ASCENT: StagedThrustConfig = StagedThrustConfig {
        table: ThrustTable {
            bands: [
                ThrustBand { ceiling_km: 80.0, thrust: 80_000.0 },
                ThrustBand { ceiling_km: 200.0, thrust: 250_000.0 },
                ThrustBand { ceiling_km: 400.0, thrust: 350_000.0 },
                ThrustBand { ceiling_km: f64::INFINITY, thrust: 200_000.0 },
            ],
        },
        roll_deadband_deg: 5.0,
        roll_gain: 0.007,
        assist_below_speed: 7.0,
        assist_thrust: 10_000.0,
        sustain_above_speed: 9.0,
        sustain_thrust: 10_000.0,
        application_point: DVec3::new(0.0, -0.05, 0.0),
    };

    /// Lateral roll correction for a given roll error (degrees).
    ///
    /// Zero inside the deadband (boundary inclusive), linear outside it.
    #[inline]
    pub fn roll_correction(&self, roll_error_deg: f64) -> f64 {
        if roll_error_deg.abs() > self.roll_deadband_deg {
            roll_error_deg * self.roll_gain
        } else {
            0.0
        }
    }

    /// Compute the thrust command for the current tick.
    ///
    /// Returns `None` when altitude or speed is not finite. A non-finite roll
    /// error is treated as unknown and contributes no correction.
    pub fn command(
        &self,
        altitude_km: f64,
        speed_km_s: f64,
        roll_error_deg: Option<f64>,
    ) -> Option<ThrustCommand> {
        if !altitude_km.is_finite() || !speed_km_s.is_finite() {
            return None;
        }

        let mut force = BODY_FORWARD * self.table.base_thrust(altitude_km);

        if let Some(roll) = roll_error_deg.filter(|r| r.is_finite()) {
            force += BODY_LATERAL * self.roll_correction(roll);
        }

        if speed_km_s < self.assist_below_speed {
            force += BODY_FORWARD * self.assist_thrust;
        } else if speed_km_s > self.sustain_above_speed {
            // Overrides everything above, roll term included
            force = BODY_FORWARD * self.sustain_thrust;
        }

        Some(ThrustCommand {
            force,
            point: self.application_point,
        })
    }

    /// Convenience wrapper reading altitude, speed and roll error from a state.
    pub fn command_for(&self, state: &VehicleState, planet: &Planet) -> Option<ThrustCommand> {
        self.command(
            planet.altitude(state.position),
            state.speed(),
            roll_error_deg(state, planet),
        )
    }
}

impl Default for StagedThrustConfig {
    fn default() -> Self {
        Self::ASCENT
    }
}

/// Deviation (degrees) of the body axis from the local horizontal.
///
/// Computed as 90° minus the angle between the body forward axis and the
/// radial direction: 90° when pointing straight up, 0° when flying level.
/// `None` if either direction is degenerate.
pub fn roll_error_deg(state: &VehicleState, planet: &Planet) -> Option<f64> {
    let radial = planet.up_at(state.position)?;
    let forward = safe_normalize(state.forward())?;
    let angle_to_radial = forward.dot(radial).clamp(-1.0, 1.0).acos() * RAD_TO_DEG;
    Some(90.0 - angle_to_radial)
}
