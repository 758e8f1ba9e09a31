//! Flight controller configuration and validation.

use bevy::math::DVec3;

use crate::control::boostback::BoostbackConfig;
use crate::control::hover::HoverConfig;
use crate::control::staging::SeparationTrigger;
use crate::control::thrust::{BAND_COUNT, StagedThrustConfig};
use crate::types::Planet;

/// Everything that parameterizes one flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightControllerConfig {
    /// Planet the flight launches from
    pub planet: Planet,
    /// Landing site for the booster (km, world frame)
    pub landing_site: DVec3,
    /// Staged thrust applied to the stack while attached
    pub ascent: StagedThrustConfig,
    /// Staged thrust applied to the ship after separation (`None` = coast)
    pub ship: Option<StagedThrustConfig>,
    /// When to separate
    pub separation: SeparationTrigger,
    /// Boostback maneuver after separation (`None` = booster falls ballistic)
    pub boostback: Option<BoostbackConfig>,
    /// Terminal hover loop (`None` = no landing attempt)
    pub hover: Option<HoverConfig>,
}

impl FlightControllerConfig {
    /// Single-stack ascent with nothing after it.
    pub const ASCENT_ONLY: FlightControllerConfig = FlightControllerConfig {
        planet: Planet::EARTH,
        landing_site: DVec3::ZERO,
        ascent: StagedThrustConfig::ASCENT,
        ship: None,
        separation: SeparationTrigger::NEVER,
        boostback: None,
        hover: None,
    };
}

impl Default for FlightControllerConfig {
    fn default() -> Self {
        Self::ASCENT_ONLY
    }
}

/// Invalid controller configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("thrust band {index} ceiling {ceiling} km is not above the previous ceiling {previous} km")]
    BandsNotAscending {
        index: usize,
        previous: f64,
        ceiling: f64,
    },

    #[error("last thrust band must be open-ended (ceiling {0} km)")]
    LastBandClosed(f64),

    #[error("min thrust {min} exceeds max thrust {max}")]
    ThrustBounds { min: f64, max: f64 },

    #[error("slerp increment {0} must be in (0, 1]")]
    SlerpIncrement(f64),

    #[error("boostback blend weights cannot both be zero")]
    ZeroBlend,

    #[error("lateral gain altitudes out of order (near {near} km, far {far} km)")]
    LateralSchedule { near: f64, far: f64 },

    #[error("planet radius and mass must be positive")]
    Planet,
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if finite(field, value)? < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(value)
}

fn finite_vec(field: &'static str, v: DVec3) -> Result<(), ConfigError> {
    for c in v.to_array() {
        finite(field, c)?;
    }
    Ok(())
}

impl StagedThrustConfig {
    /// Check table ordering and tuning values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bands = &self.table.bands;
        for (i, band) in bands.iter().enumerate() {
            finite("thrust band value", band.thrust)?;
            if i + 1 < BAND_COUNT {
                finite("thrust band ceiling", band.ceiling_km)?;
            }
            if i > 0 && band.ceiling_km <= bands[i - 1].ceiling_km {
                return Err(ConfigError::BandsNotAscending {
                    index: i,
                    previous: bands[i - 1].ceiling_km,
                    ceiling: band.ceiling_km,
                });
            }
        }
        let last = bands[BAND_COUNT - 1].ceiling_km;
        if last != f64::INFINITY {
            return Err(ConfigError::LastBandClosed(last));
        }

        non_negative("roll deadband", self.roll_deadband_deg)?;
        finite("roll gain", self.roll_gain)?;
        non_negative("assist speed", self.assist_below_speed)?;
        finite("assist thrust", self.assist_thrust)?;
        non_negative("sustain speed", self.sustain_above_speed)?;
        finite("sustain thrust", self.sustain_thrust)?;
        finite_vec("thrust application point", self.application_point)
    }
}

impl BoostbackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retrograde = non_negative("retrograde weight", self.retrograde_weight)?;
        let up = non_negative("up weight", self.up_weight)?;
        if retrograde == 0.0 && up == 0.0 {
            return Err(ConfigError::ZeroBlend);
        }
        let inc = self.slerp_increment;
        if !(inc > 0.0 && inc <= 1.0) {
            return Err(ConfigError::SlerpIncrement(inc));
        }
        finite("burn thrust", self.burn_thrust)?;
        non_negative("burn budget", self.burn_budget)?;
        finite_vec("boostback application point", self.application_point)
    }
}

impl HoverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("hover engage altitude", self.engage_altitude)?;
        finite("hover target altitude", self.target_altitude)?;
        finite("hover baseline", self.baseline)?;
        finite("hover kp", self.kp)?;
        finite("hover kd", self.kd)?;
        let min = finite("hover min thrust", self.min_thrust)?;
        let max = finite("hover max thrust", self.max_thrust)?;
        if min > max {
            return Err(ConfigError::ThrustBounds { min, max });
        }

        let lat = &self.lateral;
        finite("lateral k_far", lat.k_far)?;
        finite("lateral k_near", lat.k_near)?;
        finite("lateral kd", lat.kd)?;
        non_negative("lateral max thrust", lat.max_thrust)?;
        let near = finite("lateral near altitude", lat.near_altitude)?;
        let far = finite("lateral far altitude", lat.far_altitude)?;
        if near >= far {
            return Err(ConfigError::LateralSchedule { near, far });
        }
        finite_vec("hover application point", self.application_point)
    }
}

impl FlightControllerConfig {
    /// Validate every enabled part of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.planet.radius > 0.0 && self.planet.mass > 0.0) {
            return Err(ConfigError::Planet);
        }
        finite_vec("planet center", self.planet.center)?;
        finite_vec("landing site", self.landing_site)?;

        self.ascent.validate()?;
        if let Some(ship) = &self.ship {
            ship.validate()?;
        }
        if let Some(alt) = self.separation.altitude_km {
            finite("separation altitude", alt)?;
        }
        if let Some(t) = self.separation.burn_time {
            non_negative("separation burn time", t)?;
        }
        if let Some(boostback) = &self.boostback {
            boostback.validate()?;
        }
        if let Some(hover) = &self.hover {
            hover.validate()?;
        }
        Ok(())
    }
}
