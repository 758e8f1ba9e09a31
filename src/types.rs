//! Core physical types and constants for the launch simulation.
//!
//! Units follow the scene scale: kilometers, kilometers per second,
//! kilograms, and forces in kg·km/s².

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;

/// System sets ordering the fixed-timestep flight pipeline.
///
/// Control must read vehicle state and submit forces before the physics
/// step consumes them.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlightSystemSet {
    /// Flight controller tick (reads state, writes forces).
    Control,
    /// Rigid-body integration.
    Physics,
}

/// Gravitational constant in km³·kg⁻¹·s⁻²
pub const G_KM: f64 = 6.6743e-20;

/// Earth mass in kilograms
pub const EARTH_MASS_KG: f64 = 5.972e24;

/// Earth mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Smallest vector length that is still normalized.
///
/// Anything shorter is treated as having no direction.
pub const MIN_DIRECTION_NORM: f64 = 1e-9;

/// Vehicle body axis along which main-engine thrust acts.
pub const BODY_FORWARD: DVec3 = DVec3::Y;

/// Vehicle body axis used for lateral (roll) corrections.
pub const BODY_LATERAL: DVec3 = DVec3::X;

/// Normalize a vector, or `None` if it is too short to carry a direction.
#[inline]
pub fn safe_normalize(v: DVec3) -> Option<DVec3> {
    let len = v.length();
    if len.is_finite() && len > MIN_DIRECTION_NORM {
        Some(v / len)
    } else {
        None
    }
}

/// A spherical planet the vehicles launch from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Planet {
    /// Center position in km. The launch pad sits at the world origin,
    /// so the center is one radius below it.
    pub center: DVec3,
    /// Radius in km
    pub radius: f64,
    /// Mass in kg
    pub mass: f64,
}

impl Planet {
    /// Earth with the launch pad at the world origin.
    pub const EARTH: Planet = Planet {
        center: DVec3::new(0.0, -EARTH_RADIUS_KM, 0.0),
        radius: EARTH_RADIUS_KM,
        mass: EARTH_MASS_KG,
    };

    /// Standard gravitational parameter (km³/s²)
    pub fn mu(&self) -> f64 {
        G_KM * self.mass
    }

    /// Altitude above the surface in km (negative below it).
    ///
    /// Always derived from the current position; never cache it.
    #[inline]
    pub fn altitude(&self, position: DVec3) -> f64 {
        (position - self.center).length() - self.radius
    }

    /// Local "up" unit vector at a position, if the position is not at the center.
    #[inline]
    pub fn up_at(&self, position: DVec3) -> Option<DVec3> {
        safe_normalize(position - self.center)
    }

    /// Horizontal distance (km) between a position and a ground point,
    /// measured perpendicular to local up at the position.
    pub fn downrange(&self, position: DVec3, site: DVec3) -> f64 {
        let Some(up) = self.up_at(position) else {
            return 0.0;
        };
        let d = position - site;
        (d - up * d.dot(up)).length()
    }
}

impl Default for Planet {
    fn default() -> Self {
        Self::EARTH
    }
}

/// Kinematic state of one vehicle body as seen by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    /// Position in km
    pub position: DVec3,
    /// Velocity in km/s
    pub velocity: DVec3,
    /// Body-to-world rotation
    pub orientation: DQuat,
    /// Mass in kg
    pub mass: f64,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            mass: 1.0,
        }
    }
}

impl VehicleState {
    /// Create a vehicle state at rest with identity orientation.
    pub fn at_rest(position: DVec3, mass: f64) -> Self {
        Self {
            position,
            mass,
            ..Default::default()
        }
    }

    /// Speed in km/s
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Body forward axis expressed in the world frame.
    pub fn forward(&self) -> DVec3 {
        self.orientation * BODY_FORWARD
    }

    /// Velocity component along local up (positive when climbing).
    pub fn vertical_velocity(&self, planet: &Planet) -> f64 {
        planet
            .up_at(self.position)
            .map_or(0.0, |up| self.velocity.dot(up))
    }

    /// Velocity with the vertical component removed.
    pub fn horizontal_velocity(&self, planet: &Planet) -> DVec3 {
        match planet.up_at(self.position) {
            Some(up) => self.velocity - up * self.velocity.dot(up),
            None => self.velocity,
        }
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.orientation.is_finite()
            && self.mass.is_finite()
    }
}
