//! Preset scenario definitions.
//!
//! Four flights, from a plain staged ascent up to a full boostback and
//! hover landing. All share the same controller, configured differently.

use bevy::math::DVec3;

use crate::camera::CameraView;
use crate::control::FlightControllerConfig;
use crate::control::boostback::BoostbackConfig;
use crate::control::hover::HoverConfig;
use crate::control::staging::SeparationTrigger;
use crate::control::thrust::StagedThrustConfig;

use super::{Scenario, VehicleSpec};

/// Scenario loaded when none is requested.
pub const DEFAULT_SCENARIO: &str = "boostback_landing";

/// Model scale that fits the vehicle glTF files to their physics bodies.
pub const MODEL_SCALE: f32 = 0.0045;

/// All available preset scenarios.
pub static SCENARIOS: &[Scenario] = &[ORBITAL_ASCENT, HOT_STAGING, BOOSTBACK_LANDING, HOVER_TEST];

/// Single 5000 t vehicle, no model.
const MONOLITH: VehicleSpec = VehicleSpec {
    mass: 5.0e6,
    radius: 0.01,
    height: 0.1,
    model: None,
};

/// 2000 t first stage
const BOOSTER: VehicleSpec = VehicleSpec {
    mass: 2.0e6,
    radius: 0.005,
    height: 0.07,
    model: Some("models/booster.glb"),
};

/// 2000 t upper stage
const SHIP: VehicleSpec = VehicleSpec {
    mass: 2.0e6,
    radius: 0.005,
    height: 0.05,
    model: Some("models/ship.glb"),
};

/// Scenario 1: Orbital Ascent
///
/// One rigid vehicle climbing under the staged-thrust table. Thrust steps
/// up with altitude until the speed cap drops it to a sustain level.
pub static ORBITAL_ASCENT: Scenario = Scenario {
    id: "orbital_ascent",
    name: "Orbital Ascent",
    description: "Single stack under altitude-banded thrust. No staging.",
    controller: FlightControllerConfig::ASCENT_ONLY,
    booster: MONOLITH,
    ship: None,
    start_altitude: 0.0,
    start_velocity: DVec3::ZERO,
    dt: 1.0,
    camera_view: CameraView::Booster,
};

/// Scenario 2: Hot Staging
///
/// Two stages separate once the burn-time budget runs out. The ship keeps
/// climbing; the booster falls back unpowered.
pub static HOT_STAGING: Scenario = Scenario {
    id: "hot_staging",
    name: "Hot Staging",
    description: "Stages part after 60 s of burn. Booster falls ballistic.",
    controller: FlightControllerConfig {
        ship: Some(StagedThrustConfig::ASCENT),
        separation: SeparationTrigger {
            altitude_km: None,
            burn_time: Some(60.0),
        },
        ..FlightControllerConfig::ASCENT_ONLY
    },
    booster: BOOSTER,
    ship: Some(SHIP),
    start_altitude: 0.0,
    start_velocity: DVec3::ZERO,
    dt: 0.1,
    camera_view: CameraView::Ship,
};

/// Scenario 3: Boostback Landing
///
/// Separation at 70 km, then the booster turns back toward the pad, burns,
/// and hands over to the hover loop on the way down.
pub static BOOSTBACK_LANDING: Scenario = Scenario {
    id: "boostback_landing",
    name: "Boostback Landing",
    description: "Separate at 70 km, boost back toward the pad and hover to land.",
    controller: FlightControllerConfig {
        ship: Some(StagedThrustConfig::ASCENT),
        separation: SeparationTrigger {
            altitude_km: Some(70.0),
            burn_time: None,
        },
        boostback: Some(BoostbackConfig::DEFAULT),
        hover: Some(HoverConfig::DEFAULT),
        ..FlightControllerConfig::ASCENT_ONLY
    },
    booster: BOOSTER,
    ship: Some(SHIP),
    start_altitude: 0.0,
    start_velocity: DVec3::ZERO,
    dt: 0.5,
    camera_view: CameraView::Booster,
};

/// Scenario 4: Hover Test
///
/// A lone booster dropped 5 km above the pad, drifting sideways. The hover
/// loop engages immediately and pulls it over the pad.
pub static HOVER_TEST: Scenario = Scenario {
    id: "hover_test",
    name: "Hover Test",
    description: "Lone booster 5 km up. Hover loop tracks the pad from the first tick.",
    controller: FlightControllerConfig {
        // Already past staging altitude, so the gate opens on the first tick
        separation: SeparationTrigger {
            altitude_km: Some(0.0),
            burn_time: None,
        },
        hover: Some(HoverConfig::DEFAULT),
        ..FlightControllerConfig::ASCENT_ONLY
    },
    booster: BOOSTER,
    ship: None,
    start_altitude: 5.0,
    start_velocity: DVec3::new(0.05, -0.1, 0.0),
    dt: 1.0 / 30.0,
    camera_view: CameraView::Base,
};
