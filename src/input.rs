//! Keyboard shortcuts.
//!
//! Space starts/stops the flight, 1-4 pick the camera view, G toggles the
//! collision wireframes, R reloads the scenario, +/- zoom. The arrow keys
//! nudge the ship around for debugging.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::camera::{CameraState, CameraView, MAX_ZOOM, MIN_ZOOM, ZOOM_SPEED};
use crate::clock::FlightClock;
use crate::flight::FlightVehicles;
use crate::physics::PhysicsWorld;
use crate::render::DebugDraw;
use crate::scenarios::{CurrentScenario, LoadScenario};

/// Plugin providing keyboard input handling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, keyboard_shortcuts);
    }
}

/// Camera view bound to a number key.
pub fn view_for_key(key: KeyCode) -> Option<CameraView> {
    match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(CameraView::Booster),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(CameraView::Ship),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(CameraView::Base),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(CameraView::Tower),
        _ => None,
    }
}

/// Ship displacement per arrow press (km)
pub const NUDGE_STEP_KM: f64 = 0.1;

/// Ship nudge bound to an arrow key.
pub fn nudge_for_key(key: KeyCode) -> Option<DVec3> {
    match key {
        KeyCode::ArrowUp => Some(DVec3::Y * NUDGE_STEP_KM),
        KeyCode::ArrowDown => Some(DVec3::NEG_Y * NUDGE_STEP_KM),
        KeyCode::ArrowLeft => Some(DVec3::NEG_X * NUDGE_STEP_KM),
        KeyCode::ArrowRight => Some(DVec3::X * NUDGE_STEP_KM),
        _ => None,
    }
}

/// Handle keyboard shortcuts for flight control.
fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut clock: ResMut<FlightClock>,
    mut camera: ResMut<CameraState>,
    mut debug: ResMut<DebugDraw>,
    current: Res<CurrentScenario>,
    mut load: MessageWriter<LoadScenario>,
    world: Option<ResMut<PhysicsWorld>>,
    vehicles: Option<Res<FlightVehicles>>,
) {
    // Space: start / stop
    if keys.just_pressed(KeyCode::Space) {
        clock.toggle();
    }

    if let Some(view) = keys.get_just_pressed().find_map(|key| view_for_key(*key)) {
        camera.view = view;
        info!("Camera view: {}", view.label());
    }

    if keys.just_pressed(KeyCode::KeyG) {
        debug.toggle();
    }

    // R: reload the current scenario from scratch
    if keys.just_pressed(KeyCode::KeyR) {
        load.write(LoadScenario {
            scenario_id: current.id,
        });
    }

    let offset: DVec3 = keys.get_just_pressed().filter_map(|key| nudge_for_key(*key)).sum();
    if offset != DVec3::ZERO
        && let (Some(mut world), Some(ship)) = (world, vehicles.and_then(|v| v.ship))
        && let Err(err) = world.nudge(ship, offset)
    {
        warn!("Ship nudge failed: {err}");
    }

    // Plus/Equal: zoom in
    if keys.pressed(KeyCode::Equal) || keys.pressed(KeyCode::NumpadAdd) {
        camera.zoom = (camera.zoom * (1.0 - ZOOM_SPEED)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    // Minus: zoom out
    if keys.pressed(KeyCode::Minus) || keys.pressed(KeyCode::NumpadSubtract) {
        camera.zoom = (camera.zoom * (1.0 + ZOOM_SPEED)).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
