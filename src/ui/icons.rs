//! Phosphor icon definitions for the UI.
//!
//! Icons are initialized via `setup_fonts` when the app starts.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::camera::CameraView;

/// Resource to track if fonts have been initialized.
#[derive(Resource, Default)]
pub struct FontsInitialized(pub bool);

/// System to initialize Phosphor icon fonts.
/// Runs in EguiPrimaryContextPass where the egui context is guaranteed to be ready.
pub fn setup_fonts(mut contexts: EguiContexts, mut initialized: ResMut<FontsInitialized>) {
    if initialized.0 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    ctx.set_fonts(fonts);
    initialized.0 = true;

    info!("Phosphor icon fonts initialized");
}

// Browse all icons at https://phosphoricons.com/

/// Start the flight clock
pub const PLAY: &str = egui_phosphor::regular::PLAY;
/// Stop the flight clock
pub const PAUSE: &str = egui_phosphor::regular::PAUSE;
/// Reload the scenario
pub const RESET: &str = egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE;
/// Wireframe toggle
pub const WIREFRAME: &str = egui_phosphor::regular::CUBE;
/// Telemetry header
pub const GAUGE: &str = egui_phosphor::regular::GAUGE;
/// Separation marker
pub const WARNING: &str = egui_phosphor::regular::WARNING;

/// Icon for a camera view.
pub fn view_icon(view: CameraView) -> &'static str {
    match view {
        CameraView::Booster => egui_phosphor::regular::ROCKET_LAUNCH,
        CameraView::Ship => egui_phosphor::regular::ROCKET,
        CameraView::Base => egui_phosphor::regular::MAP_PIN,
        CameraView::Tower => egui_phosphor::regular::EYE,
    }
}
