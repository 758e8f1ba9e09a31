//! Boostback - Launch, Staging and Landing Simulator
//!
//! A desktop application flying a two-stage rocket through ascent, stage
//! separation, boostback and a hover landing.
//!
//! Usage: `boostback [scenario_id]`

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use boostback::camera::CameraPlugin;
use boostback::clock::ClockPlugin;
use boostback::flight::FlightPlugin;
use boostback::input::InputPlugin;
use boostback::physics::PhysicsPlugin;
use boostback::render::RenderPlugin;
use boostback::ui::UiPlugin;

fn main() {
    let initial_scenario = std::env::args().nth(1);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Boostback".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        // Clock and physics before flight: flight systems are ordered against their sets
        .add_plugins((ClockPlugin, PhysicsPlugin))
        .add_plugins(FlightPlugin { initial_scenario })
        .add_plugins((CameraPlugin, RenderPlugin, InputPlugin, UiPlugin))
        .run();
}
