//! Flight control panel on the left edge of the screen.
//!
//! Holds the start/stop and reload buttons, the scenario selector, the
//! camera view buttons and a telemetry readout.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::camera::{CameraState, CameraView};
use crate::clock::FlightClock;
use crate::flight::FlightTelemetry;
use crate::render::DebugDraw;
use crate::scenarios::{CurrentScenario, LoadScenario, SCENARIOS, get_scenario};

use super::icons;

/// Colors for the panel.
mod colors {
    use bevy_egui::egui::Color32;

    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(26, 26, 36, 235);
    pub const PLAY_ICON: Color32 = Color32::from_rgb(85, 221, 136);
    pub const PAUSE_ICON: Color32 = Color32::from_rgb(221, 170, 85);
    pub const LABEL: Color32 = Color32::from_rgb(160, 160, 170);
    pub const VALUE: Color32 = Color32::from_rgb(220, 220, 230);
    pub const SEPARATION: Color32 = Color32::from_rgb(255, 180, 100);
}

/// Altitude or distance, in meters below one kilometer.
pub fn format_distance(km: f64) -> String {
    if km.abs() < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.2} km", km)
    }
}

/// Speed in m/s.
pub fn format_speed(km_s: f64) -> String {
    format!("{:.0} m/s", km_s * 1000.0)
}

/// Thrust in kilonewtons (input in kg·km/s²).
pub fn format_thrust(force: f64) -> String {
    if force == 0.0 {
        "off".to_string()
    } else {
        format!("{:.0} kN", force)
    }
}

/// Label / value rows for the telemetry grid.
pub fn telemetry_rows(telemetry: &FlightTelemetry, elapsed: f64) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("T+", format!("{:.1} s", elapsed)),
        ("Phase", telemetry.phase.label().to_string()),
        ("Altitude", format_distance(telemetry.altitude)),
        ("Speed", format_speed(telemetry.speed)),
        ("Climb", format_speed(telemetry.vertical_speed)),
        ("Downrange", format_distance(telemetry.downrange)),
        ("Thrust", format_thrust(telemetry.thrust)),
    ];
    if let Some(altitude) = telemetry.ship_altitude {
        rows.push(("Ship altitude", format_distance(altitude)));
    }
    if let Some(speed) = telemetry.ship_speed {
        rows.push(("Ship speed", format_speed(speed)));
    }
    rows
}

/// System that renders the control panel.
#[allow(clippy::too_many_arguments)]
pub fn control_panel_system(
    mut contexts: EguiContexts,
    mut clock: ResMut<FlightClock>,
    mut camera: ResMut<CameraState>,
    mut debug: ResMut<DebugDraw>,
    current: Res<CurrentScenario>,
    telemetry: Res<FlightTelemetry>,
    mut load: MessageWriter<LoadScenario>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("flight_panel")
        .resizable(false)
        .exact_width(240.0)
        .frame(
            egui::Frame::NONE
                .fill(colors::PANEL_BG)
                .inner_margin(egui::Margin::symmetric(14, 12)),
        )
        .show(ctx, |ui| {
            render_scenario_selector(ui, &current, &mut load);
            ui.separator();

            ui.horizontal(|ui| {
                render_start_stop(ui, &mut clock);
                if ui
                    .button(egui::RichText::new(icons::RESET).size(20.0))
                    .on_hover_text("Reload scenario (R)")
                    .clicked()
                {
                    load.write(LoadScenario {
                        scenario_id: current.id,
                    });
                }
                let wire = ui
                    .selectable_label(debug.enabled, egui::RichText::new(icons::WIREFRAME).size(20.0))
                    .on_hover_text("Collision wireframes (G)");
                if wire.clicked() {
                    debug.toggle();
                }
            });
            ui.separator();

            render_view_buttons(ui, &mut camera);
            ui.separator();

            render_telemetry(ui, &telemetry, clock.elapsed);
        });
}

fn render_scenario_selector(
    ui: &mut egui::Ui,
    current: &CurrentScenario,
    load: &mut MessageWriter<LoadScenario>,
) {
    let current_name = get_scenario(current.id).map_or(current.id, |s| s.name);
    egui::ComboBox::from_id_salt("scenario_selector")
        .selected_text(current_name)
        .width(200.0)
        .show_ui(ui, |ui| {
            for scenario in SCENARIOS {
                let selected = scenario.id == current.id;
                if ui
                    .selectable_label(selected, scenario.name)
                    .on_hover_text(scenario.description)
                    .clicked()
                    && !selected
                {
                    load.write(LoadScenario {
                        scenario_id: scenario.id,
                    });
                }
            }
        });
}

fn render_start_stop(ui: &mut egui::Ui, clock: &mut FlightClock) {
    let (icon, color, tooltip) = if clock.running {
        (icons::PAUSE, colors::PAUSE_ICON, "Stop (Space)")
    } else {
        (icons::PLAY, colors::PLAY_ICON, "Start (Space)")
    };
    let button = egui::Button::new(egui::RichText::new(icon).size(22.0).color(color))
        .min_size(egui::vec2(40.0, 32.0));
    if ui.add(button).on_hover_text(tooltip).clicked() {
        clock.toggle();
    }
}

fn render_view_buttons(ui: &mut egui::Ui, camera: &mut CameraState) {
    ui.label(egui::RichText::new("View").color(colors::LABEL));
    ui.horizontal(|ui| {
        for (i, view) in CameraView::ALL.into_iter().enumerate() {
            let text = format!("{} {}", icons::view_icon(view), view.label());
            if ui
                .selectable_label(camera.view == view, text)
                .on_hover_text(format!("{} view ({})", view.label(), i + 1))
                .clicked()
            {
                camera.view = view;
            }
        }
    });
}

fn render_telemetry(ui: &mut egui::Ui, telemetry: &FlightTelemetry, elapsed: f64) {
    ui.label(
        egui::RichText::new(format!("{} Telemetry", icons::GAUGE)).color(colors::LABEL),
    );
    egui::Grid::new("telemetry")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for (label, value) in telemetry_rows(telemetry, elapsed) {
                ui.label(egui::RichText::new(label).color(colors::LABEL));
                ui.label(egui::RichText::new(value).monospace().color(colors::VALUE));
                ui.end_row();
            }
        });

    if let Some(separation) = telemetry.separation {
        ui.add_space(6.0);
        ui.label(
            egui::RichText::new(format!(
                "{} Separated at {} (T+{:.1} s)",
                icons::WARNING,
                format_distance(separation.altitude_km),
                separation.elapsed
            ))
            .color(colors::SEPARATION),
        );
    }
}
