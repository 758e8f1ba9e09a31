//! Rendering for the launch simulator.
//!
//! Static scene (planet, sun), vehicle proxies synced from the physics
//! world, and optional collision-shape wireframes.

pub mod debug;
pub mod sync;

use bevy::prelude::*;

use crate::camera::to_render;
use crate::types::Planet;

use self::debug::DebugDrawPlugin;
use self::sync::VisualSyncPlugin;

pub use self::debug::{DebugDraw, DebugShapeSync};
pub use self::sync::{ModelStatus, VisualProxy};

/// Plugin aggregating all rendering functionality.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((VisualSyncPlugin, DebugDrawPlugin))
            .insert_resource(ClearColor(Color::srgb(0.02, 0.03, 0.08)))
            .add_systems(Startup, (spawn_planet, spawn_lighting));
    }
}

/// Marker for the planet sphere.
#[derive(Component)]
pub struct PlanetSurface;

/// Spawn the planet the pad sits on.
fn spawn_planet(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let planet = Planet::default();
    // UV sphere so a pole vertex lies exactly under the pad
    let mesh = meshes.add(Sphere::new(planet.radius as f32).mesh().uv(256, 128));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.45, 0.25),
        perceptual_roughness: 1.0,
        ..default()
    });

    commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::from_translation(to_render(planet.center)),
        PlanetSurface,
    ));
}

/// Sun-like directional light.
fn spawn_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(1.0, 2.0, 1.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("Scene lighting initialized");
}
