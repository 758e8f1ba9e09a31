//! Visual proxies and pose synchronization.
//!
//! Each physics body with a visual gets one proxy entity. The sync is
//! one-way: body pose → proxy `Transform`, once per frame. Proxies whose glTF
//! scene has not finished loading are skipped until it has. A scene that
//! fails to load is swapped for a plain mesh of the collision shape.

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::camera::to_render;
use crate::flight::{FlightVehicles, ScenarioLoaded, handle_load_scenario};
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::scenarios::presets::MODEL_SCALE;
use crate::scenarios::{TOWER_HEIGHT, VehicleSpec, get_scenario};
use crate::vehicle::VehicleRole;

/// Launch tower model and its scale.
const TOWER_MODEL: &str = "models/launchtower.glb";
const TOWER_MODEL_SCALE: f32 = 0.003;

/// Plugin spawning and moving the vehicle visuals.
pub struct VisualSyncPlugin;

impl Plugin for VisualSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_flight_visuals.after(handle_load_scenario),
                track_model_loads,
                fall_back_to_mesh,
                sync_visual_proxies,
            )
                .chain(),
        );
    }
}

/// Entity drawn at the pose of a physics body.
#[derive(Component, Clone, Copy, Debug)]
pub struct VisualProxy {
    pub body: BodyHandle,
    /// Scale applied on top of the body pose
    pub scale: f32,
}

/// Load progress of a proxy's glTF scene.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    Failed,
}

/// Mesh shown instead of a glTF scene that failed to load.
#[derive(Component, Clone, Debug)]
pub struct FallbackMesh {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Root of everything spawned for the current flight.
#[derive(Component)]
pub struct FlightVisual;

fn spawn_vehicle(
    commands: &mut Commands,
    spec: &VehicleSpec,
    role: VehicleRole,
    body: BodyHandle,
    asset_server: &AssetServer,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mut entity = commands.spawn((
        FlightVisual,
        role,
        Name::new(role.label()),
        Transform::default(),
        Visibility::Hidden,
    ));
    // Plain cylinder matching the body
    let cylinder = FallbackMesh {
        mesh: meshes.add(Cylinder::new(spec.radius as f32, spec.height as f32)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.85, 0.9),
            metallic: 0.7,
            perceptual_roughness: 0.3,
            ..default()
        }),
    };
    match spec.model {
        Some(path) => {
            entity.insert((
                VisualProxy {
                    body,
                    scale: MODEL_SCALE,
                },
                ModelStatus::Loading,
                SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path))),
                cylinder,
            ));
        }
        None => {
            entity.insert((
                VisualProxy { body, scale: 1.0 },
                ModelStatus::Ready,
                Mesh3d(cylinder.mesh),
                MeshMaterial3d(cylinder.material),
            ));
        }
    }
}

/// Replace the flight visuals whenever a scenario is loaded.
fn spawn_flight_visuals(
    mut commands: Commands,
    mut loaded: MessageReader<ScenarioLoaded>,
    existing: Query<Entity, With<FlightVisual>>,
    vehicles: Option<Res<FlightVehicles>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(event) = loaded.read().last() else {
        return;
    };
    let (Some(scenario), Some(vehicles)) = (get_scenario(event.scenario_id), vehicles) else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    spawn_vehicle(
        &mut commands,
        &scenario.booster,
        VehicleRole::Booster,
        vehicles.booster,
        &asset_server,
        &mut meshes,
        &mut materials,
    );
    if let (Some(spec), Some(ship)) = (&scenario.ship, vehicles.ship) {
        spawn_vehicle(
            &mut commands,
            spec,
            VehicleRole::Ship,
            ship,
            &asset_server,
            &mut meshes,
            &mut materials,
        );
    }

    let concrete = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.45, 0.45),
        perceptual_roughness: 0.9,
        ..default()
    });
    // Tower body origin is at its base
    let tower_block = Cuboid::new(0.012, TOWER_HEIGHT as f32, 0.012)
        .mesh()
        .build()
        .translated_by(Vec3::Y * TOWER_HEIGHT as f32 / 2.0);
    commands.spawn((
        FlightVisual,
        VisualProxy {
            body: vehicles.pad,
            scale: 1.0,
        },
        ModelStatus::Ready,
        Mesh3d(meshes.add(Cuboid::new(0.04, 0.002, 0.04))),
        MeshMaterial3d(concrete.clone()),
        Transform::default(),
        Visibility::Hidden,
    ));
    commands.spawn((
        FlightVisual,
        VisualProxy {
            body: vehicles.tower,
            scale: TOWER_MODEL_SCALE,
        },
        ModelStatus::Loading,
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(TOWER_MODEL))),
        FallbackMesh {
            mesh: meshes.add(tower_block),
            material: concrete,
        },
        Transform::default(),
        Visibility::Hidden,
    ));

    info!("Spawned visuals for '{}'", scenario.id);
}

/// Flip proxies to ready once their scene has loaded; warn on failure.
fn track_model_loads(
    asset_server: Res<AssetServer>,
    mut query: Query<(&mut ModelStatus, &SceneRoot)>,
) {
    for (mut status, scene) in &mut query {
        if *status != ModelStatus::Loading {
            continue;
        }
        if asset_server.is_loaded_with_dependencies(scene.0.id()) {
            *status = ModelStatus::Ready;
        } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(scene.0.id()) {
            let path = scene
                .0
                .path()
                .map_or_else(|| "<unnamed>".to_string(), |p| p.to_string());
            warn!("Model {path} failed to load: {err}");
            *status = ModelStatus::Failed;
        }
    }
}

/// Swap failed scenes for their fallback mesh and mark the proxy ready.
fn fall_back_to_mesh(
    mut commands: Commands,
    mut query: Query<(Entity, &mut ModelStatus, &mut VisualProxy, &FallbackMesh)>,
) {
    for (entity, mut status, mut proxy, fallback) in &mut query {
        if *status != ModelStatus::Failed {
            continue;
        }
        commands
            .entity(entity)
            .remove::<SceneRoot>()
            .insert((
                Mesh3d(fallback.mesh.clone()),
                MeshMaterial3d(fallback.material.clone()),
            ));
        // Fallback meshes are built at body scale
        proxy.scale = 1.0;
        *status = ModelStatus::Ready;
    }
}

/// Copy body poses onto ready proxies.
pub fn sync_visual_proxies(
    world: Res<PhysicsWorld>,
    mut query: Query<(&VisualProxy, &ModelStatus, &mut Transform, &mut Visibility)>,
) {
    for (proxy, status, mut transform, mut visibility) in &mut query {
        if *status != ModelStatus::Ready {
            continue;
        }
        let Ok(body) = world.body(proxy.body) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        transform.translation = to_render(body.state.position);
        transform.rotation = body.state.orientation.as_quat();
        transform.scale = Vec3::splat(proxy.scale);
        *visibility = Visibility::Inherited;
    }
}
