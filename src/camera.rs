//! Camera views for following the flight.
//!
//! Four fixed viewpoints: chase cams on the booster and the ship, a wide
//! shot from off the pad, and a shot from the launch tower looking at the
//! booster. The scroll wheel scales the viewing distance.

use bevy::{input::mouse::AccumulatedMouseScroll, math::DVec3, prelude::*};

use crate::flight::FlightVehicles;
use crate::physics::PhysicsWorld;
use crate::scenarios::TOWER_OFFSET;

/// Render scale: 1 render unit = 1 km.
pub const RENDER_SCALE: f64 = 1.0;

/// Minimum zoom level (closest).
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom level (furthest).
pub const MAX_ZOOM: f32 = 50.0;

/// Zoom speed multiplier for scroll wheel.
pub const ZOOM_SPEED: f32 = 0.1;

/// Booster chase offset (km)
const BOOSTER_OFFSET: DVec3 = DVec3::new(0.3, 0.0, 0.0);

/// Ship chase offset (km)
const SHIP_OFFSET: DVec3 = DVec3::new(0.0, 0.1, 0.1);

/// Fixed base camera position (km)
const BASE_EYE: DVec3 = DVec3::new(0.3, 0.3, 0.3);

/// Tower camera height above the tower foot (km)
const TOWER_EYE_HEIGHT: f64 = 0.12;

/// Convert a physics position (km) to render coordinates.
#[inline]
pub fn to_render(v: DVec3) -> Vec3 {
    (v * RENDER_SCALE).as_vec3()
}

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

/// Selectable viewpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CameraView {
    #[default]
    Booster,
    Ship,
    Base,
    Tower,
}

impl CameraView {
    pub const ALL: [CameraView; 4] = [
        CameraView::Booster,
        CameraView::Ship,
        CameraView::Base,
        CameraView::Tower,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CameraView::Booster => "Booster",
            CameraView::Ship => "Ship",
            CameraView::Base => "Base",
            CameraView::Tower => "Tower",
        }
    }
}

/// Resource tracking the active view and zoom.
#[derive(Resource, Debug)]
pub struct CameraState {
    pub view: CameraView,
    /// Multiplier on the view's offset distance
    pub zoom: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            view: CameraView::default(),
            zoom: 1.0,
        }
    }
}

/// Eye and look-at target in km.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: DVec3,
    pub target: DVec3,
}

/// Camera pose for a view.
///
/// `ship` falls back to the booster when the flight has no ship. `site` is
/// the pad position; the base and tower views are anchored to it.
pub fn camera_pose(
    view: CameraView,
    zoom: f64,
    booster: DVec3,
    ship: Option<DVec3>,
    site: DVec3,
) -> CameraPose {
    match view {
        CameraView::Booster => CameraPose {
            eye: booster + BOOSTER_OFFSET * zoom,
            target: booster,
        },
        CameraView::Ship => {
            let ship = ship.unwrap_or(booster);
            CameraPose {
                eye: ship + SHIP_OFFSET * zoom,
                target: ship,
            }
        }
        CameraView::Base => CameraPose {
            eye: site + BASE_EYE * zoom,
            target: site,
        },
        CameraView::Tower => CameraPose {
            eye: site + TOWER_OFFSET + DVec3::Y * TOWER_EYE_HEIGHT,
            target: booster,
        },
    }
}

/// Plugin providing camera functionality.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraState>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (camera_zoom, follow_view).chain());
    }
}

/// Spawn the main camera with a perspective projection.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            near: 1e-4,
            far: 50_000.0,
            ..default()
        }),
        Transform::from_translation(to_render(BASE_EYE)).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

/// Handle mouse scroll wheel for zoom.
fn camera_zoom(mouse_scroll: Res<AccumulatedMouseScroll>, mut camera_state: ResMut<CameraState>) {
    if mouse_scroll.delta.y == 0.0 {
        return;
    }
    let zoom_factor = 1.0 - mouse_scroll.delta.y * ZOOM_SPEED;
    camera_state.zoom = (camera_state.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
}

/// Place the camera for the active view.
fn follow_view(
    camera_state: Res<CameraState>,
    vehicles: Option<Res<FlightVehicles>>,
    world: Res<PhysicsWorld>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(vehicles) = vehicles else {
        return;
    };
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };
    let Ok(booster) = world.body(vehicles.booster) else {
        return;
    };
    let ship = vehicles
        .ship
        .and_then(|h| world.body(h).ok())
        .map(|b| b.state.position);

    let pose = camera_pose(
        camera_state.view,
        camera_state.zoom as f64,
        booster.state.position,
        ship,
        vehicles.site,
    );
    let up = world
        .planet
        .up_at(pose.target)
        .unwrap_or(DVec3::Y)
        .as_vec3();
    *transform = Transform::from_translation(to_render(pose.eye)).looking_at(to_render(pose.target), up);
}
