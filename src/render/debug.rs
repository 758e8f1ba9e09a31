//! Debug wireframes mirroring the physics collision shapes.
//!
//! [`DebugShapeSync`] keeps one slot per shape across frames. Slots are
//! matched by position in the shape list: a slot whose kind still matches is
//! moved in place, a mismatched one is recreated, and leftovers are dropped.

use bevy::math::{DQuat, DVec3, Isometry3d};
use bevy::prelude::*;

use crate::camera::to_render;
use crate::physics::{CollisionShape, PhysicsWorld, ShapeKind};

/// Plugin drawing collision shapes as gizmo wireframes.
pub struct DebugDrawPlugin;

impl Plugin for DebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugDraw>()
            .init_resource::<DebugShapeSync>()
            .add_systems(Update, draw_debug_shapes);
    }
}

/// Whether wireframes are drawn.
#[derive(Resource, Debug, Default)]
pub struct DebugDraw {
    pub enabled: bool,
}

impl DebugDraw {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        info!(
            "Debug wireframes {}",
            if self.enabled { "on" } else { "off" }
        );
    }
}

/// Shape family of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Sphere,
    Cuboid,
    Cylinder,
}

impl From<&ShapeKind> for SlotKind {
    fn from(kind: &ShapeKind) -> Self {
        match kind {
            ShapeKind::Sphere { .. } => SlotKind::Sphere,
            ShapeKind::Cuboid { .. } => SlotKind::Cuboid,
            ShapeKind::Cylinder { .. } => SlotKind::Cylinder,
        }
    }
}

/// One wireframe proxy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugSlot {
    /// Changes only when the slot is recreated
    pub id: u64,
    pub kind: SlotKind,
    pub position: DVec3,
    pub rotation: DQuat,
    /// Sphere: radius on every axis. Cuboid: full extents.
    /// Cylinder: (radius, height, radius).
    pub scale: DVec3,
}

/// What a sync pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub reused: usize,
    pub created: usize,
    pub dropped: usize,
}

/// Per-frame mirror of the collision shapes.
#[derive(Resource, Debug, Default)]
pub struct DebugShapeSync {
    slots: Vec<DebugSlot>,
    next_id: u64,
}

fn slot_scale(kind: &ShapeKind) -> DVec3 {
    match *kind {
        ShapeKind::Sphere { radius } => DVec3::splat(radius),
        ShapeKind::Cuboid { half_extents } => half_extents * 2.0,
        ShapeKind::Cylinder { radius, height } => DVec3::new(radius, height, radius),
    }
}

impl DebugShapeSync {
    pub fn slots(&self) -> &[DebugSlot] {
        &self.slots
    }

    /// Mirror a flat list of shapes, each with the pose of its body.
    pub fn sync<'a>(
        &mut self,
        shapes: impl IntoIterator<Item = (DVec3, DQuat, &'a CollisionShape)>,
    ) -> SyncStats {
        let mut stats = SyncStats::default();
        let mut count = 0;

        for (body_position, body_rotation, shape) in shapes {
            let kind = SlotKind::from(&shape.kind);
            let position = body_position + body_rotation * shape.offset;
            let rotation = body_rotation * shape.rotation;
            let scale = slot_scale(&shape.kind);

            if self.slots.get(count).is_some_and(|slot| slot.kind == kind) {
                let slot = &mut self.slots[count];
                slot.position = position;
                slot.rotation = rotation;
                slot.scale = scale;
                stats.reused += 1;
            } else {
                let slot = DebugSlot {
                    id: self.next_id,
                    kind,
                    position,
                    rotation,
                    scale,
                };
                self.next_id += 1;
                if count < self.slots.len() {
                    self.slots[count] = slot;
                } else {
                    self.slots.push(slot);
                }
                stats.created += 1;
            }
            count += 1;
        }

        stats.dropped = self.slots.len().saturating_sub(count);
        self.slots.truncate(count);
        stats
    }

    /// Mirror every shape of every body in the world.
    pub fn sync_world(&mut self, world: &PhysicsWorld) -> SyncStats {
        self.sync(world.bodies().flat_map(|(_, body)| {
            body.shapes
                .iter()
                .map(|shape| (body.state.position, body.state.orientation, shape))
        }))
    }
}

const WIREFRAME_COLOR: Color = Color::srgb(0.2, 1.0, 0.4);

fn draw_debug_shapes(
    debug: Res<DebugDraw>,
    world: Res<PhysicsWorld>,
    mut sync: ResMut<DebugShapeSync>,
    mut gizmos: Gizmos,
) {
    if !debug.enabled {
        return;
    }
    sync.sync_world(&world);

    for slot in sync.slots() {
        let translation = to_render(slot.position);
        let rotation = slot.rotation.as_quat();
        let scale = slot.scale.as_vec3();
        match slot.kind {
            SlotKind::Sphere => {
                gizmos.sphere(
                    Isometry3d::new(translation, rotation),
                    scale.x,
                    WIREFRAME_COLOR,
                );
            }
            SlotKind::Cuboid => {
                gizmos.cube(
                    Transform::from_translation(translation)
                        .with_rotation(rotation)
                        .with_scale(scale),
                    WIREFRAME_COLOR,
                );
            }
            SlotKind::Cylinder => {
                gizmos.primitive_3d(
                    &Cylinder::new(scale.x, scale.y),
                    Isometry3d::new(translation, rotation),
                    WIREFRAME_COLOR,
                );
            }
        }
    }
}
