//! Reference rigid-body world for the launch vehicles.
//!
//! A deliberately small physics collaborator: dynamic bodies under central
//! gravity, forces accumulated per step, rigid lock constraints between
//! stages, and a ground projection that keeps bodies on the planet surface.
//! It runs in Bevy's FixedUpdate schedule after the flight controller.

mod constraint;
mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;

pub use constraint::{CompositeMass, LockConstraint};
pub use gravity::{MIN_GRAVITY_DISTANCE_KM, gravity_acceleration, weight};
pub use integrator::{integrate_angular, integrate_linear, project_to_surface};

use crate::clock::FlightClock;
use crate::control::{JointId, JointRelease};
use crate::types::{FlightSystemSet, Planet, VehicleState};
use crate::vehicle::VehicleBody;

/// Plugin providing the rigid-body world and its fixed-step integration.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsWorld>()
            .configure_sets(
                FixedUpdate,
                (FlightSystemSet::Control, FlightSystemSet::Physics).chain(),
            )
            .add_systems(FixedUpdate, physics_step.in_set(FlightSystemSet::Physics));
    }
}

/// Angular damping applied to new bodies.
pub const DEFAULT_ANGULAR_DAMPING: f64 = 0.01;

/// Index of a body in the [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub usize);

/// Whether a body moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BodyKind {
    #[default]
    Dynamic,
    /// Never integrated, ignores forces (launch pad, tower).
    Static,
}

/// Geometry of one collision shape. Only used for debug drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind {
    Sphere { radius: f64 },
    Cuboid { half_extents: DVec3 },
    /// Axis along body +Y
    Cylinder { radius: f64, height: f64 },
}

/// A shape attached to a body at a local offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionShape {
    pub kind: ShapeKind,
    /// Offset from the body center, body frame (km)
    pub offset: DVec3,
    /// Rotation relative to the body
    pub rotation: DQuat,
}

impl CollisionShape {
    /// Shape centered on the body with no extra rotation.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            offset: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn at(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }
}

/// One body in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub state: VehicleState,
    /// World-frame angular velocity (rad/s)
    pub angular_velocity: DVec3,
    /// Scalar moment of inertia (kg·km²)
    pub inertia: f64,
    pub kind: BodyKind,
    pub shapes: Vec<CollisionShape>,
    /// Minimum altitude of the body center (km)
    pub clearance: f64,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f64,
    force: DVec3,
    torque: DVec3,
}

impl RigidBody {
    /// Dynamic point-like body with no shapes.
    pub fn dynamic(state: VehicleState) -> Self {
        Self {
            state,
            angular_velocity: DVec3::ZERO,
            inertia: state.mass,
            kind: BodyKind::Dynamic,
            shapes: Vec::new(),
            clearance: 0.0,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            force: DVec3::ZERO,
            torque: DVec3::ZERO,
        }
    }

    /// Immovable body at a fixed pose.
    pub fn fixed(position: DVec3) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(VehicleState::at_rest(position, 0.0))
        }
    }

    /// Solid upright cylinder resting on its base when on the ground.
    pub fn cylinder(radius: f64, height: f64, state: VehicleState) -> Self {
        // Transverse moment of a solid cylinder
        let inertia = state.mass * (3.0 * radius * radius + height * height) / 12.0;
        Self {
            inertia,
            clearance: height / 2.0,
            ..Self::dynamic(state)
        }
        .with_shape(CollisionShape::new(ShapeKind::Cylinder { radius, height }))
    }

    pub fn with_shape(mut self, shape: CollisionShape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// World-frame force accumulated since the last step.
    pub fn accumulated_force(&self) -> DVec3 {
        self.force
    }

    /// World-frame torque about the body center accumulated since the last step.
    pub fn accumulated_torque(&self) -> DVec3 {
        self.torque
    }

    /// Accumulate a body-frame force applied at a body-frame point.
    pub fn apply_local_force(&mut self, force: DVec3, point: DVec3) {
        if self.is_static() || !force.is_finite() || !point.is_finite() {
            return;
        }
        let q = self.state.orientation;
        let world_force = q * force;
        self.force += world_force;
        self.torque += (q * point).cross(world_force);
    }

    /// Kinematic attitude override. Also stops any spin.
    pub fn set_orientation(&mut self, orientation: DQuat) {
        if !orientation.is_finite() {
            return;
        }
        self.state.orientation = orientation.normalize();
        self.angular_velocity = DVec3::ZERO;
    }

    fn clear_loads(&mut self) {
        self.force = DVec3::ZERO;
        self.torque = DVec3::ZERO;
    }
}

/// Errors from world bookkeeping.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum WorldError {
    #[error("no body with handle {0:?}")]
    UnknownBody(BodyHandle),

    #[error("no constraint with id {0:?}")]
    UnknownConstraint(JointId),

    #[error("body {0:?} cannot be locked to itself")]
    SelfLock(BodyHandle),

    #[error("body {0:?} is already locked as a child, or would nest a lock")]
    AlreadyLocked(BodyHandle),

    #[error("timestep {0} must be positive and finite")]
    InvalidTimestep(f64),
}

/// The rigid-body world.
#[derive(Resource, Clone, Debug, Default)]
pub struct PhysicsWorld {
    pub planet: Planet,
    bodies: Vec<RigidBody>,
    constraints: Vec<LockConstraint>,
    next_joint: u32,
}

impl PhysicsWorld {
    pub fn new(planet: Planet) -> Self {
        Self {
            planet,
            ..Default::default()
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, WorldError> {
        self.bodies
            .get(handle.0)
            .ok_or(WorldError::UnknownBody(handle))
    }

    /// Mutable access through the controller-facing interface.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<BodyMut<'_>, WorldError> {
        self.bodies
            .get_mut(handle.0)
            .map(|body| BodyMut { body })
            .ok_or(WorldError::UnknownBody(handle))
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (BodyHandle(i), body))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraints(&self) -> &[LockConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: JointId) -> Option<&LockConstraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    /// Teleport a body by `offset` (km), keeping its velocity.
    ///
    /// Static bodies stay put. A locked child is pulled back onto its parent
    /// at the next step.
    pub fn nudge(&mut self, handle: BodyHandle, offset: DVec3) -> Result<(), WorldError> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(WorldError::UnknownBody(handle))?;
        if !body.is_static() && offset.is_finite() {
            body.state.position += offset;
        }
        Ok(())
    }

    /// Whether `handle` currently rides on a parent.
    pub fn is_locked_child(&self, handle: BodyHandle) -> bool {
        self.constraints.iter().any(|c| c.child == handle)
    }

    /// Lock `child` to `parent` in their current relative pose.
    pub fn add_lock_constraint(
        &mut self,
        parent: BodyHandle,
        child: BodyHandle,
    ) -> Result<JointId, WorldError> {
        if parent == child {
            return Err(WorldError::SelfLock(parent));
        }
        let parent_state = self.body(parent)?.state;
        let child_state = self.body(child)?.state;

        if self.is_locked_child(child) || self.constraints.iter().any(|c| c.parent == child) {
            return Err(WorldError::AlreadyLocked(child));
        }
        if self.is_locked_child(parent) {
            return Err(WorldError::AlreadyLocked(parent));
        }

        let id = JointId(self.next_joint);
        self.next_joint += 1;
        self.constraints.push(LockConstraint::between(
            id,
            parent,
            &parent_state,
            child,
            &child_state,
        ));
        Ok(id)
    }

    /// Remove a constraint. The child keeps its current velocity.
    pub fn remove_constraint(&mut self, id: JointId) -> Result<(), WorldError> {
        let index = self
            .constraints
            .iter()
            .position(|c| c.id == id)
            .ok_or(WorldError::UnknownConstraint(id))?;
        self.constraints.remove(index);
        Ok(())
    }

    /// Advance the world by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> Result<(), WorldError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(WorldError::InvalidTimestep(dt));
        }

        let mut composite: Vec<CompositeMass> = self
            .bodies
            .iter()
            .map(|b| CompositeMass::new(b.state.mass, b.inertia))
            .collect();
        let mut follower = vec![false; self.bodies.len()];

        // Locked children push on their parent
        for c in &self.constraints {
            let child = &self.bodies[c.child.0];
            let (force, torque) = (child.force, child.torque);
            let (mass, inertia) = (child.state.mass, child.inertia);

            let parent = &mut self.bodies[c.parent.0];
            let (f, t) = c.transfer_load(&parent.state, force, torque);
            parent.force += f;
            parent.torque += t;
            composite[c.parent.0].attach(mass, inertia, c.offset);
            follower[c.child.0] = true;
        }

        let planet = self.planet;
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if body.is_static() || follower[i] {
                continue;
            }
            let m = composite[i];

            let mut accel = gravity_acceleration(body.state.position, &planet);
            if m.mass > 0.0 {
                accel += body.force / m.mass;
            }
            integrate_linear(&mut body.state, accel, dt);

            body.angular_velocity *= (1.0 - body.angular_damping).clamp(0.0, 1.0).powf(dt);
            let alpha = if m.inertia > 0.0 {
                body.torque / m.inertia
            } else {
                DVec3::ZERO
            };
            body.state.orientation =
                integrate_angular(body.state.orientation, &mut body.angular_velocity, alpha, dt);

            project_to_surface(&mut body.state, &planet, body.clearance);
        }

        self.enforce_constraints();
        for body in &mut self.bodies {
            body.clear_loads();
        }
        Ok(())
    }

    fn enforce_constraints(&mut self) {
        for c in &self.constraints {
            let parent = &self.bodies[c.parent.0];
            let (state, spin) = (parent.state, parent.angular_velocity);

            let child = &mut self.bodies[c.child.0];
            child.state = c.child_state(&state, spin, child.state.mass);
            child.angular_velocity = spin;
        }
    }
}

impl JointRelease for PhysicsWorld {
    fn release_joint(&mut self, joint: JointId) -> bool {
        self.remove_constraint(joint).is_ok()
    }
}

/// Borrowed body handed to the flight controller.
pub struct BodyMut<'a> {
    body: &'a mut RigidBody,
}

impl VehicleBody for BodyMut<'_> {
    fn position(&self) -> DVec3 {
        self.body.state.position
    }

    fn velocity(&self) -> DVec3 {
        self.body.state.velocity
    }

    fn orientation(&self) -> DQuat {
        self.body.state.orientation
    }

    fn mass(&self) -> f64 {
        self.body.state.mass
    }

    fn apply_local_force(&mut self, force: DVec3, point: DVec3) {
        self.body.apply_local_force(force, point);
    }

    fn set_orientation(&mut self, orientation: DQuat) {
        self.body.set_orientation(orientation);
    }
}

/// Fixed-step physics system. Idle while the flight clock is stopped.
fn physics_step(mut world: ResMut<PhysicsWorld>, clock: Res<FlightClock>) {
    if !clock.running {
        return;
    }
    if let Err(err) = world.step(clock.dt) {
        warn!("Physics step skipped: {err}");
    }
}
