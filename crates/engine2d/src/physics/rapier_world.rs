//! rapier2d physics world
//!
//! Holds the full rapier pipeline state and exposes it through
//! [`PhysicsBackend`]. Scene-facing [`BodyHandle`]s map onto rapier's own
//! handles, so a destroyed body can never alias a later one.

use super::{BodyDesc, BodyHandle, BodyType, ColliderShape, PhysicsBackend, PhysicsError};
use crate::foundation::math::Vec2;
use rapier2d::prelude::*;
use slotmap::SlotMap;

/// Mass given to dynamic bodies that have no collider to derive one from
const FALLBACK_MASS: Real = 1.0;

/// Physics world backed by rapier2d
pub struct RapierWorld {
    handles: SlotMap<BodyHandle, RigidBodyHandle>,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    locked: bool,
}

impl RapierWorld {
    /// Create an empty world with the given gravity
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            handles: SlotMap::with_key(),
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            locked: false,
        }
    }

    /// Current gravity
    #[must_use]
    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    /// Number of colliders in the world
    #[must_use]
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(*self.handles.get(handle)?)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        let rapier = *self.handles.get(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        self.bodies.get_mut(rapier).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn builder(desc: &BodyDesc) -> RigidBodyBuilder {
        let builder = match desc.body_type {
            BodyType::Static => RigidBodyBuilder::fixed(),
            BodyType::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let builder = builder
            .translation(vector![desc.position.x, desc.position.y])
            .rotation(desc.rotation)
            .linvel(vector![desc.linear_velocity.x, desc.linear_velocity.y])
            .angvel(desc.angular_velocity)
            .gravity_scale(desc.gravity_scale);

        if desc.body_type == BodyType::Dynamic && desc.collider.is_none() {
            builder.additional_mass(FALLBACK_MASS)
        } else {
            builder
        }
    }

    fn collider(shape: ColliderShape) -> Collider {
        match shape {
            ColliderShape::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderShape::Cuboid { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y),
        }
        .build()
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.81))
    }
}

impl PhysicsBackend for RapierWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let rapier = self.bodies.insert(Self::builder(&desc).build());
        if let Some(shape) = desc.collider {
            self.colliders
                .insert_with_parent(Self::collider(shape), rapier, &mut self.bodies);
        }
        log::trace!("Created {:?} body {:?}", desc.body_type, rapier);
        self.handles.insert(rapier)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if self.locked {
            return Err(PhysicsError::WorldLocked);
        }
        let rapier = self.handles.remove(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        self.bodies.remove(
            rapier,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        Ok(())
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|body| {
            let translation = body.translation();
            Vec2::new(translation.x, translation.y)
        })
    }

    fn body_rotation(&self, handle: BodyHandle) -> Option<f32> {
        self.body(handle).map(|body| body.rotation().angle())
    }

    fn set_body_transform(
        &mut self,
        handle: BodyHandle,
        position: Vec2,
        rotation: f32,
    ) -> Result<(), PhysicsError> {
        if self.locked {
            return Err(PhysicsError::WorldLocked);
        }
        let body = self.body_mut(handle)?;
        body.set_position(Isometry::new(vector![position.x, position.y], rotation), true);
        Ok(())
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|body| {
            let velocity = body.linvel();
            Vec2::new(velocity.x, velocity.y)
        })
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    fn step(&mut self, delta_time: f32) {
        if delta_time <= 0.0 {
            log::warn!("Skipping physics step with non-positive delta time {}", delta_time);
            return;
        }
        self.locked = true;
        self.integration_parameters.dt = delta_time;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vector![gravity.x, gravity.y];
    }
}
