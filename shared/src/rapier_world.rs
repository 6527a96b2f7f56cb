//! Rapier-backed physics adapter over an immutable static world.
//!
//! The static geometry (terrain, props) is built once into a [`RapierQueryWorld`] when the
//! host finishes loading assets. Characters are *not* inserted into the Rapier sets: each
//! one is a kinematic capsule slot owned by the adapter and moved with Rapier's
//! `KinematicCharacterController` against the query pipeline of the static world.
//!
//! Statics are inserted in `id` order, so the same definitions always produce the same
//! sets. Nothing is simulated dynamically and the statics never move once built.

// Re-export Rapier so hosts can build custom queries without depending on `rapier3d` directly.
pub use rapier3d;

use rapier3d::{
    control::{CharacterLength, KinematicCharacterController},
    na::{Quaternion, Translation3, UnitQuaternion, point},
    parry::utils::hashmap::HashMap,
    prelude::*,
};

use crate::{
    capsule::CapsuleShape,
    constants::{DEFAULT_PHYSICS_DT, GROUND_PROBE_LIFT},
    error::AdapterError,
    math::{Quat, Vec3, is_finite_vec},
    physics::{BodyHandle, ColliderHandle, ContactSettings, KinematicCapsule, PhysicsAdapter},
};

/// Definition of an immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - For planes, the normal is derived from the pose: `normal = rotation * +Y`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space. Any visual extent of a ground plane is a rendering concern.
    Plane { offset_along_normal: f32 },

    /// Oriented box with the given half-extents.
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule. `half_height` excludes the caps.
    CapsuleY { radius: f32, half_height: f32 },

    CylinderY { radius: f32, half_height: f32 },
}

/// In-memory Rapier structures needed for scene queries and the KCC against a static world.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Builds a query world from static collider definitions.
    ///
    /// The input is sorted by `id` before insertion. Definitions with non-finite values
    /// are skipped with a warning.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.iter() {
            if !def_is_finite(def) {
                log::warn!("Skipping world static {} with non-finite values", def.id);
                continue;
            }

            let rb = RigidBodyBuilder::fixed().pose(iso_from_def(def)).build();
            let rb_handle = bodies.insert(rb);
            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only (no dynamics): updates the broad-phase BVH and the
        // narrow-phase contact graph so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed `QueryPipeline` view over the static geometry.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

fn def_is_finite(def: &WorldStaticDef) -> bool {
    let pose_ok =
        is_finite_vec(&def.translation) && def.rotation.coords.iter().all(|c| c.is_finite());
    let shape_ok = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => offset_along_normal.is_finite(),
        ColliderShapeDef::Cuboid { half_extents } => is_finite_vec(half_extents),
        ColliderShapeDef::Sphere { radius } => radius.is_finite(),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        }
        | ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => radius.is_finite() && half_height.is_finite(),
    };
    pose_ok && shape_ok
}

#[inline]
fn to_rapier(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn from_rapier(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn iso_from_def(def: &WorldStaticDef) -> Isometry<Real> {
    let q = def.rotation.quaternion();
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.i, q.j, q.k));
    Isometry::from_parts(Translation3::from(to_rapier(def.translation)), rotation)
}

/// Builds a collider with identity local transform; the pose lives on the parent body.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the pose, so the half-space only needs its
            // local +Y normal shifted by the offset.
            let halfspace = HalfSpace::new(Vector::<Real>::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(vector![0.0, *offset_along_normal, 0.0])
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius).build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius).build(),
    }
}

/// One kinematic character capsule tracked by the adapter.
struct CharacterSlot {
    capsule: CapsuleShape,
    shape: Capsule,
    position: Vec3,
    controller: KinematicCharacterController,
    /// `cos(max_slope_angle)`: the smallest ground normal `y` that still counts as walkable.
    min_ground_normal_y: f32,
}

/// [`PhysicsAdapter`] backed by Rapier's query pipeline and character controller.
///
/// Not ready until [`RapierPhysicsAdapter::load_world`] is called. Capsules can be created
/// before that; queries against them report [`AdapterError::NotReady`].
pub struct RapierPhysicsAdapter {
    world: Option<RapierQueryWorld>,
    characters: HashMap<u32, CharacterSlot>,
    next_id: u32,
    dt: f32,
    steps: u64,
}

impl Default for RapierPhysicsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierPhysicsAdapter {
    pub fn new() -> Self {
        Self {
            world: None,
            characters: HashMap::default(),
            next_id: 0,
            dt: DEFAULT_PHYSICS_DT,
            steps: 0,
        }
    }

    /// Builds the static world and marks the adapter ready. Replaces any previous world.
    pub fn load_world(&mut self, defs: Vec<WorldStaticDef>) {
        let world = RapierQueryWorld::build(defs);
        log::info!("Loaded physics world with {} static colliders", world.len());
        self.world = Some(world);
    }

    pub fn world(&self) -> Option<&RapierQueryWorld> {
        self.world.as_ref()
    }

    /// Number of world steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current kinematic position of a character capsule.
    pub fn capsule_position(&self, collider: ColliderHandle) -> Option<Vec3> {
        self.characters.get(&collider.0).map(|slot| slot.position)
    }

    fn ready_world(&self) -> Result<&RapierQueryWorld, AdapterError> {
        self.world.as_ref().ok_or(AdapterError::NotReady)
    }
}

impl PhysicsAdapter for RapierPhysicsAdapter {
    fn is_ready(&self) -> bool {
        self.world.is_some()
    }

    fn create_capsule_collider(
        &mut self,
        capsule: CapsuleShape,
        contact: ContactSettings,
        position: Vec3,
    ) -> Result<KinematicCapsule, AdapterError> {
        if !is_finite_vec(&position) {
            return Err(AdapterError::MalformedContact);
        }

        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(contact.skin_width),
            slide: true,
            autostep: None,
            max_slope_climb_angle: contact.max_slope_angle,
            min_slope_slide_angle: contact.max_slope_angle,
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        };

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.characters.insert(
            id,
            CharacterSlot {
                capsule,
                shape: Capsule::new_y(capsule.segment_half_height(), capsule.radius),
                position,
                controller,
                min_ground_normal_y: contact.max_slope_angle.cos(),
            },
        );

        Ok(KinematicCapsule {
            body: BodyHandle(id),
            collider: ColliderHandle(id),
        })
    }

    fn remove_capsule(&mut self, capsule: KinematicCapsule) {
        self.characters.remove(&capsule.collider.0);
    }

    fn query_grounded(
        &self,
        collider: ColliderHandle,
        skin_width: f32,
    ) -> Result<bool, AdapterError> {
        let slot = self
            .characters
            .get(&collider.0)
            .ok_or(AdapterError::UnknownCollider(collider.0))?;
        let world = self.ready_world()?;
        let query_pipeline = world.query_pipeline(QueryFilter::only_fixed());

        // Probe from slightly above the feet so the ray never starts inside the ground.
        let feet_y = slot.position.y - slot.capsule.half_extent_y();
        let ray = Ray::new(
            point![slot.position.x, feet_y + GROUND_PROBE_LIFT, slot.position.z],
            vector![0.0, -1.0, 0.0],
        );
        let max_dist = GROUND_PROBE_LIFT + 2.0 * skin_width.max(0.0);

        let Some((_handle, hit)) = query_pipeline.cast_ray_and_get_normal(&ray, max_dist, true)
        else {
            return Ok(false);
        };
        if !is_finite_vec(&from_rapier(&hit.normal)) {
            return Err(AdapterError::MalformedContact);
        }
        Ok(hit.normal.y >= slot.min_ground_normal_y)
    }

    fn sweep_move(
        &mut self,
        collider: ColliderHandle,
        desired: Vec3,
    ) -> Result<Vec3, AdapterError> {
        let slot = self
            .characters
            .get(&collider.0)
            .ok_or(AdapterError::UnknownCollider(collider.0))?;
        let world = self.ready_world()?;
        let query_pipeline = world.query_pipeline(QueryFilter::only_fixed());

        let pose = Isometry::translation(slot.position.x, slot.position.y, slot.position.z);
        let movement = slot.controller.move_shape(
            self.dt,
            &query_pipeline,
            &slot.shape,
            &pose,
            to_rapier(desired),
            |_| {},
        );

        let corrected = from_rapier(&movement.translation);
        if !is_finite_vec(&corrected) {
            return Err(AdapterError::MalformedContact);
        }
        Ok(corrected)
    }

    fn set_kinematic_translation(
        &mut self,
        body: BodyHandle,
        position: Vec3,
    ) -> Result<(), AdapterError> {
        let slot = self
            .characters
            .get_mut(&body.0)
            .ok_or(AdapterError::UnknownBody(body.0))?;
        slot.position = position;
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        if dt > 0.0 && dt.is_finite() {
            self.dt = dt;
        }
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ground_and_wall() -> Vec<WorldStaticDef> {
        vec![
            // Top face at y = 0.
            WorldStaticDef::new(
                1,
                Vec3::new(0.0, -0.5, 0.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(50.0, 0.5, 50.0),
                },
            ),
            // Near face at x = 4.
            WorldStaticDef::new(
                2,
                Vec3::new(5.0, 1.0, 0.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(1.0, 1.0, 1.0),
                },
            ),
        ]
    }

    fn contact() -> ContactSettings {
        ContactSettings {
            skin_width: 0.02,
            max_slope_angle: 45f32.to_radians(),
        }
    }

    fn spawn(adapter: &mut RapierPhysicsAdapter, position: Vec3) -> KinematicCapsule {
        let capsule = CapsuleShape::new(0.5, 2.0).unwrap();
        adapter
            .create_capsule_collider(capsule, contact(), position)
            .unwrap()
    }

    #[test]
    fn build_sorts_and_skips_non_finite() {
        let mut defs = ground_and_wall();
        defs.push(WorldStaticDef::new(
            0,
            Vec3::new(f32::NAN, 0.0, 0.0),
            ColliderShapeDef::Sphere { radius: 1.0 },
        ));
        let world = RapierQueryWorld::build(defs);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn queries_before_load_are_not_ready() {
        let mut adapter = RapierPhysicsAdapter::new();
        let handles = spawn(&mut adapter, Vec3::new(0.0, 1.03, 0.0));

        assert!(!adapter.is_ready());
        assert_eq!(
            adapter.query_grounded(handles.collider, 0.02),
            Err(AdapterError::NotReady)
        );
        assert_eq!(
            adapter.sweep_move(handles.collider, Vec3::x()),
            Err(AdapterError::NotReady)
        );
    }

    #[test]
    fn capsule_resting_on_ground_is_grounded() {
        let mut adapter = RapierPhysicsAdapter::new();
        adapter.load_world(ground_and_wall());
        let handles = spawn(&mut adapter, Vec3::new(0.0, 1.03, 0.0));
        assert_eq!(adapter.query_grounded(handles.collider, 0.02), Ok(true));

        // Lifted well above the skin tolerance.
        adapter
            .set_kinematic_translation(handles.body, Vec3::new(0.0, 2.0, 0.0))
            .unwrap();
        assert_eq!(adapter.query_grounded(handles.collider, 0.02), Ok(false));
    }

    #[test]
    fn open_sweep_is_unchanged() {
        let mut adapter = RapierPhysicsAdapter::new();
        adapter.load_world(ground_and_wall());
        let handles = spawn(&mut adapter, Vec3::new(0.0, 1.03, 0.0));

        let corrected = adapter
            .sweep_move(handles.collider, Vec3::new(0.0, 0.0, -0.5))
            .unwrap();
        assert_abs_diff_eq!(corrected, Vec3::new(0.0, 0.0, -0.5), epsilon = 1e-3);
    }

    #[test]
    fn sweep_stops_at_wall() {
        let mut adapter = RapierPhysicsAdapter::new();
        adapter.load_world(ground_and_wall());
        let handles = spawn(&mut adapter, Vec3::new(3.0, 1.03, 0.0));

        let corrected = adapter
            .sweep_move(handles.collider, Vec3::new(2.0, 0.0, 0.0))
            .unwrap();
        // Capsule surface reaches at most the wall face at x = 4.
        assert!(corrected.x < 0.5 + 1e-3, "{corrected:?}");
        assert!(corrected.x > 0.3, "{corrected:?}");
    }

    #[test]
    fn unknown_handles_are_errors() {
        let mut adapter = RapierPhysicsAdapter::new();
        adapter.load_world(ground_and_wall());
        assert_eq!(
            adapter.query_grounded(ColliderHandle(7), 0.02),
            Err(AdapterError::UnknownCollider(7))
        );
        assert_eq!(
            adapter.set_kinematic_translation(BodyHandle(7), Vec3::zeros()),
            Err(AdapterError::UnknownBody(7))
        );
    }

    #[test]
    fn step_counts_and_keeps_last_valid_dt() {
        let mut adapter = RapierPhysicsAdapter::new();
        adapter.step(0.05);
        adapter.step(0.0);
        assert_eq!(adapter.steps(), 2);
        assert_eq!(adapter.dt, 0.05);
    }
}
