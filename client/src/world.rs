use bevy::prelude::*;
use shared::{ColliderShapeDef, PhysicsAdapter, WorldStaticDef};

use crate::{
    FrameSet,
    player::{CharacterSim, to_core_quat, to_core_vec},
};

/// Static collision geometry attached to a scene entity. Its `Transform` is the pose.
#[derive(Component, Clone, Debug)]
pub struct TerrainCollider {
    pub id: u32,
    pub shape: ColliderShapeDef,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup);
    app.add_systems(
        Update,
        load_terrain
            .before(FrameSet::Simulate)
            .run_if(terrain_pending),
    );
}

const GROUND_HALF_EXTENT: f32 = 50.0;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("World setup");

    // Ground: a thick slab whose top face is at y = 0.
    commands.spawn((
        TerrainCollider {
            id: 0,
            shape: ColliderShapeDef::Cuboid {
                half_extents: shared::Vec3::new(GROUND_HALF_EXTENT, 0.5, GROUND_HALF_EXTENT),
            },
        },
        Transform::from_xyz(0.0, -0.5, 0.0),
        Mesh3d(meshes.add(Cuboid::new(
            GROUND_HALF_EXTENT * 2.0,
            1.0,
            GROUND_HALF_EXTENT * 2.0,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    // Obstacle box.
    commands.spawn((
        TerrainCollider {
            id: 1,
            shape: ColliderShapeDef::Cuboid {
                half_extents: shared::Vec3::new(1.0, 1.0, 1.0),
            },
        },
        Transform::from_xyz(5.0, 1.0, 0.0),
        Mesh3d(meshes.add(Cuboid::new(2.0, 2.0, 2.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(124, 144, 255))),
    ));

    // A gentle ramp to walk up.
    commands.spawn((
        TerrainCollider {
            id: 2,
            shape: ColliderShapeDef::Cuboid {
                half_extents: shared::Vec3::new(2.0, 0.25, 4.0),
            },
        },
        Transform::from_xyz(-6.0, 0.5, -6.0).with_rotation(Quat::from_rotation_x(0.25)),
        Mesh3d(meshes.add(Cuboid::new(4.0, 0.5, 8.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(180, 150, 110))),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn terrain_pending(sim: Option<Res<CharacterSim>>) -> bool {
    sim.is_some_and(|sim| !sim.sim.adapter().is_ready())
}

/// Builds the physics world once the terrain entities exist.
fn load_terrain(mut sim: ResMut<CharacterSim>, terrain: Query<(&TerrainCollider, &Transform)>) {
    if terrain.is_empty() {
        return;
    }
    let defs: Vec<WorldStaticDef> = terrain
        .iter()
        .map(|(collider, transform)| {
            WorldStaticDef::new(
                collider.id,
                to_core_vec(transform.translation),
                collider.shape.clone(),
            )
            .with_rotation(to_core_quat(transform.rotation))
        })
        .collect();
    sim.sim.adapter_mut().load_world(defs);
}
