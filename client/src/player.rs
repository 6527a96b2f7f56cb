use bevy::prelude::*;
use shared::{
    BodyPose, CharacterHandle, FrameReport, RapierPhysicsAdapter, RenderTarget, Simulation,
    TickOutcome,
};

use crate::{
    FrameSet,
    config::ClientConfig,
    input::{PlayerInput, ZoomInput},
};

/// The character simulation and the local player's handle into it.
#[derive(Resource)]
pub struct CharacterSim {
    pub sim: Simulation<RapierPhysicsAdapter>,
    pub player: Option<CharacterHandle>,
}

impl Default for CharacterSim {
    fn default() -> Self {
        Self {
            sim: Simulation::new(RapierPhysicsAdapter::new()),
            player: None,
        }
    }
}

/// The most recent frame result, read by the camera.
#[derive(Resource, Default)]
pub struct LastFrame(pub Option<FrameReport>);

/// Render node mirroring the player's capsule.
#[derive(Component)]
pub struct PlayerModel;

/// Spawn point: capsule center slightly above the ground.
const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 1.1, 0.0);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CharacterSim>();
    app.init_resource::<LastFrame>();
    app.add_systems(Startup, (spawn_player, spawn_player_model));
    app.add_systems(Update, tick_player.in_set(FrameSet::Simulate));
}

pub fn to_core_vec(v: Vec3) -> shared::Vec3 {
    shared::Vec3::new(v.x, v.y, v.z)
}

pub fn to_core_quat(q: Quat) -> shared::Quat {
    shared::Quat::from_quaternion(shared::rapier_world::rapier3d::na::Quaternion::new(
        q.w, q.x, q.y, q.z,
    ))
}

pub fn to_bevy_vec(v: shared::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_bevy_quat(q: shared::Quat) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Writes the simulated body pose onto a Bevy `Transform`.
struct RenderTransform<'a>(&'a mut Transform);

impl RenderTarget for RenderTransform<'_> {
    fn apply_pose(&mut self, pose: &BodyPose) {
        self.0.translation = to_bevy_vec(pose.position);
        self.0.rotation = to_bevy_quat(pose.orientation);
    }
}

fn spawn_player(mut sim: ResMut<CharacterSim>, config: Res<ClientConfig>) {
    let spawned = sim.sim.spawn(
        to_core_vec(SPAWN_POSITION),
        shared::Quat::identity(),
        config.character.clone(),
        config.camera.clone(),
    );
    match spawned {
        Ok(handle) => sim.player = Some(handle),
        Err(err) => error!("Failed to spawn player: {err}"),
    }
}

fn spawn_player_model(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<ClientConfig>,
) {
    let character = &config.character;
    let half_length = (character.height * 0.5 - character.radius).max(0.0);
    commands.spawn((
        PlayerModel,
        Transform::from_translation(SPAWN_POSITION),
        Mesh3d(meshes.add(Capsule3d::new(character.radius, half_length * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(220, 180, 90))),
    ));
}

fn tick_player(
    time: Res<Time>,
    mut sim: ResMut<CharacterSim>,
    mut input: ResMut<PlayerInput>,
    mut zoom: ResMut<ZoomInput>,
    mut last_frame: ResMut<LastFrame>,
    mut model: Query<&mut Transform, With<PlayerModel>>,
) {
    let Some(handle) = sim.player else {
        return;
    };

    let scroll = std::mem::take(&mut zoom.0);
    if scroll != 0.0 {
        if let Err(err) = sim.sim.on_zoom_input(handle, scroll) {
            warn!("Zoom input dropped: {err}");
        }
    }

    let mut transform = model.single_mut().ok();
    let mut target = transform.as_deref_mut().map(RenderTransform);
    let frame = sim
        .sim
        .run_frame(handle, &mut input.0, time.delta_secs(), target.as_mut());
    match frame {
        Ok(frame) => {
            if let TickOutcome::Advanced(report) = frame.outcome {
                if let Some(trigger) = report.animation {
                    debug!(
                        "Animation: stop {} play {}",
                        trigger.stop.clip_name(),
                        trigger.play.clip_name()
                    );
                }
            }
            last_frame.0 = Some(frame);
        }
        Err(err) => warn!("Player frame failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CameraConfig, CharacterConfig, ColliderShapeDef, InputState, Key, WorldStaticDef};

    fn test_app() -> App {
        let mut sim = CharacterSim::default();
        sim.sim.adapter_mut().load_world(vec![WorldStaticDef::new(
            0,
            shared::Vec3::new(0.0, -0.5, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: shared::Vec3::new(50.0, 0.5, 50.0),
            },
        )]);
        let handle = sim
            .sim
            .spawn(
                shared::Vec3::new(0.0, 1.03, 0.0),
                shared::Quat::identity(),
                CharacterConfig::default(),
                CameraConfig::default(),
            )
            .unwrap();
        sim.player = Some(handle);

        let mut input = InputState::default();
        input.press(Key::Forward);

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(sim);
        app.insert_resource(PlayerInput(input));
        app.init_resource::<ZoomInput>();
        app.init_resource::<LastFrame>();
        app.add_systems(Update, tick_player);
        app
    }

    #[test]
    fn frames_run_before_the_model_exists() {
        let mut app = test_app();
        app.update();

        let frame = app.world().resource::<LastFrame>().0.unwrap();
        assert!(frame.outcome.is_advanced());
        assert!(!frame.synced);
    }

    #[test]
    fn model_transform_follows_the_body() {
        let mut app = test_app();
        let model = app
            .world_mut()
            .spawn((PlayerModel, Transform::default()))
            .id();
        app.update();
        app.update();

        let frame = app.world().resource::<LastFrame>().0.unwrap();
        assert!(frame.synced);
        let transform = app.world().get::<Transform>(model).unwrap();
        assert_eq!(transform.translation, to_bevy_vec(frame.body.position));
        assert_eq!(transform.rotation, to_bevy_quat(frame.body.orientation));
        assert_eq!(app.world().resource::<CharacterSim>().sim.adapter().steps(), 2);
    }

    #[test]
    fn zoom_input_moves_by_the_scrolled_amount() {
        let mut app = test_app();
        app.world_mut().resource_mut::<ZoomInput>().0 = 3.0;
        app.update();

        assert_eq!(app.world().resource::<ZoomInput>().0, 0.0);
        let frame = app.world().resource::<LastFrame>().0.unwrap();
        // Body yaw 0: the zoom distance is the camera's z offset from the body.
        let distance = frame.camera.position.z - frame.body.position.z;
        assert!((distance - 5.8).abs() < 1e-4, "distance = {distance}");

        app.world_mut().resource_mut::<ZoomInput>().0 = -200.0;
        app.update();
        let sim = app.world().resource::<CharacterSim>();
        let handle = sim.player.unwrap();
        assert_eq!(
            sim.sim.camera_mode(handle).unwrap(),
            shared::CameraMode::FirstPerson
        );
    }

    #[test]
    fn quaternion_conversion_round_trips() {
        let q = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let back = to_bevy_quat(to_core_quat(q));
        assert!(back.abs_diff_eq(q, 1e-6));
    }
}
