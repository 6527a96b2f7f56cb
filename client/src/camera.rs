use bevy::{
    camera::Exposure,
    pbr::{AtmosphereMode, AtmosphereSettings},
    prelude::*,
};

use crate::{
    FrameSet,
    player::{LastFrame, to_bevy_quat, to_bevy_vec},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, follow_rig.in_set(FrameSet::Camera));
}

/// Where the camera sits until the first frame resolves a rig pose.
const CAMERA_START: Vec3 = Vec3::new(0.0, 3.0, 6.0);

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 16.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                1000.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
        AtmosphereSettings {
            rendering_method: AtmosphereMode::Raymarched,
            ..default()
        },
    ));
}

/// Copies the rig pose resolved this frame onto the render camera.
fn follow_rig(
    last_frame: Res<LastFrame>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
) {
    let Some(frame) = last_frame.0 else {
        return;
    };
    let Ok(mut cam_tf) = camera_query.single_mut() else {
        return;
    };

    cam_tf.translation = to_bevy_vec(frame.camera.position);
    cam_tf.rotation = to_bevy_quat(frame.camera.orientation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BodyPose, CameraPose, FrameReport, TickOutcome};

    #[test]
    fn camera_waits_for_a_frame_then_follows_the_rig() {
        let mut app = App::new();
        app.init_resource::<LastFrame>();
        app.add_systems(Update, follow_rig);
        let camera = app
            .world_mut()
            .spawn((Camera3d::default(), Transform::from_translation(CAMERA_START)))
            .id();

        app.update();
        assert_eq!(
            app.world().get::<Transform>(camera).unwrap().translation,
            CAMERA_START
        );

        let pose = CameraPose {
            position: shared::Vec3::new(1.0, 2.0, 3.0),
            orientation: shared::Quat::from_axis_angle(&shared::Vec3::y_axis(), 0.5),
        };
        app.world_mut().resource_mut::<LastFrame>().0 = Some(FrameReport {
            outcome: TickOutcome::NotReady,
            camera: pose,
            body: BodyPose::from_yaw(shared::Vec3::zeros(), 0.0),
            synced: false,
        });
        app.update();

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
    }
}
