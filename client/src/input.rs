use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use leafwing_input_manager::prelude::*;
use shared::{InputState, Key};

use crate::{FrameSet, config::ClientConfig};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
    /// Locks the pointer so mouse motion turns the camera.
    Capture,
    /// Releases the pointer.
    Release,
}

impl InputAction {
    /// The core key this action drives, if it is a movement key.
    fn key(self) -> Option<Key> {
        match self {
            InputAction::Forward => Some(Key::Forward),
            InputAction::Backward => Some(Key::Backward),
            InputAction::Left => Some(Key::Left),
            InputAction::Right => Some(Key::Right),
            InputAction::Jump => Some(Key::Jump),
            InputAction::Sprint => Some(Key::Sprint),
            InputAction::Capture | InputAction::Release => None,
        }
    }

    const KEYS: [InputAction; 6] = [
        InputAction::Forward,
        InputAction::Backward,
        InputAction::Left,
        InputAction::Right,
        InputAction::Jump,
        InputAction::Sprint,
    ];
}

/// The player's input state, fed from window events and drained once per frame.
#[derive(Resource, Default)]
pub struct PlayerInput(pub InputState);

/// Scroll accumulated this frame, in notches. Positive zooms out.
#[derive(Resource, Default)]
pub struct ZoomInput(pub f32);

/// Pixel scroll deltas per notch on touchpads and browsers.
const PIXELS_PER_NOTCH: f32 = 100.0;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Forward, KeyCode::ArrowUp);
    input_map.insert(InputAction::Backward, KeyCode::KeyS);
    input_map.insert(InputAction::Backward, KeyCode::ArrowDown);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Left, KeyCode::ArrowLeft);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Right, KeyCode::ArrowRight);
    input_map.insert(InputAction::Jump, KeyCode::Space);
    input_map.insert(InputAction::Sprint, KeyCode::ShiftLeft);
    input_map.insert(InputAction::Capture, MouseButton::Left);
    input_map.insert(InputAction::Release, KeyCode::Escape);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.init_resource::<ZoomInput>();
    app.add_systems(Startup, init_player_input);
    app.add_systems(
        Update,
        (collect_keys, toggle_capture, collect_pointer)
            .chain()
            .in_set(FrameSet::Input),
    );
}

fn init_player_input(mut commands: Commands, config: Res<ClientConfig>) {
    commands.insert_resource(PlayerInput(InputState::new(config.camera.look_sensitivity)));
}

fn collect_keys(actions: Res<ActionState<InputAction>>, mut input: ResMut<PlayerInput>) {
    for action in InputAction::KEYS {
        let Some(key) = action.key() else {
            continue;
        };
        if actions.just_pressed(&action) {
            input.0.press(key);
        } else if actions.just_released(&action) {
            input.0.release(key);
        }
    }
}

fn toggle_capture(
    actions: Res<ActionState<InputAction>>,
    mut input: ResMut<PlayerInput>,
    cursor: Option<Single<&mut CursorOptions, With<PrimaryWindow>>>,
) {
    let capture = if actions.just_pressed(&InputAction::Capture) {
        true
    } else if actions.just_pressed(&InputAction::Release) {
        false
    } else {
        return;
    };
    if capture == input.0.pointer_captured() {
        return;
    }

    input.0.set_pointer_captured(capture);
    if let Some(mut cursor) = cursor {
        cursor.grab_mode = if capture {
            CursorGrabMode::Locked
        } else {
            CursorGrabMode::None
        };
        cursor.visible = !capture;
    }
    debug!("Pointer captured: {capture}");
}

fn collect_pointer(
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut input: ResMut<PlayerInput>,
    mut zoom: ResMut<ZoomInput>,
) {
    if motion.delta != Vec2::ZERO {
        input.0.pointer_motion(motion.delta.x, motion.delta.y);
    }

    // Scrolling down (negative y) pulls the camera back.
    let notches = match scroll.unit {
        MouseScrollUnit::Line => -scroll.delta.y,
        MouseScrollUnit::Pixel => -scroll.delta.y / PIXELS_PER_NOTCH,
    };
    zoom.0 += notches;
}
