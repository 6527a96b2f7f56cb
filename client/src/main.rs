// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod config;
mod input;
mod player;
mod world;

#[cfg(target_os = "macos")]
use bevy::window::CompositeAlphaMode;

use bevy::prelude::*;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

/// Ordering of the per-frame work: raw input is collected, the character simulation
/// runs one frame, then the camera copies the resolved pose.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FrameSet {
    Input,
    Simulate,
    Camera,
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Galdoran".to_string(),
                fit_canvas_to_parent: true,
                #[cfg(target_os = "macos")]
                composite_alpha_mode: CompositeAlphaMode::PostMultiplied,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.configure_sets(
            Update,
            (FrameSet::Input, FrameSet::Simulate, FrameSet::Camera).chain(),
        );

        app.add_plugins((
            config::plugin,
            input::plugin,
            world::plugin,
            player::plugin,
            camera::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
