//! Frame and entity diagnostics for native dev builds, printed through the log.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin,
    SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;

use crate::{FrameSet, player::CharacterSim};

/// Seconds between character state dumps.
const STATE_LOG_INTERVAL_S: f32 = 2.0;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        LogDiagnosticsPlugin::default(),
    ));

    app.add_systems(Update, log_character_state.after(FrameSet::Simulate));
}

fn log_character_state(time: Res<Time>, sim: Res<CharacterSim>, mut since: Local<f32>) {
    *since += time.delta_secs();
    if *since < STATE_LOG_INTERVAL_S {
        return;
    }
    *since = 0.0;

    let Some(handle) = sim.player else {
        return;
    };
    if let (Ok(state), Ok(mode), Ok(locomotion)) = (
        sim.sim.character_state(handle),
        sim.sim.camera_mode(handle),
        sim.sim.locomotion(handle),
    ) {
        debug!(
            "Character {}: pos {:?} vel {:?} grounded {} camera {mode:?} {locomotion:?}",
            handle.id(),
            state.position,
            state.velocity,
            state.is_grounded
        );
    }
}
