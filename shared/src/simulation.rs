//! Host-facing simulation: owns the physics adapter and every spawned character.
//!
//! A frame runs in a fixed order (see [`Simulation::run_frame`]):
//! input snapshot -> controller update -> camera resolve -> world step -> visual sync.
//! Hosts that drive the pieces themselves call [`Simulation::tick`] and
//! [`Simulation::step_world`] in that order, stepping the world exactly once per frame.

use std::collections::BTreeMap;

use crate::{
    camera::{CameraMode, CameraPose, CameraRig},
    config::{CameraConfig, CharacterConfig},
    controller::{CharacterController, CharacterState, UpdateReport},
    error::SimError,
    input::{InputState, MoveIntent},
    locomotion::{AnimationTrigger, Locomotion, LocomotionState},
    math::{Quat, Vec3, clamp_delta, yaw_of},
    physics::PhysicsAdapter,
    visual_sync::{BodyPose, RenderTarget, sync_visual},
};

/// Opaque id of a spawned character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterHandle(u32);

impl CharacterHandle {
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub update: UpdateReport,
    /// Set when the locomotion state changed this tick.
    pub animation: Option<AnimationTrigger>,
    pub camera_mode: CameraMode,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// World geometry is still loading. Nothing was mutated.
    NotReady,
    Advanced(TickReport),
}

impl TickOutcome {
    #[inline]
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }
}

/// Result of a full [`Simulation::run_frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub outcome: TickOutcome,
    pub camera: CameraPose,
    pub body: BodyPose,
    /// Whether the render target existed and received the body pose.
    pub synced: bool,
}

struct Character {
    controller: CharacterController,
    camera: CameraRig,
    locomotion: Locomotion,
}

pub struct Simulation<A: PhysicsAdapter> {
    adapter: A,
    characters: BTreeMap<CharacterHandle, Character>,
    next_handle: u32,
    /// Last readiness observed by `tick`, used to log transitions once.
    was_ready: bool,
}

impl<A: PhysicsAdapter> Simulation<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            characters: BTreeMap::new(),
            next_handle: 0,
            was_ready: false,
        }
    }

    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable access for hosts that load world geometry into the adapter.
    #[inline]
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Creates a character at `position` facing the yaw of `orientation`.
    ///
    /// Both configs are validated first; an invalid one fails without touching the adapter.
    pub fn spawn(
        &mut self,
        position: Vec3,
        orientation: Quat,
        config: CharacterConfig,
        camera: CameraConfig,
    ) -> Result<CharacterHandle, SimError> {
        if let Err(err) = config.validate().and_then(|()| camera.validate()) {
            log::error!("Rejected character spawn: {err}");
            return Err(err.into());
        }

        let initial_yaw = yaw_of(&orientation).unwrap_or(0.0);
        let mut camera = CameraRig::new(camera, initial_yaw)?;
        let controller =
            CharacterController::spawn(&mut self.adapter, position, &orientation, config)?;
        let state = controller.state();
        camera.resolve_pose(state.position, state.body_yaw);

        let handle = CharacterHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.characters.insert(
            handle,
            Character {
                controller,
                camera,
                locomotion: Locomotion::default(),
            },
        );
        log::info!("Spawned character {} at {position:?}", handle.0);
        Ok(handle)
    }

    /// Removes a character and its capsule.
    pub fn despawn(&mut self, handle: CharacterHandle) -> Result<(), SimError> {
        let character = self
            .characters
            .remove(&handle)
            .ok_or(SimError::UnknownCharacter(handle))?;
        character.controller.despawn(&mut self.adapter);
        log::info!("Despawned character {}", handle.0);
        Ok(())
    }

    fn character(&self, handle: CharacterHandle) -> Result<&Character, SimError> {
        self.characters
            .get(&handle)
            .ok_or(SimError::UnknownCharacter(handle))
    }

    /// Advances one character by one frame.
    ///
    /// `delta` is clamped to `[0, MAX_FRAME_DT_S]`. While the world is not ready the tick is
    /// a no-op: look deltas are dropped and a pending jump stays pending.
    pub fn tick(
        &mut self,
        handle: CharacterHandle,
        intent: &mut MoveIntent,
        delta: f32,
    ) -> Result<TickOutcome, SimError> {
        let character = self
            .characters
            .get_mut(&handle)
            .ok_or(SimError::UnknownCharacter(handle))?;

        let ready = self.adapter.is_ready();
        if ready != self.was_ready {
            log::debug!("Physics world ready: {ready}");
            self.was_ready = ready;
        }
        if !ready {
            return Ok(TickOutcome::NotReady);
        }

        let dt = clamp_delta(delta);
        character.camera.apply_look(intent.yaw_delta, intent.pitch_delta);
        let Some(update) = character.controller.update(
            &mut self.adapter,
            intent,
            &character.camera.orientation(),
            dt,
        ) else {
            return Ok(TickOutcome::NotReady);
        };

        let state = character.controller.state();
        character.camera.resolve_pose(state.position, state.body_yaw);
        let animation = character.locomotion.update(intent);

        Ok(TickOutcome::Advanced(TickReport {
            update,
            animation,
            camera_mode: character.camera.mode(),
        }))
    }

    /// Advances the physics world. Call exactly once per frame, after every `tick`.
    pub fn step_world(&mut self, delta: f32) {
        self.adapter.step(clamp_delta(delta));
    }

    pub fn on_zoom_input(&mut self, handle: CharacterHandle, scroll: f32) -> Result<(), SimError> {
        let character = self
            .characters
            .get_mut(&handle)
            .ok_or(SimError::UnknownCharacter(handle))?;
        character.camera.on_zoom_input(scroll);
        let state = character.controller.state();
        character.camera.resolve_pose(state.position, state.body_yaw);
        Ok(())
    }

    pub fn camera_pose(&self, handle: CharacterHandle) -> Result<CameraPose, SimError> {
        Ok(self.character(handle)?.camera.pose())
    }

    pub fn body_pose(&self, handle: CharacterHandle) -> Result<BodyPose, SimError> {
        let state = self.character(handle)?.controller.state();
        Ok(BodyPose::from_yaw(state.position, state.body_yaw))
    }

    pub fn character_state(&self, handle: CharacterHandle) -> Result<CharacterState, SimError> {
        Ok(*self.character(handle)?.controller.state())
    }

    pub fn camera_mode(&self, handle: CharacterHandle) -> Result<CameraMode, SimError> {
        Ok(self.character(handle)?.camera.mode())
    }

    pub fn locomotion(&self, handle: CharacterHandle) -> Result<LocomotionState, SimError> {
        Ok(self.character(handle)?.locomotion.current())
    }

    /// Runs one full frame for `handle`.
    ///
    /// Order: input snapshot, controller update, camera resolve, world step, visual sync.
    /// The world is stepped exactly once, even when the tick is a no-op. Hosts with more
    /// than one character use [`Simulation::run_frame_all`] so the world still steps once.
    pub fn run_frame<T: RenderTarget + ?Sized>(
        &mut self,
        handle: CharacterHandle,
        input: &mut InputState,
        raw_delta: f32,
        target: Option<&mut T>,
    ) -> Result<FrameReport, SimError> {
        let mut frame = [(handle, input, target)];
        let mut reports = self.run_frame_all(&mut frame, raw_delta)?;
        reports.pop().ok_or(SimError::UnknownCharacter(handle))
    }

    /// Runs one full frame for every listed character.
    ///
    /// Every character is ticked, then the world is stepped once, then each input is
    /// acknowledged and each pose synced. The world steps even when a tick fails; the first
    /// failure is returned after the step.
    pub fn run_frame_all<T: RenderTarget + ?Sized>(
        &mut self,
        characters: &mut [(CharacterHandle, &mut InputState, Option<&mut T>)],
        raw_delta: f32,
    ) -> Result<Vec<FrameReport>, SimError> {
        let dt = clamp_delta(raw_delta);
        let mut ticked = Vec::with_capacity(characters.len());
        for (handle, input, _) in characters.iter_mut() {
            let mut intent = input.snapshot();
            let outcome = self.tick(*handle, &mut intent, dt);
            ticked.push((intent, outcome));
        }
        self.step_world(dt);

        let mut reports = Vec::with_capacity(characters.len());
        for ((handle, input, target), (intent, outcome)) in characters.iter_mut().zip(ticked) {
            let outcome = outcome?;
            input.acknowledge(&intent);

            let camera = self.camera_pose(*handle)?;
            let body = self.body_pose(*handle)?;
            let synced = sync_visual(&body, target.as_deref_mut());
            reports.push(FrameReport {
                outcome,
                camera,
                body,
                synced,
            });
        }
        Ok(reports)
    }
}
