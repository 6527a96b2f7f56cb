use crate::input::MoveIntent;

/// Coarse movement state used to drive play/stop animation triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    #[default]
    Idle,
    Walking,
    Running,
}

impl LocomotionState {
    pub fn from_intent(intent: &MoveIntent) -> Self {
        if !intent.has_movement() {
            Self::Idle
        } else if intent.is_sprinting() {
            Self::Running
        } else {
            Self::Walking
        }
    }

    /// Conventional clip name for hosts that look animations up by name.
    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Running => "running",
        }
    }
}

/// Stop the clip for `stop`, then play the clip for `play`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationTrigger {
    pub stop: LocomotionState,
    pub play: LocomotionState,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Locomotion {
    current: LocomotionState,
}

impl Locomotion {
    #[inline]
    pub fn current(&self) -> LocomotionState {
        self.current
    }

    /// Returns a trigger only on a state change.
    pub fn update(&mut self, intent: &MoveIntent) -> Option<AnimationTrigger> {
        let next = LocomotionState::from_intent(intent);
        if next == self.current {
            return None;
        }
        let trigger = AnimationTrigger {
            stop: self.current,
            play: next,
        };
        self.current = next;
        Some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_emit_stop_then_play() {
        let mut locomotion = Locomotion::default();
        let walk = MoveIntent {
            forward: true,
            ..MoveIntent::default()
        };
        let run = MoveIntent {
            sprint: true,
            ..walk
        };

        assert_eq!(
            locomotion.update(&walk),
            Some(AnimationTrigger {
                stop: LocomotionState::Idle,
                play: LocomotionState::Walking,
            })
        );
        // Holding the same keys does not retrigger.
        assert_eq!(locomotion.update(&walk), None);

        assert_eq!(
            locomotion.update(&run),
            Some(AnimationTrigger {
                stop: LocomotionState::Walking,
                play: LocomotionState::Running,
            })
        );
        assert_eq!(
            locomotion.update(&MoveIntent::default()).map(|t| t.play),
            Some(LocomotionState::Idle)
        );
    }

    #[test]
    fn cancelled_keys_are_idle() {
        let intent = MoveIntent {
            left: true,
            right: true,
            sprint: true,
            ..MoveIntent::default()
        };
        assert_eq!(LocomotionState::from_intent(&intent), LocomotionState::Idle);
    }
}
