use crate::action::{Action, MoveAction};
use glam::Vec2;
use std::collections::BTreeSet;

/// Input as seen by one frame's update.
///
/// Captured once per frame from an [`InputState`] and passed explicitly to
/// everything that reads input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    held: BTreeSet<MoveAction>,
    actions: Vec<Action>,
    look_active: bool,
    pointer_delta: Vec2,
}

impl InputSnapshot {
    /// A frame with no input at all.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_held(mut self, action: MoveAction) -> Self {
        self.held.insert(action);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Pointer movement applied while looking is active.
    pub fn with_look(mut self, delta: Vec2) -> Self {
        self.look_active = true;
        self.pointer_delta = delta;
        self
    }

    pub fn is_held(&self, action: MoveAction) -> bool {
        self.held.contains(&action)
    }

    pub fn triggered(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Actions triggered this frame, in the order they arrived.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn look_active(&self) -> bool {
        self.look_active
    }

    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }
}

/// Accumulates platform input between frames.
#[derive(Debug, Default)]
pub struct InputState {
    held: BTreeSet<MoveAction>,
    actions: Vec<Action>,
    look_active: bool,
    pointer_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: MoveAction) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: MoveAction) {
        self.held.remove(&action);
    }

    pub fn trigger(&mut self, action: Action) {
        tracing::debug!(?action, "action triggered");
        self.actions.push(action);
    }

    pub fn set_look_active(&mut self, active: bool) {
        self.look_active = active;
    }

    pub fn look_active(&self) -> bool {
        self.look_active
    }

    /// Pointer motion is only recorded while looking is active.
    pub fn add_pointer_delta(&mut self, dx: f32, dy: f32) {
        if self.look_active {
            self.pointer_delta += Vec2::new(dx, dy);
        }
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.look_active = false;
        self.pointer_delta = Vec2::ZERO;
    }

    /// Capture this frame's input.
    ///
    /// Held movement persists into the next frame; triggered actions and the
    /// accumulated pointer delta are consumed.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.clone(),
            actions: std::mem::take(&mut self.actions),
            look_active: self.look_active,
            pointer_delta: std::mem::take(&mut self.pointer_delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_is_empty() {
        let s = InputSnapshot::idle();
        for m in MoveAction::ALL {
            assert!(!s.is_held(m));
        }
        assert!(s.actions().is_empty());
        assert!(!s.look_active());
        assert_eq!(s.pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn snapshot_builders() {
        let s = InputSnapshot::idle()
            .with_held(MoveAction::Forward)
            .with_action(Action::NextCamera)
            .with_look(Vec2::new(3.0, -2.0));
        assert!(s.is_held(MoveAction::Forward));
        assert!(!s.is_held(MoveAction::Backward));
        assert!(s.triggered(Action::NextCamera));
        assert!(s.look_active());
        assert_eq!(s.pointer_delta(), Vec2::new(3.0, -2.0));
    }

    #[test]
    fn take_snapshot_drains_per_frame_state() {
        let mut state = InputState::new();
        state.press(MoveAction::Left);
        state.trigger(Action::PreviousCamera);
        state.set_look_active(true);
        state.add_pointer_delta(1.0, 2.0);
        state.add_pointer_delta(0.5, -1.0);

        let first = state.take_snapshot();
        assert!(first.is_held(MoveAction::Left));
        assert_eq!(first.actions(), &[Action::PreviousCamera]);
        assert_eq!(first.pointer_delta(), Vec2::new(1.5, 1.0));

        let second = state.take_snapshot();
        assert!(second.is_held(MoveAction::Left));
        assert!(second.actions().is_empty());
        assert_eq!(second.pointer_delta(), Vec2::ZERO);
        assert!(second.look_active());
    }

    #[test]
    fn pointer_ignored_without_look() {
        let mut state = InputState::new();
        state.add_pointer_delta(10.0, 10.0);
        assert_eq!(state.take_snapshot().pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn release_and_clear() {
        let mut state = InputState::new();
        state.press(MoveAction::Up);
        state.press(MoveAction::Down);
        state.release(MoveAction::Up);
        let s = state.take_snapshot();
        assert!(!s.is_held(MoveAction::Up));
        assert!(s.is_held(MoveAction::Down));

        state.set_look_active(true);
        state.clear();
        let s = state.take_snapshot();
        assert!(!s.is_held(MoveAction::Down));
        assert!(!s.look_active());
    }
}
