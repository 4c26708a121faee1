use serde::{Deserialize, Serialize};

/// A discrete, edge-triggered command produced by the platform layer.
///
/// The scene consumes actions, never raw key events, so the desktop window and
/// the headless CLI drive the same logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Make the next camera in the list active (wraps around).
    NextCamera,
    /// Make the previous camera in the list active (wraps around).
    PreviousCamera,
    /// Show or hide the debug overlay.
    ToggleOverlay,
    /// Leave the application.
    Quit,
}

/// A continuous movement input that stays active while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveAction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl MoveAction {
    pub const ALL: [MoveAction; 6] = [
        MoveAction::Forward,
        MoveAction::Backward,
        MoveAction::Left,
        MoveAction::Right,
        MoveAction::Up,
        MoveAction::Down,
    ];

    /// Parse a lowercase name such as `"forward"` or `"up"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "backward" | "back" => Some(Self::Backward),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_action_names_parse() {
        assert_eq!(MoveAction::from_name("forward"), Some(MoveAction::Forward));
        assert_eq!(MoveAction::from_name(" Back "), Some(MoveAction::Backward));
        assert_eq!(MoveAction::from_name("UP"), Some(MoveAction::Up));
        assert_eq!(MoveAction::from_name("sideways"), None);
    }

    #[test]
    fn all_lists_each_move_once() {
        let mut all = MoveAction::ALL.to_vec();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn camera_actions_are_distinct() {
        assert_ne!(Action::NextCamera, Action::PreviousCamera);
        assert!(matches!(Action::Quit, Action::Quit));
    }
}
