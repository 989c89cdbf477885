use crate::model::{DealId, RegionId};

pub mod canvas;
pub mod panel;
pub mod view;

pub use canvas::{CanvasConfig, CanvasController, CanvasState, GestureOutcome};
pub use panel::{PanelConfig, SnapPanel, SnapPoint, nearest_snap};
pub use view::{MapStyle, MapView};

pub type PointerId = i32;

/// Keys the controllers react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    ArrowUp,
    ArrowDown,
    Escape,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }

    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// What a pointer press landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
    Canvas,
    Region(RegionId),
    Marker(DealId),
    Control,
}

impl PointerTarget {
    /// Presses on interactive children never arm a pan.
    pub fn is_interactive(&self) -> bool {
        matches!(self, PointerTarget::Marker(_) | PointerTarget::Control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("Enter"), Key::Enter);
        assert_eq!(Key::from_dom(" "), Key::Space);
        assert_eq!(Key::from_dom("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::from_dom("Down"), Key::ArrowDown);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("a"), Key::Other);
        assert!(Key::Space.activates());
        assert!(!Key::ArrowUp.activates());
    }

    #[test]
    fn test_interactive_targets() {
        assert!(PointerTarget::Marker("d".to_string()).is_interactive());
        assert!(PointerTarget::Control.is_interactive());
        assert!(!PointerTarget::Canvas.is_interactive());
        assert!(!PointerTarget::Region("r".to_string()).is_interactive());
    }
}
