//! Keyboard shortcuts for the zoom viewer.
//!
//! Keys are matched on the DOM `KeyboardEvent.key` string so the same table
//! serves the browser and native drivers.

use crate::viewer::ZoomViewer;
use crate::zoom_math::ViewTransform;

/// An action the viewer performs in response to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    Close,
    ZoomIn,
    ZoomOut,
    Reset,
}

/// Get the viewer command for a key, if any.
pub fn command_for_key(key: &str) -> Option<ViewerCommand> {
    match key {
        "Escape" => Some(ViewerCommand::Close),
        "+" | "=" => Some(ViewerCommand::ZoomIn),
        "-" => Some(ViewerCommand::ZoomOut),
        "0" => Some(ViewerCommand::Reset),
        _ => None,
    }
}

impl ViewerCommand {
    /// Run this command against an open viewer.
    ///
    /// Shortcuts only apply while the viewer is shown; returns `None` otherwise.
    pub fn apply(self, viewer: &mut ZoomViewer) -> Option<ViewTransform> {
        if !viewer.is_open() {
            return None;
        }
        let transform = match self {
            ViewerCommand::Close => viewer.close(),
            ViewerCommand::ZoomIn => viewer.zoom_in(),
            ViewerCommand::ZoomOut => viewer.zoom_out(),
            ViewerCommand::Reset => viewer.reset(),
        };
        log::debug!("Viewer command {:?}", self);
        Some(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom_math::Size;

    #[test]
    fn test_key_table() {
        assert_eq!(command_for_key("Escape"), Some(ViewerCommand::Close));
        assert_eq!(command_for_key("+"), Some(ViewerCommand::ZoomIn));
        assert_eq!(command_for_key("="), Some(ViewerCommand::ZoomIn));
        assert_eq!(command_for_key("-"), Some(ViewerCommand::ZoomOut));
        assert_eq!(command_for_key("0"), Some(ViewerCommand::Reset));
        assert_eq!(command_for_key("a"), None);
    }

    #[test]
    fn test_commands_ignored_while_closed() {
        let mut viewer = ZoomViewer::default();
        assert!(ViewerCommand::ZoomIn.apply(&mut viewer).is_none());
        assert_eq!(viewer.scale(), 1.0);
    }

    #[test]
    fn test_commands_drive_open_viewer() {
        let mut viewer = ZoomViewer::default();
        viewer.open(Size::square(400.0), Size::square(400.0));

        ViewerCommand::ZoomIn.apply(&mut viewer);
        ViewerCommand::ZoomIn.apply(&mut viewer);
        assert_eq!(viewer.scale(), 2.0);

        ViewerCommand::Reset.apply(&mut viewer);
        assert_eq!(viewer.scale(), 1.0);
        assert!(viewer.is_open());

        ViewerCommand::Close.apply(&mut viewer);
        assert!(!viewer.is_open());
    }
}
