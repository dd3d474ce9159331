//! studio-editor: headless canvas editor for the studio app.
//!
//! The hosting view feeds pointer events in and draws `current_objects()`;
//! everything else (history, slides, persistence) lives behind
//! [`CanvasEditor`].

pub mod config;
pub mod editor;
pub mod logging;

pub use config::{load_config, EditorConfig, DEFAULT_STORAGE_KEY};
pub use editor::{CanvasEditor, Commit, Eraser, ImageTool, Move, Pen, Recolor, TextTool, Tool};
