// Editor module: the canvas editor root and its tools.

pub mod canvas;
pub mod tools;

pub use canvas::CanvasEditor;
pub use tools::{Commit, Eraser, ImageTool, Move, Pen, Recolor, TextTool, Tool};
