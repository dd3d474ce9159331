// Canvas tools. A tool turns pointer events into snapshots for the active
// slide's history; it never touches the history itself.

use egui::{Color32, Pos2, Vec2};
use studio_core::edit::{with_added, with_replaced, with_translated, without};
use studio_core::{
    hit_test, position_of, CanvasObject, ImageObject, ObjectId, PathObject, TextObject,
};
use tracing::{debug, trace};

/// A snapshot a tool wants recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub objects: Vec<CanvasObject>,
    /// Replace the visible entry instead of appending one.
    pub overwrite_last: bool,
}

impl Commit {
    pub fn new(objects: Vec<CanvasObject>) -> Self {
        Self {
            objects,
            overwrite_last: false,
        }
    }

    pub fn overwrite(objects: Vec<CanvasObject>) -> Self {
        Self {
            objects,
            overwrite_last: true,
        }
    }
}

pub trait Tool {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit>;

    fn pointer_move(&mut self, _objects: &[CanvasObject], _pos: Pos2) -> Option<Commit> {
        None
    }

    fn pointer_up(&mut self, _objects: &[CanvasObject], _pos: Pos2) -> Option<Commit> {
        None
    }

    /// Drop any gesture in progress, e.g. when the active slide changes.
    fn cancel(&mut self) {}

    fn name(&self) -> &str;

    fn cursor_size(&self) -> f32 {
        1.0
    }
}

/// Freehand drawing. The stroke is appended on press and then grown in place
/// while dragging, so one stroke is one undo step.
#[derive(Debug, Clone)]
pub struct Pen {
    pub color: Color32,
    pub width: f32,
    stroke: Option<PathObject>,
}

impl Pen {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            color,
            width,
            stroke: None,
        }
    }
}

impl Tool for Pen {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let stroke = PathObject::new(vec![pos], self.color, self.width);
        debug!(id = %stroke.id, "pen stroke started");
        let next = with_added(objects, stroke.clone().into());
        self.stroke = Some(stroke);
        Some(Commit::new(next))
    }

    fn pointer_move(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let stroke = self.stroke.as_mut()?;
        if position_of(objects, stroke.id).is_none() {
            trace!(id = %stroke.id, "stroke not on this canvas, ignoring move");
            return None;
        }
        if stroke.points.last() == Some(&pos) {
            return None;
        }
        stroke.points.push(pos);
        trace!(points = stroke.points.len(), "pen stroke extended");
        Some(Commit::overwrite(with_replaced(objects, stroke.clone().into())))
    }

    fn pointer_up(&mut self, _objects: &[CanvasObject], _pos: Pos2) -> Option<Commit> {
        if let Some(stroke) = self.stroke.take() {
            debug!(id = %stroke.id, points = stroke.points.len(), "pen stroke finished");
        }
        None
    }

    fn cancel(&mut self) {
        if let Some(stroke) = self.stroke.take() {
            debug!(id = %stroke.id, "pen stroke cancelled");
        }
    }

    fn name(&self) -> &str {
        "Pen"
    }

    fn cursor_size(&self) -> f32 {
        self.width
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    id: ObjectId,
    last: Pos2,
    moved: bool,
}

/// Drags the object under the pointer. The first movement is a new undo
/// step; later frames overwrite it.
#[derive(Debug, Clone, Default)]
pub struct Move {
    drag: Option<Drag>,
}

impl Move {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for Move {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        self.drag = hit_test(objects, pos).map(|hit| Drag {
            id: hit.id(),
            last: pos,
            moved: false,
        });
        if let Some(drag) = &self.drag {
            debug!(id = %drag.id, "drag started");
        }
        None
    }

    fn pointer_move(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let drag = self.drag.as_mut()?;
        if position_of(objects, drag.id).is_none() {
            trace!(id = %drag.id, "dragged object not on this canvas, ignoring move");
            return None;
        }
        let delta: Vec2 = pos - drag.last;
        if delta == Vec2::ZERO {
            return None;
        }

        let next = with_translated(objects, drag.id, delta);
        let commit = Commit {
            objects: next,
            overwrite_last: drag.moved,
        };
        drag.last = pos;
        drag.moved = true;
        trace!(id = %drag.id, dx = delta.x, dy = delta.y, "drag frame");
        Some(commit)
    }

    fn pointer_up(&mut self, _objects: &[CanvasObject], _pos: Pos2) -> Option<Commit> {
        self.drag = None;
        None
    }

    fn cancel(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!(id = %drag.id, "drag cancelled");
        }
    }

    fn name(&self) -> &str {
        "Move"
    }
}

/// Places a text label where the pointer goes down.
#[derive(Debug, Clone)]
pub struct TextTool {
    pub content: String,
    pub font_size: f32,
    pub color: Color32,
}

impl TextTool {
    pub fn new(content: impl Into<String>, font_size: f32, color: Color32) -> Self {
        Self {
            content: content.into(),
            font_size,
            color,
        }
    }
}

impl Tool for TextTool {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let text = TextObject::new(self.content.clone(), pos, self.font_size, self.color);
        debug!(id = %text.id, "text placed");
        Some(Commit::new(with_added(objects, text.into())))
    }

    fn name(&self) -> &str {
        "Text"
    }
}

/// Places an image with its top-left corner at the pointer.
#[derive(Debug, Clone)]
pub struct ImageTool {
    pub src: String,
    pub size: Vec2,
}

impl ImageTool {
    pub fn new(src: impl Into<String>, size: Vec2) -> Self {
        Self {
            src: src.into(),
            size,
        }
    }
}

impl Tool for ImageTool {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let image = ImageObject::new(self.src.clone(), pos, self.size);
        debug!(id = %image.id, "image placed");
        Some(Commit::new(with_added(objects, image.into())))
    }

    fn name(&self) -> &str {
        "Image"
    }
}

/// Removes the top-most object under the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eraser;

impl Tool for Eraser {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let Some(hit) = hit_test(objects, pos) else {
            trace!(x = pos.x, y = pos.y, "eraser hit nothing");
            return None;
        };
        debug!(id = %hit.id(), kind = hit.kind(), "object erased");
        Some(Commit::new(without(objects, hit.id())))
    }

    fn name(&self) -> &str {
        "Eraser"
    }
}

/// Recolours the top-most object under the pointer.
#[derive(Debug, Clone)]
pub struct Recolor {
    pub color: Color32,
}

impl Recolor {
    pub fn new(color: Color32) -> Self {
        Self { color }
    }
}

impl Tool for Recolor {
    fn pointer_down(&mut self, objects: &[CanvasObject], pos: Pos2) -> Option<Commit> {
        let hit = hit_test(objects, pos)?;
        let recolored = hit.recolored(self.color);
        // Images have no colour; don't record a no-op step
        if &recolored == hit {
            return None;
        }
        debug!(id = %hit.id(), color = ?self.color, "object recolored");
        Some(Commit::new(with_replaced(objects, recolored)))
    }

    fn name(&self) -> &str {
        "Recolor"
    }
}
