//! studio-core: the canvas object model shared by the history and editor crates.
//!
//! Design rules:
//! - Objects are plain values. Identity is the `ObjectId`, nothing else.
//! - The object kinds form a closed set; consumers match exhaustively.
//! - Geometry uses egui's value types so a hosting view can draw them directly.

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod edit;

pub use edit::{hit_test, position_of, ZOrder};

/// Approximate glyph advance relative to the font size, used for text bounds.
const TEXT_ADVANCE: f32 = 0.6;
/// Line height relative to the font size.
const TEXT_LINE_HEIGHT: f32 = 1.2;

/// Unique identifier of a canvas object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathObject {
    pub id: ObjectId,
    pub points: Vec<Pos2>,
    pub stroke: Color32,
    pub stroke_width: f32,
}

impl PathObject {
    pub fn new(points: Vec<Pos2>, stroke: Color32, stroke_width: f32) -> Self {
        Self {
            id: ObjectId::new(),
            points,
            stroke,
            stroke_width,
        }
    }
}

/// A placed image. `src` is opaque to us (URL or data URI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    pub id: ObjectId,
    pub src: String,
    pub position: Pos2,
    pub size: Vec2,
}

impl ImageObject {
    pub fn new(src: impl Into<String>, position: Pos2, size: Vec2) -> Self {
        Self {
            id: ObjectId::new(),
            src: src.into(),
            position,
            size,
        }
    }
}

/// A text label anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    pub id: ObjectId,
    pub content: String,
    pub position: Pos2,
    pub font_size: f32,
    pub color: Color32,
}

impl TextObject {
    pub fn new(content: impl Into<String>, position: Pos2, font_size: f32, color: Color32) -> Self {
        Self {
            id: ObjectId::new(),
            content: content.into(),
            position,
            font_size,
            color,
        }
    }
}

/// Anything that can live on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasObject {
    Path(PathObject),
    Image(ImageObject),
    Text(TextObject),
}

impl CanvasObject {
    pub fn id(&self) -> ObjectId {
        match self {
            CanvasObject::Path(p) => p.id,
            CanvasObject::Image(i) => i.id,
            CanvasObject::Text(t) => t.id,
        }
    }

    /// Short kind name, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CanvasObject::Path(_) => "path",
            CanvasObject::Image(_) => "image",
            CanvasObject::Text(_) => "text",
        }
    }

    /// Axis-aligned bounds used for hit testing.
    ///
    /// Text has no font metrics here, so its box is estimated from the
    /// character count and the font size.
    pub fn bounds(&self) -> Rect {
        match self {
            CanvasObject::Path(p) => {
                if p.points.is_empty() {
                    return Rect::NOTHING;
                }
                Rect::from_points(&p.points).expand(p.stroke_width / 2.0)
            }
            CanvasObject::Image(i) => Rect::from_min_size(i.position, i.size),
            CanvasObject::Text(t) => {
                let longest = t
                    .content
                    .lines()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                let lines = t.content.lines().count().max(1);
                let size = Vec2::new(
                    longest as f32 * t.font_size * TEXT_ADVANCE,
                    lines as f32 * t.font_size * TEXT_LINE_HEIGHT,
                );
                Rect::from_min_size(t.position, size)
            }
        }
    }

    /// A copy of this object moved by `delta`. The id is kept.
    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            CanvasObject::Path(p) => CanvasObject::Path(PathObject {
                points: p.points.iter().map(|pt| *pt + delta).collect(),
                ..p.clone()
            }),
            CanvasObject::Image(i) => CanvasObject::Image(ImageObject {
                position: i.position + delta,
                ..i.clone()
            }),
            CanvasObject::Text(t) => CanvasObject::Text(TextObject {
                position: t.position + delta,
                ..t.clone()
            }),
        }
    }

    /// A copy with its stroke or text colour replaced. Images have no colour
    /// and come back unchanged.
    pub fn recolored(&self, color: Color32) -> Self {
        match self {
            CanvasObject::Path(p) => CanvasObject::Path(PathObject {
                stroke: color,
                ..p.clone()
            }),
            CanvasObject::Image(_) => self.clone(),
            CanvasObject::Text(t) => CanvasObject::Text(TextObject {
                color,
                ..t.clone()
            }),
        }
    }

    /// Check geometry and style values before they reach a history.
    pub fn validate(&self) -> Result<(), ObjectError> {
        let id = self.id();
        match self {
            CanvasObject::Path(p) => {
                if p.points.is_empty() {
                    return Err(ObjectError::EmptyPath { id });
                }
                if p.points.iter().any(|pt| !pt.is_finite()) {
                    return Err(ObjectError::NonFiniteGeometry { id });
                }
                if !(p.stroke_width.is_finite() && p.stroke_width > 0.0) {
                    return Err(ObjectError::InvalidStrokeWidth {
                        id,
                        width: p.stroke_width,
                    });
                }
            }
            CanvasObject::Image(i) => {
                if i.src.trim().is_empty() {
                    return Err(ObjectError::EmptySource { id });
                }
                if !(i.position.is_finite() && i.size.is_finite()) {
                    return Err(ObjectError::NonFiniteGeometry { id });
                }
                if i.size.x <= 0.0 || i.size.y <= 0.0 {
                    return Err(ObjectError::InvalidSize {
                        id,
                        width: i.size.x,
                        height: i.size.y,
                    });
                }
            }
            CanvasObject::Text(t) => {
                if !t.position.is_finite() {
                    return Err(ObjectError::NonFiniteGeometry { id });
                }
                if !(t.font_size.is_finite() && t.font_size > 0.0) {
                    return Err(ObjectError::InvalidFontSize {
                        id,
                        size: t.font_size,
                    });
                }
            }
        }
        Ok(())
    }
}

impl From<PathObject> for CanvasObject {
    fn from(value: PathObject) -> Self {
        CanvasObject::Path(value)
    }
}

impl From<ImageObject> for CanvasObject {
    fn from(value: ImageObject) -> Self {
        CanvasObject::Image(value)
    }
}

impl From<TextObject> for CanvasObject {
    fn from(value: TextObject) -> Self {
        CanvasObject::Text(value)
    }
}

/// Object validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ObjectError {
    #[error("object {id}: path has no points")]
    EmptyPath { id: ObjectId },

    #[error("object {id}: coordinates must be finite")]
    NonFiniteGeometry { id: ObjectId },

    #[error("object {id}: invalid stroke width {width}")]
    InvalidStrokeWidth { id: ObjectId, width: f32 },

    #[error("object {id}: image source is empty")]
    EmptySource { id: ObjectId },

    #[error("object {id}: invalid image size {width}x{height}")]
    InvalidSize {
        id: ObjectId,
        width: f32,
        height: f32,
    },

    #[error("object {id}: invalid font size {size}")]
    InvalidFontSize { id: ObjectId, size: f32 },
}
