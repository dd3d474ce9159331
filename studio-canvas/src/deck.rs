//! Slides and the deck that owns them.
//!
//! Every slide owns exactly one [`HistoryState`]. Deleting a slide drops its
//! history with it; nothing is shared between slides.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::history::restore_index;
use crate::HistoryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub Uuid);

impl SlideId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SlideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One canvas page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub name: String,
    #[serde(default)]
    pub history: HistoryState,
}

impl Slide {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SlideId::new(),
            name: name.into(),
            history: HistoryState::new(),
        }
    }

    fn with_history(name: String, history: HistoryState) -> Self {
        Self {
            id: SlideId::new(),
            name,
            history,
        }
    }
}

/// An ordered set of slides with one of them active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedDeck")]
pub struct Deck {
    pub deck_id: Uuid,
    slides: Vec<Slide>,
    active: usize,

    /// History limit handed to newly created slides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history_limit: Option<usize>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// A deck with a single empty slide.
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    pub fn with_history_limit(history_limit: Option<usize>) -> Self {
        let deck_id = Uuid::new_v4();
        tracing::info!(deck_id = %deck_id, ?history_limit, "creating new deck");

        let first = Slide::with_history(default_slide_name(0), fresh_history(history_limit));
        Self {
            deck_id,
            slides: vec![first],
            active: 0,
            history_limit,
        }
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    /// Apply a history limit to every slide, present and future. Existing
    /// histories longer than the limit lose their oldest entries.
    pub fn set_history_limit(&mut self, history_limit: Option<usize>) {
        tracing::debug!(deck_id = %self.deck_id, ?history_limit, "setting history limit");
        self.history_limit = history_limit;
        for slide in &mut self.slides {
            slide.history.set_limit(history_limit);
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_slide(&self) -> &Slide {
        &self.slides[self.active]
    }

    pub fn active_slide_mut(&mut self) -> &mut Slide {
        &mut self.slides[self.active]
    }

    pub fn slide(&self, id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.id == id)
    }

    /// Append a slide and make it active. An empty name gets a numbered default.
    pub fn add_slide(&mut self, name: impl Into<String>) -> SlideId {
        let mut name = name.into();
        if name.trim().is_empty() {
            name = default_slide_name(self.slides.len());
        }

        let slide = Slide::with_history(name, fresh_history(self.history_limit));
        let id = slide.id;
        self.slides.push(slide);
        self.active = self.slides.len() - 1;

        tracing::info!(
            deck_id = %self.deck_id,
            slide_id = %id,
            total_slides = self.slides.len(),
            "slide added"
        );
        id
    }

    /// Remove a slide together with its history.
    pub fn delete_slide(&mut self, id: SlideId) -> Result<(), DeckError> {
        let index = self.position(id)?;
        if self.slides.len() == 1 {
            tracing::warn!(slide_id = %id, "refusing to delete the last slide");
            return Err(DeckError::LastSlide);
        }

        let removed = self.slides.remove(index);
        if index < self.active || self.active >= self.slides.len() {
            self.active -= 1;
        }

        tracing::info!(
            deck_id = %self.deck_id,
            slide_id = %removed.id,
            dropped_entries = removed.history.len(),
            active = self.active,
            "slide deleted"
        );
        Ok(())
    }

    pub fn select_slide(&mut self, id: SlideId) -> Result<(), DeckError> {
        self.active = self.position(id)?;
        tracing::debug!(slide_id = %id, active = self.active, "slide selected");
        Ok(())
    }

    pub fn rename_slide(&mut self, id: SlideId, name: impl Into<String>) -> Result<(), DeckError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DeckError::EmptyName);
        }
        let index = self.position(id)?;
        self.slides[index].name = name;
        Ok(())
    }

    /// Move a slide to `to` (clamped to the end). The active slide stays active.
    pub fn move_slide(&mut self, id: SlideId, to: usize) -> Result<(), DeckError> {
        let from = self.position(id)?;
        let to = to.min(self.slides.len() - 1);
        if from == to {
            return Ok(());
        }

        let active_id = self.active_slide().id;
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        self.active = self.position(active_id)?;

        tracing::debug!(slide_id = %id, from, to, "slide moved");
        Ok(())
    }

    fn position(&self, id: SlideId) -> Result<usize, DeckError> {
        self.slides
            .iter()
            .position(|s| s.id == id)
            .ok_or(DeckError::UnknownSlide { slide_id: id })
    }
}

fn default_slide_name(index: usize) -> String {
    format!("Slide {}", index + 1)
}

fn fresh_history(limit: Option<usize>) -> HistoryState {
    match limit {
        Some(limit) => HistoryState::with_limit(limit),
        None => HistoryState::new(),
    }
}

/// Deck-level errors.
#[derive(Debug, Error, PartialEq)]
pub enum DeckError {
    #[error("unknown slide_id: {slide_id}")]
    UnknownSlide { slide_id: SlideId },

    #[error("cannot delete the last slide")]
    LastSlide,

    #[error("slide name cannot be empty")]
    EmptyName,
}

#[derive(Deserialize)]
struct PersistedDeck {
    #[serde(default = "Uuid::new_v4")]
    deck_id: Uuid,
    #[serde(default)]
    slides: Vec<Slide>,
    #[serde(default)]
    active: f64,
    #[serde(default)]
    history_limit: Option<usize>,
}

impl From<PersistedDeck> for Deck {
    fn from(raw: PersistedDeck) -> Self {
        let mut slides = raw.slides;
        if slides.is_empty() {
            tracing::warn!(deck_id = %raw.deck_id, "restored deck has no slides, adding one");
            slides.push(Slide::with_history(
                default_slide_name(0),
                fresh_history(raw.history_limit),
            ));
        }

        let active = restore_index(raw.active, slides.len());
        if active as f64 != raw.active {
            tracing::warn!(
                deck_id = %raw.deck_id,
                active = raw.active,
                clamped = active,
                "restored active slide out of range"
            );
        }

        Self {
            deck_id: raw.deck_id,
            slides,
            active,
            history_limit: raw.history_limit,
        }
    }
}
