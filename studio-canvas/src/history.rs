//! Snapshot undo/redo history for one canvas surface.
//!
//! The history is a linear list of snapshots with a pointer at the visible
//! one. Committing after an undo discards the undone entries. Undo and redo
//! at the ends are silent no-ops.

use serde::{Deserialize, Serialize};
use studio_core::CanvasObject;
use tracing::{debug, trace, warn};

/// One immutable snapshot of the canvas object list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    objects: Vec<CanvasObject>,
}

impl HistoryEntry {
    pub fn new(objects: Vec<CanvasObject>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }
}

/// Undo/redo state of a single slide.
///
/// Always holds at least one entry, and `index` always points at one of them.
/// Deserialising goes through [`PersistedHistory`], which repairs blobs that
/// break either rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedHistory")]
pub struct HistoryState {
    #[serde(rename = "history")]
    entries: Vec<HistoryEntry>,

    #[serde(rename = "history_index")]
    index: usize,

    /// Max retained entries; `None` keeps everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryState {
    /// A fresh history seeded with one empty snapshot.
    pub fn new() -> Self {
        Self {
            entries: vec![HistoryEntry::default()],
            index: 0,
            limit: None,
        }
    }

    /// Like [`HistoryState::new`], but keeps at most `limit` entries
    /// (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new()
        }
    }

    /// Record a new snapshot.
    ///
    /// With `overwrite_last` the visible entry is replaced in place, which is
    /// what continuous edits such as dragging use so that every frame does not
    /// become its own undo step. Otherwise everything after the pointer is
    /// dropped and the snapshot is appended.
    pub fn commit(&mut self, objects: Vec<CanvasObject>, overwrite_last: bool) {
        if overwrite_last {
            trace!(
                index = self.index,
                objects = objects.len(),
                "overwriting current history entry"
            );
            self.entries[self.index] = HistoryEntry::new(objects);
            return;
        }

        let discarded = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry::new(objects));
        self.index = self.entries.len() - 1;
        self.enforce_limit();

        debug!(
            index = self.index,
            len = self.entries.len(),
            discarded,
            "committed history entry"
        );
    }

    /// Step back one entry. Returns whether the pointer moved.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            trace!("undo at oldest entry, ignoring");
            return false;
        }
        self.index -= 1;
        debug!(index = self.index, "undo");
        true
    }

    /// Step forward one entry. Returns whether the pointer moved.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            trace!("redo at newest entry, ignoring");
            return false;
        }
        self.index += 1;
        debug!(index = self.index, "redo");
        true
    }

    /// The visible snapshot.
    pub fn current(&self) -> &[CanvasObject] {
        self.entries[self.index].objects()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Always false: a history starts seeded with one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Change the retention limit, trimming the oldest entries right away if
    /// the history is already longer.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit.map(|l| l.max(1));
        self.enforce_limit();
    }

    /// Drop every entry and start over from one empty snapshot.
    pub fn clear(&mut self) {
        debug!(len = self.entries.len(), "clearing history");
        self.entries = vec![HistoryEntry::default()];
        self.index = 0;
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        let limit = limit.max(1);
        if self.entries.len() <= limit {
            return;
        }

        // Oldest entries go first, but never the visible one.
        let excess = (self.entries.len() - limit).min(self.index);
        self.entries.drain(..excess);
        self.index -= excess;
        trace!(excess, limit, "trimmed oldest history entries");
    }
}

/// Wire form of [`HistoryState`]. Lenient on purpose: whatever a stored blob
/// says about the pointer, it is brought back into range here.
#[derive(Deserialize)]
struct PersistedHistory {
    #[serde(default)]
    history: Vec<HistoryEntry>,
    // Any JSON number is accepted; `restore_index` brings it into range.
    #[serde(default)]
    history_index: f64,
    #[serde(default)]
    limit: Option<usize>,
}

impl From<PersistedHistory> for HistoryState {
    fn from(raw: PersistedHistory) -> Self {
        let mut entries = raw.history;
        if entries.is_empty() {
            warn!("restored history has no entries, seeding an empty one");
            entries.push(HistoryEntry::default());
        }

        let index = restore_index(raw.history_index, entries.len());
        if index as f64 != raw.history_index {
            warn!(
                index = raw.history_index,
                len = entries.len(),
                clamped = index,
                "restored history index out of range"
            );
        }

        let mut state = Self {
            entries,
            index,
            limit: raw.limit.map(|l| l.max(1)),
        };
        state.enforce_limit();
        state
    }
}

/// Map a stored pointer onto `0..len`. Negative or NaN becomes 0, anything
/// past the end becomes `len - 1`, fractions round down.
pub(crate) fn restore_index(raw: f64, len: usize) -> usize {
    let last = len.saturating_sub(1);
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    if raw >= last as f64 {
        return last;
    }
    raw.floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, Color32};
    use studio_core::{ImageObject, PathObject, TextObject};

    fn shape(x: f32) -> CanvasObject {
        ImageObject::new("shape.png", pos2(x, 0.0), vec2(10.0, 10.0)).into()
    }

    #[test]
    fn test_new_history_is_seeded() {
        let history = HistoryState::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(history.current().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commits_grow_history() {
        let mut history = HistoryState::new();
        for n in 1..=7 {
            history.commit(vec![shape(n as f32)], false);
            assert_eq!(history.len(), n + 1);
            assert_eq!(history.index(), n);
        }
    }

    #[test]
    fn test_undo_then_redo_restores_snapshot() {
        let mut history = HistoryState::new();
        history.commit(vec![shape(1.0)], false);
        history.commit(vec![shape(1.0), shape(2.0)], false);
        history.commit(vec![shape(3.0)], false);

        while history.can_undo() {
            let before = history.current().to_vec();
            assert!(history.undo());
            assert!(history.redo());
            assert_eq!(history.current(), before.as_slice());
            history.undo();
        }
    }

    #[test]
    fn test_overwrite_keeps_length() {
        let mut history = HistoryState::new();
        history.commit(vec![shape(1.0)], false);
        history.commit(vec![shape(2.0)], false);
        history.undo();

        let replacement = vec![shape(9.0)];
        history.commit(replacement.clone(), true);

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 1);
        assert_eq!(history.current(), replacement.as_slice());
        // The undone entry is still reachable.
        assert!(history.can_redo());
    }

    #[test]
    fn test_commit_after_undo_discards_future() {
        let a = vec![shape(1.0)];
        let d = vec![shape(4.0)];

        let mut history = HistoryState::new();
        history.commit(a.clone(), false);
        history.commit(vec![shape(2.0)], false);
        history.commit(vec![shape(3.0)], false);
        assert_eq!(history.index(), 3);

        history.undo();
        history.undo();
        history.commit(d.clone(), false);

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.entries()[1].objects(), a.as_slice());
        assert_eq!(history.current(), d.as_slice());
        assert!(!history.redo());
        assert_eq!(history.current(), d.as_slice());
    }

    #[test]
    fn test_bounds_are_noops() {
        let mut history = HistoryState::new();
        let before = history.clone();
        assert!(!history.undo());
        assert_eq!(history, before);

        history.commit(vec![shape(1.0)], false);
        let before = history.clone();
        assert!(!history.redo());
        assert_eq!(history, before);
    }

    #[test]
    fn test_shape_scenario() {
        let a: CanvasObject =
            PathObject::new(vec![pos2(0.0, 0.0), pos2(4.0, 4.0)], Color32::BLACK, 1.0).into();
        let b: CanvasObject = TextObject::new("b", pos2(1.0, 1.0), 14.0, Color32::BLUE).into();

        let mut history = HistoryState::new();
        history.commit(vec![a.clone()], false);
        assert_eq!(history.index(), 1);
        history.commit(vec![a.clone(), b], false);
        assert_eq!(history.index(), 2);

        history.undo();
        assert_eq!(history.current(), [a.clone()].as_slice());
        history.undo();
        assert!(history.current().is_empty());
        history.redo();
        assert_eq!(history.current(), [a].as_slice());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = HistoryState::with_limit(3);
        let mut last = Vec::new();
        for n in 0..10 {
            last = vec![shape(n as f32)];
            history.commit(last.clone(), false);
            assert!(history.len() <= 3);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current(), last.as_slice());

        history.undo();
        history.undo();
        assert!(!history.undo());
    }

    #[test]
    fn test_clear_reseeds() {
        let mut history = HistoryState::new();
        history.commit(vec![shape(1.0)], false);
        history.clear();
        assert_eq!(history, HistoryState::new());
    }

    #[test]
    fn test_restore_clamps_index() {
        let json = r#"{"history":[{"objects":[]},{"objects":[]}],"history_index":7}"#;
        let history: HistoryState = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);

        let json = r#"{"history":[{"objects":[]}],"history_index":-3}"#;
        let history: HistoryState = serde_json::from_str(json).unwrap();
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_restore_clamps_odd_numbers() {
        let empty = serde_json::json!({ "objects": [] });
        let json = serde_json::json!({
            "history": [empty, empty, empty],
            "history_index": 1.7,
        });
        let history: HistoryState = serde_json::from_value(json).unwrap();
        assert_eq!(history.index(), 1);

        let json = serde_json::json!({
            "history": [empty, empty],
            "history_index": u64::MAX,
        });
        let history: HistoryState = serde_json::from_value(json).unwrap();
        assert_eq!(history.index(), 1);

        assert_eq!(restore_index(f64::NAN, 4), 0);
        assert_eq!(restore_index(f64::INFINITY, 4), 3);
        assert_eq!(restore_index(-2.5, 4), 0);
    }

    #[test]
    fn test_set_limit_trims_existing_entries() {
        let mut history = HistoryState::new();
        let mut last = Vec::new();
        for n in 0..8 {
            last = vec![shape(n as f32)];
            history.commit(last.clone(), false);
        }
        assert_eq!(history.len(), 9);

        history.set_limit(Some(3));
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current(), last.as_slice());

        history.set_limit(None);
        history.commit(vec![shape(20.0)], false);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_restore_reseeds_empty_history() {
        let history: HistoryState = serde_json::from_str(r#"{"history":[]}"#).unwrap();
        assert_eq!(history, HistoryState::new());
    }

    #[test]
    fn test_serialized_roundtrip_keeps_pointer() {
        let mut history = HistoryState::new();
        history.commit(vec![shape(1.0)], false);
        history.commit(vec![shape(2.0)], false);
        history.undo();

        let json = serde_json::to_string(&history).unwrap();
        let restored: HistoryState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
        assert_eq!(restored.index(), 1);
    }
}
