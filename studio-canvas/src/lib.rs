//! studio-canvas: per-slide undo/redo history and its persistence.
//!
//! Design rules:
//! - Each slide exclusively owns one history; no sharing across slides.
//! - History operations never fail. Bounds are no-ops.
//! - Restored state is clamped into range, never rejected.
//! - Storage is injected through the [`Storage`] port.

pub mod deck;
pub mod history;
pub mod storage;

pub use deck::{Deck, DeckError, Slide, SlideId};
pub use history::{HistoryEntry, HistoryState};
pub use storage::{
    load_deck, save_deck, FileStorage, MemoryStorage, Storage, StorageError, STATE_FILE_EXT,
};
