// Canvas editor: the root that owns the deck, the storage port and the
// active tool. All deck mutations go through here.

use egui::{Color32, Pos2};
use studio_canvas::{load_deck, save_deck, Deck, DeckError, SlideId, Storage};
use studio_core::edit::{arranged, without};
use studio_core::{position_of, CanvasObject, ObjectId, ZOrder};
use tracing::{debug, error, info, trace, warn};

use crate::config::EditorConfig;
use crate::editor::tools::{Commit, Pen, Tool};

pub struct CanvasEditor<S: Storage> {
    deck: Deck,
    storage: S,
    config: EditorConfig,
    tool: Box<dyn Tool>,
    // Changes not yet written to storage.
    dirty: bool,
}

impl<S: Storage> CanvasEditor<S> {
    /// Restore the deck stored under `config.storage_key`, or start a new one.
    /// `config.history_limit` is applied to every slide either way.
    pub fn open(storage: S, config: EditorConfig) -> anyhow::Result<Self> {
        let deck = match load_deck(&storage, &config.storage_key)? {
            Some(mut deck) => {
                // The configured limit wins over whatever the saved deck carried.
                deck.set_history_limit(config.history_limit);
                deck
            }
            None => {
                info!(key = %config.storage_key, "no saved canvas, starting fresh");
                Deck::with_history_limit(config.history_limit)
            }
        };

        Ok(Self {
            deck,
            storage,
            config,
            tool: Box::new(Pen::new(Color32::BLACK, 2.0)),
            dirty: false,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_tool(&mut self, tool: impl Tool + 'static) {
        debug!(tool = tool.name(), "tool selected");
        self.tool = Box::new(tool);
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// What the renderer should draw for the active slide.
    pub fn current_objects(&self) -> &[CanvasObject] {
        self.deck.active_slide().history.current()
    }

    pub fn can_undo(&self) -> bool {
        self.deck.active_slide().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.deck.active_slide().history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.tool.cancel();
        let moved = self.deck.active_slide_mut().history.undo();
        if moved {
            self.changed(true);
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        self.tool.cancel();
        let moved = self.deck.active_slide_mut().history.redo();
        if moved {
            self.changed(true);
        }
        moved
    }

    /// Record a snapshot on the active slide. Snapshots containing invalid
    /// objects are dropped with a warning.
    pub fn commit(&mut self, commit: Commit) -> bool {
        if let Some(err) = commit.objects.iter().find_map(|o| o.validate().err()) {
            warn!(error = %err, "rejecting commit with invalid object");
            return false;
        }

        let settled = !commit.overwrite_last;
        self.deck
            .active_slide_mut()
            .history
            .commit(commit.objects, commit.overwrite_last);
        self.changed(settled);
        true
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        trace!(x = pos.x, y = pos.y, tool = self.tool.name(), "pointer down");
        let commit = self
            .tool
            .pointer_down(self.deck.active_slide().history.current(), pos);
        if let Some(commit) = commit {
            self.commit(commit);
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        let commit = self
            .tool
            .pointer_move(self.deck.active_slide().history.current(), pos);
        if let Some(commit) = commit {
            self.commit(commit);
        }
    }

    /// Ends a gesture. Anything the gesture left unsaved is persisted now.
    pub fn pointer_up(&mut self, pos: Pos2) {
        trace!(x = pos.x, y = pos.y, tool = self.tool.name(), "pointer up");
        let commit = self
            .tool
            .pointer_up(self.deck.active_slide().history.current(), pos);
        if let Some(commit) = commit {
            self.commit(commit);
        }
        if self.dirty {
            self.autosave();
        }
    }

    /// Change the z position of an object. Unknown ids record nothing.
    pub fn arrange(&mut self, id: ObjectId, order: ZOrder) -> bool {
        let objects = self.current_objects();
        if position_of(objects, id).is_none() {
            return false;
        }
        let next = arranged(objects, id, order);
        if next.as_slice() == objects {
            return false;
        }
        self.commit(Commit::new(next))
    }

    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        let objects = self.current_objects();
        if position_of(objects, id).is_none() {
            return false;
        }
        let next = without(objects, id);
        self.commit(Commit::new(next))
    }

    /// Empty the active slide as an undoable step.
    pub fn clear_slide(&mut self) -> bool {
        if self.current_objects().is_empty() {
            return false;
        }
        self.commit(Commit::new(Vec::new()))
    }

    pub fn add_slide(&mut self, name: impl Into<String>) -> SlideId {
        let id = self.deck.add_slide(name);
        self.tool.cancel();
        self.changed(true);
        id
    }

    pub fn delete_slide(&mut self, id: SlideId) -> Result<(), DeckError> {
        self.deck.delete_slide(id)?;
        self.tool.cancel();
        self.changed(true);
        Ok(())
    }

    pub fn select_slide(&mut self, id: SlideId) -> Result<(), DeckError> {
        self.deck.select_slide(id)?;
        self.tool.cancel();
        self.changed(true);
        Ok(())
    }

    pub fn rename_slide(&mut self, id: SlideId, name: impl Into<String>) -> Result<(), DeckError> {
        self.deck.rename_slide(id, name)?;
        self.changed(true);
        Ok(())
    }

    pub fn move_slide(&mut self, id: SlideId, to: usize) -> Result<(), DeckError> {
        self.deck.move_slide(id, to)?;
        self.changed(true);
        Ok(())
    }

    /// Write the deck to storage now, regardless of `autosave`.
    pub fn save(&mut self) -> anyhow::Result<()> {
        save_deck(&mut self.storage, &self.config.storage_key, &self.deck)?;
        self.dirty = false;
        Ok(())
    }

    fn changed(&mut self, settled: bool) {
        self.dirty = true;
        if settled {
            self.autosave();
        }
    }

    fn autosave(&mut self) {
        if !self.config.autosave {
            return;
        }
        if let Err(err) = self.save() {
            error!(error = %format!("{err:#}"), "autosave failed, keeping changes in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tools::{Eraser, Move, TextTool};
    use egui::pos2;
    use studio_canvas::MemoryStorage;

    fn editor() -> CanvasEditor<MemoryStorage> {
        let config = EditorConfig {
            autosave: false,
            ..Default::default()
        };
        CanvasEditor::open(MemoryStorage::new(), config).unwrap()
    }

    #[test]
    fn test_pen_stroke_is_one_step() {
        let mut editor = editor();
        editor.pointer_down(pos2(0.0, 0.0));
        for i in 1..20 {
            editor.pointer_move(pos2(i as f32, i as f32));
        }
        editor.pointer_up(pos2(19.0, 19.0));

        let history = &editor.deck().active_slide().history;
        assert_eq!(history.len(), 2);
        match &editor.current_objects()[0] {
            CanvasObject::Path(p) => assert_eq!(p.points.len(), 20),
            other => panic!("expected path, got {}", other.kind()),
        }

        assert!(editor.undo());
        assert!(editor.current_objects().is_empty());
    }

    #[test]
    fn test_drag_is_one_step() {
        let mut editor = editor();
        editor.set_tool(TextTool::new("Rent", 10.0, Color32::BLACK));
        editor.pointer_down(pos2(0.0, 0.0));
        editor.pointer_up(pos2(0.0, 0.0));

        editor.set_tool(Move::new());
        editor.pointer_down(pos2(2.0, 2.0));
        editor.pointer_move(pos2(3.0, 2.0));
        editor.pointer_move(pos2(6.0, 2.0));
        editor.pointer_up(pos2(6.0, 2.0));

        assert_eq!(editor.deck().active_slide().history.len(), 3);
        editor.undo();
        match &editor.current_objects()[0] {
            CanvasObject::Text(t) => assert_eq!(t.position, pos2(0.0, 0.0)),
            other => panic!("expected text, got {}", other.kind()),
        }
    }

    #[test]
    fn test_invalid_commit_rejected() {
        let mut editor = editor();
        editor.set_tool(TextTool::new("bad", 0.0, Color32::BLACK));
        editor.pointer_down(pos2(0.0, 0.0));
        assert_eq!(editor.deck().active_slide().history.len(), 1);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_arrange_and_delete() {
        let mut editor = editor();
        editor.set_tool(TextTool::new("a", 10.0, Color32::BLACK));
        editor.pointer_down(pos2(0.0, 0.0));
        editor.pointer_down(pos2(50.0, 0.0));
        let first = editor.current_objects()[0].id();

        assert!(editor.arrange(first, ZOrder::ToFront));
        assert_eq!(editor.current_objects()[1].id(), first);
        assert!(!editor.arrange(first, ZOrder::ToFront));
        assert!(!editor.arrange(ObjectId::new(), ZOrder::ToBack));

        assert!(editor.delete_object(first));
        assert_eq!(editor.current_objects().len(), 1);

        editor.set_tool(Eraser);
        editor.pointer_down(pos2(51.0, 1.0));
        assert!(editor.current_objects().is_empty());
        assert!(!editor.clear_slide());
    }

    #[test]
    fn test_slide_switch_cancels_drag() {
        let mut editor = editor();
        editor.set_tool(TextTool::new("Rent", 10.0, Color32::BLACK));
        editor.pointer_down(pos2(0.0, 0.0));
        let first = editor.deck().active_slide().id;

        editor.set_tool(Move::new());
        editor.pointer_down(pos2(2.0, 2.0));
        editor.add_slide("b");
        editor.pointer_move(pos2(8.0, 2.0));
        editor.pointer_up(pos2(8.0, 2.0));
        assert_eq!(editor.deck().active_slide().history.len(), 1);
        assert!(!editor.can_undo());

        editor.select_slide(first).unwrap();
        editor.pointer_move(pos2(9.0, 2.0));
        assert_eq!(editor.deck().active_slide().history.len(), 2);
        match &editor.current_objects()[0] {
            CanvasObject::Text(t) => assert_eq!(t.position, pos2(0.0, 0.0)),
            other => panic!("expected text, got {}", other.kind()),
        }
    }

    #[test]
    fn test_pen_stroke_stays_on_its_slide() {
        let mut editor = editor();
        editor.pointer_down(pos2(0.0, 0.0));
        editor.add_slide("b");
        editor.pointer_move(pos2(5.0, 5.0));
        assert_eq!(editor.deck().active_slide().history.len(), 1);
        assert!(editor.current_objects().is_empty());
    }

    #[test]
    fn test_undo_is_per_slide() {
        let mut editor = editor();
        let first = editor.deck().active_slide().id;
        editor.pointer_down(pos2(1.0, 1.0));
        editor.pointer_up(pos2(1.0, 1.0));

        editor.add_slide("Budget");
        assert!(!editor.can_undo());
        assert!(!editor.undo());

        editor.select_slide(first).unwrap();
        assert!(editor.can_undo());
    }
}
