//! The composer editing session

use crate::{
    Clipboard, CommandOutcome, Diagnostic, Key, PointerEvent, PointerHub, PointerSubscription,
    PointerTarget, Prompt, RegionId, Result,
};
use doc_model::Node;
use edit_engine::{
    DeleteBackward, DeleteForward, EditingEngine, InsertText, SelectionModel, SplitBlock,
    TableController, TableState,
};
use store::{parse_markup, serialize_markup, ComposerSettings, TextStats};

/// One mounted composer: document, selection, history, and table state.
///
/// After every committed transaction the document is re-serialized and the
/// counter refreshed, so [`Composer::markup`] and [`Composer::stats`] always
/// describe the current snapshot.
pub struct Composer {
    pub(crate) engine: EditingEngine,
    pub(crate) tables: TableController,
    pub(crate) settings: ComposerSettings,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) prompt: Box<dyn Prompt>,
    region: RegionId,
    pointer: PointerSubscription,
    markup: String,
    stats: TextStats,
}

impl Composer {
    /// Mount a composer seeded from `markup` (may be empty)
    pub fn new(
        markup: &str,
        settings: ComposerSettings,
        clipboard: Box<dyn Clipboard>,
        prompt: Box<dyn Prompt>,
        hub: &PointerHub,
    ) -> Result<Self> {
        let doc = parse_markup(markup)?;
        let engine = EditingEngine::with_history_limit(doc, settings.history.max_entries);
        let mut composer = Self {
            engine,
            tables: TableController::new(),
            settings,
            clipboard,
            prompt,
            region: RegionId::new(),
            pointer: hub.subscribe(),
            markup: String::new(),
            stats: TextStats::default(),
        };
        composer.refresh();
        tracing::debug!(region = %composer.region, "Composer mounted");
        Ok(composer)
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn document(&self) -> &Node {
        self.engine.doc()
    }

    pub fn selection(&self) -> &SelectionModel {
        self.engine.selection()
    }

    pub fn table_state(&self) -> &TableState {
        self.tables.state()
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Serialized markup of the current document
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    pub fn focus(&mut self) {
        self.engine.focus();
    }

    pub fn blur(&mut self) {
        self.engine.blur();
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) -> edit_engine::Result<()> {
        self.engine.set_selection(anchor, head)
    }

    /// Route a key press.
    ///
    /// While a table is selected, Delete and Backspace delete the table and
    /// Escape deselects it; otherwise keys take the default editing route.
    pub fn handle_key(&mut self, key: Key) -> CommandOutcome {
        if self.tables.is_table_selected() {
            match key {
                Key::Backspace | Key::Delete => return self.delete_table(),
                Key::Escape => {
                    self.tables.deselect();
                    return CommandOutcome::Applied;
                }
                _ => {}
            }
        }
        match key {
            Key::Char(c) => self.execute(&InsertText::new(c)),
            Key::Backspace => self.execute(&DeleteBackward),
            Key::Delete => self.execute(&DeleteForward),
            Key::Enter => self.execute(&SplitBlock),
            Key::Escape => CommandOutcome::NoOp(Diagnostic::Unchanged),
        }
    }

    /// Process pointer events published since the last call.
    ///
    /// A press inside a table selects it; any other press, including one in
    /// another region, returns the table controller to idle. Presses on text
    /// in this region also focus the composer and place the caret.
    pub fn pump_pointer_events(&mut self) -> usize {
        let events = self.pointer.drain();
        for event in &events {
            self.handle_pointer(event);
        }
        events.len()
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        if event.region != self.region {
            self.tables.deselect();
            return;
        }
        match event.target {
            PointerTarget::Table(table) => {
                if let Err(err) = self.tables.select_table_by_id(self.engine.doc(), table) {
                    tracing::warn!(%err, "Pointer hit an unknown table");
                    self.tables.deselect();
                }
            }
            PointerTarget::Position(pos) => {
                self.tables.deselect();
                self.engine.focus();
                if let Err(err) = self.engine.collapse_to(pos) {
                    tracing::warn!(%err, "Pointer position outside the document");
                }
            }
            PointerTarget::Other => self.tables.deselect(),
        }
    }

    /// Re-serialize and recount after a commit
    pub(crate) fn refresh(&mut self) {
        let doc = self.engine.doc();
        self.markup = serialize_markup(doc);
        self.stats = TextStats::of(doc, &self.settings.counter);
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        tracing::debug!(region = %self.region, "Composer unmounted");
    }
}
