//! Command layer: toolbar and context-menu actions
//!
//! Each action builds an engine command, commits it, and reports a
//! [`CommandOutcome`]. Errors stop here; the document and selection are left
//! exactly as they were.

use crate::{CollaboratorError, CommandOutcome, Composer, Diagnostic};
use doc_model::{resolve, Mark, MarkType};
use edit_engine::{
    ClearFormatting, Command, Duplicate, EditError, InsertHorizontalRule, InsertImage,
    InsertTable, MoveOutcome, SetBlockType, SetLink, ToggleMark,
};

impl Composer {
    /// Build a command against the current selection and commit it
    pub(crate) fn execute(&mut self, command: &dyn Command) -> CommandOutcome {
        let result = self.engine.execute(command);
        if matches!(result, Ok(true)) {
            self.tables.deselect();
        }
        self.finish(command.display_name(), result)
    }

    fn finish(&mut self, name: &str, result: edit_engine::Result<bool>) -> CommandOutcome {
        match result {
            Ok(true) => {
                self.refresh();
                CommandOutcome::Applied
            }
            Ok(false) => CommandOutcome::NoOp(Diagnostic::Unchanged),
            Err(EditError::SelectionUnavailable) => {
                CommandOutcome::NoOp(Diagnostic::SelectionUnavailable)
            }
            Err(err) => {
                tracing::warn!(command = name, %err, "Command rejected");
                CommandOutcome::NoOp(err.into())
            }
        }
    }

    fn collaborator_failed(&self, name: &str, err: CollaboratorError) -> CommandOutcome {
        tracing::warn!(command = name, %err, "Collaborator failed");
        CommandOutcome::NoOp(err.into())
    }

    /// Strip marks and reset touched blocks to paragraphs
    pub fn clear_formatting(&mut self) -> CommandOutcome {
        self.execute(&ClearFormatting)
    }

    /// Insert a copy of the selection right after its head
    pub fn duplicate(&mut self) -> CommandOutcome {
        self.execute(&Duplicate)
    }

    /// Hand the selected plain text to the clipboard
    pub fn copy_to_clipboard(&mut self) -> CommandOutcome {
        let text = match self.engine.selected_text() {
            Ok(text) => text,
            Err(err) => return self.finish("Copy", Err(err)),
        };
        match self.clipboard.write_text(&text) {
            Ok(()) => CommandOutcome::Applied,
            Err(err) => self.collaborator_failed("Copy", err),
        }
    }

    pub fn insert_table(&mut self, rows: usize, cols: usize, header_row: bool) -> CommandOutcome {
        self.execute(&InsertTable::new(rows, cols, header_row))
    }

    /// Ask the prompt for dimensions, then insert the table
    pub fn insert_table_from_prompt(&mut self) -> CommandOutcome {
        if self.engine.selection().current().is_none() {
            return CommandOutcome::NoOp(Diagnostic::SelectionUnavailable);
        }
        match self.prompt.table_size(self.settings.tables) {
            Ok(Some(size)) => self.insert_table(size.rows, size.cols, size.header_row),
            Ok(None) => CommandOutcome::NoOp(Diagnostic::Cancelled),
            Err(err) => self.collaborator_failed("Insert Table", err),
        }
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> CommandOutcome {
        self.execute(&ToggleMark::new(mark))
    }

    /// Ask the prompt for a URL and link the selection; an empty URL unlinks
    pub fn set_link(&mut self) -> CommandOutcome {
        let Some(selection) = self.engine.selection().current() else {
            return CommandOutcome::NoOp(Diagnostic::SelectionUnavailable);
        };
        let current = resolve(self.engine.doc(), selection.from())
            .ok()
            .and_then(|rpos| rpos.node_after().or_else(|| rpos.node_before()))
            .and_then(|node| match node.marks()?.get(MarkType::Link)? {
                Mark::Link { href } => Some(href.clone()),
                _ => None,
            });
        match self.prompt.link_url(current.as_deref()) {
            Ok(Some(href)) if href.trim().is_empty() => self.execute(&SetLink::remove()),
            Ok(Some(href)) => self.execute(&SetLink::new(href)),
            Ok(None) => CommandOutcome::NoOp(Diagnostic::Cancelled),
            Err(err) => self.collaborator_failed("Set Link", err),
        }
    }

    pub fn unset_link(&mut self) -> CommandOutcome {
        self.execute(&SetLink::remove())
    }

    /// Ask the prompt for an image URL and insert the image
    pub fn insert_image(&mut self) -> CommandOutcome {
        if self.engine.selection().current().is_none() {
            return CommandOutcome::NoOp(Diagnostic::SelectionUnavailable);
        }
        match self.prompt.image_url() {
            Ok(Some(src)) if !src.trim().is_empty() => self.execute(&InsertImage::new(src.trim())),
            Ok(_) => CommandOutcome::NoOp(Diagnostic::Cancelled),
            Err(err) => self.collaborator_failed("Insert Image", err),
        }
    }

    pub fn insert_horizontal_rule(&mut self) -> CommandOutcome {
        self.execute(&InsertHorizontalRule)
    }

    pub fn set_heading(&mut self, level: u8) -> CommandOutcome {
        self.execute(&SetBlockType::heading(level))
    }

    pub fn set_paragraph(&mut self) -> CommandOutcome {
        self.execute(&SetBlockType::paragraph())
    }

    pub fn undo(&mut self) -> CommandOutcome {
        let result = self.engine.undo().map(|()| true);
        self.tables.deselect();
        self.finish("Undo", result)
    }

    pub fn redo(&mut self) -> CommandOutcome {
        let result = self.engine.redo().map(|()| true);
        self.tables.deselect();
        self.finish("Redo", result)
    }

    /// Select the table at `path`, as a pointer press inside it would
    pub fn select_table(&mut self, path: &[usize]) -> CommandOutcome {
        match self.tables.select_table(self.engine.doc(), path) {
            Ok(()) => CommandOutcome::Applied,
            Err(err) => self.finish("Select Table", Err(err)),
        }
    }

    pub fn deselect_table(&mut self) {
        self.tables.deselect();
    }

    pub fn move_table_up(&mut self) -> CommandOutcome {
        let result = self.tables.move_up(&mut self.engine);
        self.finish_move(result)
    }

    pub fn move_table_down(&mut self) -> CommandOutcome {
        let result = self.tables.move_down(&mut self.engine);
        self.finish_move(result)
    }

    fn finish_move(&mut self, result: edit_engine::Result<MoveOutcome>) -> CommandOutcome {
        match result {
            Ok(MoveOutcome::Moved { .. }) => self.finish("Move Table", Ok(true)),
            Ok(MoveOutcome::NoSiblingInDirection) => {
                CommandOutcome::NoOp(Diagnostic::NoSiblingInDirection)
            }
            Err(err) => self.finish("Move Table", Err(err)),
        }
    }

    /// Delete the selected table; the controller returns to idle
    pub fn delete_table(&mut self) -> CommandOutcome {
        let result = self.tables.delete_table(&mut self.engine).map(|()| true);
        self.finish("Delete Table", result)
    }
}
