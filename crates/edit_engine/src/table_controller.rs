//! Table selection state machine
//!
//! Tables are handled as opaque blocks: once one is selected it can be moved
//! past its neighbours or deleted as a unit. The controller tracks the table by
//! its [`NodeId`] and resolves the current path from it before every
//! operation, so it never acts on a stale position.

use crate::{
    text_position_near, Assoc, EditError, EditingEngine, MoveDirection, MoveOutcome, Result,
    Selection,
};
use doc_model::{DocModelError, Node, NodeId, NodeType, Path};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableState {
    #[default]
    Idle,
    TableSelected {
        table: NodeId,
        path: Path,
    },
}

#[derive(Debug, Default)]
pub struct TableController {
    state: TableState,
}

impl TableController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn is_table_selected(&self) -> bool {
        matches!(self.state, TableState::TableSelected { .. })
    }

    /// Enter `TableSelected` for the table at `path`
    pub fn select_table(&mut self, doc: &Node, path: &[usize]) -> Result<()> {
        let table = doc
            .node_at(path)
            .filter(|n| n.node_type() == NodeType::Table)
            .and_then(Node::id)
            .ok_or_else(|| DocModelError::InvalidPath(path.to_vec()))?;
        tracing::debug!(?path, "Table selected");
        self.state = TableState::TableSelected {
            table,
            path: path.to_vec(),
        };
        Ok(())
    }

    pub fn select_table_by_id(&mut self, doc: &Node, table: NodeId) -> Result<()> {
        let path = doc
            .find_path(table)
            .ok_or_else(|| DocModelError::NodeNotFound(table.to_string()))?;
        self.select_table(doc, &path)
    }

    pub fn deselect(&mut self) {
        if self.is_table_selected() {
            tracing::debug!("Table deselected");
        }
        self.state = TableState::Idle;
    }

    pub fn move_up(&mut self, engine: &mut EditingEngine) -> Result<MoveOutcome> {
        self.move_table(engine, MoveDirection::Up)
    }

    pub fn move_down(&mut self, engine: &mut EditingEngine) -> Result<MoveOutcome> {
        self.move_table(engine, MoveDirection::Down)
    }

    /// Delete the selected table and return to `Idle`
    pub fn delete_table(&mut self, engine: &mut EditingEngine) -> Result<()> {
        let (_, path) = self.current(engine.doc())?;
        let pos = engine.doc().position_of(&path)?;
        let mut tr = engine.transaction();
        tr.delete_node(&path)?;
        tr.ensure_not_empty()?;
        let caret = text_position_near(tr.doc(), pos.min(tr.doc().content_size()));
        tr.set_selection(Selection::collapsed(caret));
        engine.dispatch(tr)?;
        tracing::debug!(?path, "Table deleted");
        self.state = TableState::Idle;
        Ok(())
    }

    fn move_table(
        &mut self,
        engine: &mut EditingEngine,
        direction: MoveDirection,
    ) -> Result<MoveOutcome> {
        let (table, path) = self.current(engine.doc())?;
        let doc = engine.doc();
        let old_pos = doc.position_of(&path)?;
        let old_end = old_pos + doc.node_at(&path).map(Node::size).unwrap_or(0);

        let mut tr = engine.transaction();
        let outcome = tr.move_node(&path, direction)?;
        let MoveOutcome::Moved { path: new_path } = &outcome else {
            tracing::debug!(?direction, "Table has no sibling in that direction");
            return Ok(outcome);
        };

        // A selection inside the table travels with it
        let new_pos = tr.doc().position_of(new_path)?;
        let carry = |pos: usize| {
            if (old_pos..=old_end).contains(&pos) {
                pos - old_pos + new_pos
            } else {
                tr.mapping().map(pos, Assoc::After)
            }
        };
        let last = engine.selection().last();
        let selection = Selection::new(carry(last.anchor), carry(last.head));
        tr.set_selection(selection);
        engine.dispatch(tr)?;

        self.state = TableState::TableSelected {
            table,
            path: new_path.clone(),
        };
        Ok(outcome)
    }

    /// The selected table's id and current path, re-resolved by identity
    fn current(&mut self, doc: &Node) -> Result<(NodeId, Path)> {
        let TableState::TableSelected { table, .. } = &self.state else {
            return Err(EditError::NotTableSelected);
        };
        let table = *table;
        match doc.find_path(table) {
            Some(path) => Ok((table, path)),
            None => {
                self.state = TableState::Idle;
                Err(DocModelError::NodeNotFound(table.to_string()).into())
            }
        }
    }
}
