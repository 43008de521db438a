//! Table creation

use crate::insert_commands::insert_block;
use crate::{Command, Result, Selection, Transaction};
use doc_model::Node;

/// Build a `rows` x `cols` table of empty cells; each dimension is at least 1
pub fn empty_table(rows: usize, cols: usize, header_row: bool) -> Result<Node> {
    let rows = (0..rows.max(1))
        .map(|row| {
            let cells = (0..cols.max(1))
                .map(|_| Node::table_cell(header_row && row == 0, vec![Node::paragraph(Vec::new())?]))
                .collect::<doc_model::Result<Vec<_>>>()?;
            Node::table_row(cells)
        })
        .collect::<doc_model::Result<Vec<_>>>()?;
    Ok(Node::table(rows)?)
}

/// Insert a new table at the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertTable {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Mark the first row's cells as header cells
    pub header_row: bool,
}

impl InsertTable {
    /// Create a new InsertTable command
    pub fn new(rows: usize, cols: usize, header_row: bool) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            header_row,
        }
    }
}

impl Command for InsertTable {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let table = empty_table(self.rows, self.cols, self.header_row)?;
        let (mut tr, pos) = insert_block(doc, selection, table)?;
        // table, row, cell, paragraph: the first cell's content starts four tokens in
        tr.set_selection(Selection::collapsed(pos + 4));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Insert Table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{resolve, NodeKind, NodeType};

    #[test]
    fn test_empty_table_shape() {
        let table = empty_table(3, 3, true).unwrap();
        assert_eq!(table.child_count(), 3);
        let headers: Vec<bool> = table
            .children()
            .iter()
            .flat_map(|row| row.children().iter())
            .map(|cell| matches!(cell.kind(), NodeKind::TableCell { header: true }))
            .collect();
        assert_eq!(headers.iter().filter(|h| **h).count(), 3);
        assert!(headers[..3].iter().all(|h| *h));
        assert_eq!(table.text_content(), "");
    }

    #[test]
    fn test_dimensions_clamped() {
        let table = empty_table(0, 0, false).unwrap();
        assert_eq!(table.child_count(), 1);
        assert_eq!(table.child(0).unwrap().child_count(), 1);
        assert_eq!(InsertTable::new(0, 5, false).rows, 1);
    }

    #[test]
    fn test_insert_table_places_caret_in_first_cell() {
        let doc = Node::doc(vec![Node::paragraph(Vec::new()).unwrap()]).unwrap();
        let tr = InsertTable::new(2, 2, false)
            .apply(&doc, Selection::collapsed(1))
            .unwrap();
        assert_eq!(tr.doc().child_count(), 1);
        assert_eq!(tr.doc().child(0).unwrap().node_type(), NodeType::Table);
        let caret = tr.selection().unwrap().head;
        let rpos = resolve(tr.doc(), caret).unwrap();
        assert_eq!(rpos.parent().node_type(), NodeType::Paragraph);
        assert_eq!(rpos.node(rpos.depth() - 1).node_type(), NodeType::TableCell);
        assert_eq!(rpos.path(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_insert_table_inside_cell_goes_after_table() {
        let outer = empty_table(1, 1, false).unwrap();
        let doc = Node::doc(vec![outer]).unwrap();
        let tr = InsertTable::new(1, 1, false)
            .apply(&doc, Selection::collapsed(4))
            .unwrap();
        assert_eq!(tr.doc().child_count(), 2);
        assert_eq!(tr.doc().child(1).unwrap().node_type(), NodeType::Table);
        assert_eq!(tr.selection(), Some(Selection::collapsed(doc.content_size() + 4)));
    }
}
