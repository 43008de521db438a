//! End-to-end composer scenarios
//!
//! Each test mounts a composer from markup with scripted collaborators and
//! drives it the way the host would: focus, selection, keys, toolbar
//! commands, and pointer events.

use composer::{
    Clipboard, CollaboratorError, CommandOutcome, Composer, Diagnostic, Key, PointerEvent,
    PointerHub, PointerTarget, Prompt,
};
use doc_model::{Mark, MarkSet, Node, NodeKind, NodeType};
use edit_engine::TableState;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use store::{ComposerSettings, TableDefaults};

#[derive(Clone, Default)]
struct FakeClipboard {
    written: Rc<RefCell<Vec<String>>>,
    fail: bool,
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Clipboard("denied".to_string()));
        }
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedPrompt {
    links: VecDeque<Option<String>>,
    images: VecDeque<Option<String>>,
    tables: VecDeque<Option<TableDefaults>>,
    fail: bool,
}

impl Prompt for ScriptedPrompt {
    fn link_url(&mut self, _current: Option<&str>) -> Result<Option<String>, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Prompt("closed".to_string()));
        }
        Ok(self.links.pop_front().flatten())
    }

    fn image_url(&mut self) -> Result<Option<String>, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Prompt("closed".to_string()));
        }
        Ok(self.images.pop_front().flatten())
    }

    fn table_size(
        &mut self,
        _defaults: TableDefaults,
    ) -> Result<Option<TableDefaults>, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Prompt("closed".to_string()));
        }
        Ok(self.tables.pop_front().flatten())
    }
}

fn table_markup(rows: usize, cols: usize) -> String {
    let mut out = String::from("<table>");
    for r in 0..rows {
        out.push_str("<tr>");
        for c in 0..cols {
            out.push_str(&format!("<td><p>{r}{c}</p></td>"));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn mount_with(markup: &str, clipboard: FakeClipboard, prompt: ScriptedPrompt) -> Composer {
    let hub = PointerHub::new();
    Composer::new(
        markup,
        ComposerSettings::default(),
        Box::new(clipboard),
        Box::new(prompt),
        &hub,
    )
    .unwrap()
}

fn mount(markup: &str) -> Composer {
    let mut composer = mount_with(markup, FakeClipboard::default(), ScriptedPrompt::default());
    composer.focus();
    composer
}

fn types(doc: &Node) -> Vec<NodeType> {
    doc.children().iter().map(Node::node_type).collect()
}

fn hello_table_world() -> Composer {
    mount(&format!("<p>Hello</p>{}<p>World</p>", table_markup(3, 3)))
}

#[test]
fn test_move_table_up_then_down() {
    let mut composer = hello_table_world();
    let original = composer.document().clone();
    assert!(composer.select_table(&[1]).is_applied());

    assert_eq!(composer.move_table_up(), CommandOutcome::Applied);
    assert_eq!(
        types(composer.document()),
        vec![NodeType::Table, NodeType::Paragraph, NodeType::Paragraph]
    );
    assert_eq!(composer.document().child(1).unwrap().text_content(), "Hello");
    assert!(composer.markup().starts_with("<table>"));

    assert_eq!(composer.move_table_down(), CommandOutcome::Applied);
    assert_eq!(composer.document(), &original);
}

#[test]
fn test_move_table_without_sibling() {
    let mut composer = mount(&format!("{}<p>World</p>", table_markup(1, 1)));
    composer.select_table(&[0]);
    assert_eq!(
        composer.move_table_up(),
        CommandOutcome::NoOp(Diagnostic::NoSiblingInDirection)
    );
    assert!(matches!(composer.table_state(), TableState::TableSelected { .. }));
}

#[test]
fn test_move_requires_selected_table() {
    let mut composer = hello_table_world();
    assert_eq!(
        composer.move_table_down(),
        CommandOutcome::NoOp(Diagnostic::NotTableSelected)
    );
}

#[test]
fn test_clear_formatting_on_bold_italic_text() {
    let mut composer = mount("<p><strong><em>Hello</em></strong></p>");
    composer.set_selection(1, 6).unwrap();
    assert_eq!(composer.clear_formatting(), CommandOutcome::Applied);

    let text = composer.document().child(0).unwrap().child(0).unwrap().clone();
    assert_eq!(text.text(), Some("Hello"));
    assert_eq!(text.marks(), Some(&MarkSet::new()));
    assert_eq!(composer.markup(), "<p>Hello</p>");
}

#[test]
fn test_insert_table_on_empty_document() {
    let mut composer = mount("");
    assert_eq!(composer.insert_table(3, 3, true), CommandOutcome::Applied);

    let doc = composer.document().clone();
    assert_eq!(types(&doc), vec![NodeType::Table]);
    let table = doc.child(0).unwrap();
    for (r, row) in table.children().iter().enumerate() {
        assert_eq!(row.child_count(), 3);
        for cell in row.children() {
            let header = matches!(cell.kind(), NodeKind::TableCell { header: true });
            assert_eq!(header, r == 0);
        }
    }

    composer.set_selection(0, doc.content_size()).unwrap();
    assert_eq!(composer.selection().selected_text(&doc).unwrap(), "");
    assert_eq!(composer.stats().characters, 0);
}

#[test]
fn test_insert_table_collapses_into_first_cell() {
    let mut composer = mount("<p>Hello</p>");
    composer.set_selection(6, 6).unwrap();
    composer.insert_table(2, 2, false);
    assert_eq!(
        types(composer.document()),
        vec![NodeType::Paragraph, NodeType::Table]
    );
    // Typing lands in the first cell
    composer.handle_key(Key::Char('x'));
    let table = composer.document().child(1).unwrap();
    assert_eq!(table.child(0).unwrap().child(0).unwrap().text_content(), "x");
}

#[test]
fn test_delete_only_table_leaves_empty_paragraph() {
    let mut composer = mount(&table_markup(1, 1));
    composer.select_table(&[0]);
    assert_eq!(composer.delete_table(), CommandOutcome::Applied);
    assert_eq!(composer.table_state(), &TableState::Idle);
    assert_eq!(types(composer.document()), vec![NodeType::Paragraph]);
    assert_eq!(composer.markup(), "<p></p>");
}

#[test]
fn test_delete_table_then_undo_restores_it() {
    let mut composer = hello_table_world();
    let original = composer.document().clone();
    let markup = composer.markup().to_string();
    composer.select_table(&[1]);
    composer.delete_table();
    assert_eq!(composer.document().child_count(), 2);

    assert_eq!(composer.undo(), CommandOutcome::Applied);
    assert_eq!(composer.document(), &original);
    assert_eq!(composer.markup(), markup);
}

#[test]
fn test_backspace_deletes_selected_table() {
    let mut composer = hello_table_world();
    composer.select_table(&[1]);
    assert_eq!(composer.handle_key(Key::Backspace), CommandOutcome::Applied);
    assert_eq!(
        types(composer.document()),
        vec![NodeType::Paragraph, NodeType::Paragraph]
    );
    assert_eq!(composer.document().text_content(), "HelloWorld");

    // Without a selected table Backspace is a character deletion again
    composer.set_selection(6, 6).unwrap();
    composer.handle_key(Key::Backspace);
    assert_eq!(composer.document().child(0).unwrap().text_content(), "Hell");
}

#[test]
fn test_escape_deselects_table() {
    let mut composer = hello_table_world();
    composer.select_table(&[1]);
    composer.handle_key(Key::Escape);
    assert_eq!(composer.table_state(), &TableState::Idle);
    assert_eq!(
        composer.handle_key(Key::Escape),
        CommandOutcome::NoOp(Diagnostic::Unchanged)
    );
}

#[test]
fn test_typing_and_enter() {
    let mut composer = mount("<p>Hello</p>");
    composer.set_selection(6, 6).unwrap();
    for c in " there".chars() {
        composer.handle_key(Key::Char(c));
    }
    composer.handle_key(Key::Enter);
    composer.handle_key(Key::Char('!'));
    assert_eq!(composer.markup(), "<p>Hello there</p><p>!</p>");
    assert_eq!(composer.stats().words, 2);
}

#[test]
fn test_typing_over_whole_document() {
    let mut composer = hello_table_world();
    let original = composer.document().clone();
    let size = original.content_size();
    composer.set_selection(0, size).unwrap();
    assert_eq!(composer.handle_key(Key::Char('x')), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>x</p>");
    assert_eq!(composer.selection().current().map(|s| s.head), Some(2));

    assert_eq!(composer.undo(), CommandOutcome::Applied);
    assert_eq!(composer.document(), &original);
}

#[test]
fn test_typing_over_selection_from_block_boundary() {
    let mut composer = mount("<p>Hello</p><p>World</p>");
    // From the boundary before "World" to "Wo|rld"
    composer.set_selection(7, 10).unwrap();
    assert_eq!(composer.handle_key(Key::Char('x')), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>Hello</p><p>xrld</p>");
}

#[test]
fn test_clear_formatting_lifts_list() {
    let mut composer = mount("<ul><li><p><strong>item</strong></p></li></ul>");
    composer.set_selection(3, 7).unwrap();
    assert_eq!(composer.clear_formatting(), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>item</p>");
}

#[test]
fn test_quoted_line_breaks_survive() {
    let composer = mount("<p>Regards,<br>Ann</p>");
    assert_eq!(composer.markup(), "<p>Regards,<br>Ann</p>");
}

#[test]
fn test_commands_are_silent_noops_when_unfocused() {
    let mut composer = mount("<p><strong>Hello</strong></p>");
    composer.set_selection(1, 6).unwrap();
    composer.blur();
    let before = composer.document().clone();
    for outcome in [
        composer.clear_formatting(),
        composer.duplicate(),
        composer.copy_to_clipboard(),
        composer.insert_table(2, 2, false),
        composer.insert_table_from_prompt(),
        composer.set_link(),
        composer.insert_image(),
        composer.handle_key(Key::Char('x')),
    ] {
        assert_eq!(outcome, CommandOutcome::NoOp(Diagnostic::SelectionUnavailable));
    }
    assert_eq!(composer.document(), &before);
}

#[test]
fn test_rejected_command_leaves_state_untouched() {
    let mut composer = mount("<p>Hello</p><hr><p>World</p>");
    // Between the paragraph and the rule: no textblock to type into
    composer.set_selection(7, 7).unwrap();
    let before = composer.document().clone();
    let outcome = composer.handle_key(Key::Char('x'));
    assert!(matches!(outcome, CommandOutcome::NoOp(Diagnostic::Rejected(_))));
    assert_eq!(composer.document(), &before);
    assert_eq!(composer.selection().current().unwrap().head, 7);
}

#[test]
fn test_copy_to_clipboard() {
    let clipboard = FakeClipboard::default();
    let written = clipboard.written.clone();
    let mut composer = mount_with(
        "<p><strong>Hello</strong></p><p>World</p>",
        clipboard,
        ScriptedPrompt::default(),
    );
    composer.focus();
    composer.set_selection(2, 11).unwrap();
    assert_eq!(composer.copy_to_clipboard(), CommandOutcome::Applied);
    assert_eq!(written.borrow().as_slice(), ["ello\nWor".to_string()]);
}

#[test]
fn test_clipboard_failure_is_reported() {
    let clipboard = FakeClipboard {
        fail: true,
        ..FakeClipboard::default()
    };
    let mut composer = mount_with("<p>Hello</p>", clipboard, ScriptedPrompt::default());
    composer.focus();
    composer.set_selection(1, 6).unwrap();
    let before = composer.document().clone();
    assert!(matches!(
        composer.copy_to_clipboard(),
        CommandOutcome::NoOp(Diagnostic::CollaboratorFailure(CollaboratorError::Clipboard(_)))
    ));
    assert_eq!(composer.document(), &before);
}

#[test]
fn test_duplicate_selection() {
    let mut composer = mount("<p>One</p><p>Two</p>");
    composer.set_selection(0, 5).unwrap();
    assert_eq!(composer.duplicate(), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>One</p><p>One</p><p>Two</p>");
    let doc = composer.document();
    assert_ne!(doc.child(0).unwrap().id(), doc.child(1).unwrap().id());
}

#[test]
fn test_prompted_commands() {
    let prompt = ScriptedPrompt {
        links: VecDeque::from([None, Some("https://example.test".to_string())]),
        images: VecDeque::from([Some("cat.png".to_string())]),
        tables: VecDeque::from([
            None,
            Some(TableDefaults {
                rows: 1,
                cols: 2,
                header_row: false,
            }),
        ]),
        fail: false,
    };
    let mut composer = mount_with("<p>see docs</p>", FakeClipboard::default(), prompt);
    composer.focus();
    composer.set_selection(5, 9).unwrap();

    let before = composer.document().clone();
    assert_eq!(composer.set_link(), CommandOutcome::NoOp(Diagnostic::Cancelled));
    assert_eq!(composer.document(), &before);
    assert_eq!(composer.set_link(), CommandOutcome::Applied);
    assert_eq!(
        composer.markup(),
        "<p>see <a href=\"https://example.test\">docs</a></p>"
    );
    assert_eq!(composer.unset_link(), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>see docs</p>");

    composer.set_selection(10, 10).unwrap();
    assert_eq!(composer.insert_image(), CommandOutcome::Applied);
    assert!(composer.markup().contains("<img src=\"cat.png\">"));

    assert_eq!(
        composer.insert_table_from_prompt(),
        CommandOutcome::NoOp(Diagnostic::Cancelled)
    );
    composer.set_selection(1, 1).unwrap();
    assert_eq!(composer.insert_table_from_prompt(), CommandOutcome::Applied);
    let table = composer.document().child(0).unwrap();
    assert_eq!(table.node_type(), NodeType::Table);
    assert_eq!(table.child(0).unwrap().child_count(), 2);
}

#[test]
fn test_prompt_failure_is_reported() {
    let prompt = ScriptedPrompt {
        fail: true,
        ..ScriptedPrompt::default()
    };
    let mut composer = mount_with("<p>Hello</p>", FakeClipboard::default(), prompt);
    composer.focus();
    assert!(matches!(
        composer.insert_image(),
        CommandOutcome::NoOp(Diagnostic::CollaboratorFailure(CollaboratorError::Prompt(_)))
    ));
}

#[test]
fn test_formatting_commands() {
    let mut composer = mount("<p>Hello</p>");
    composer.set_selection(1, 6).unwrap();
    composer.toggle_mark(Mark::Bold);
    assert_eq!(composer.markup(), "<p><strong>Hello</strong></p>");
    composer.set_heading(2);
    assert_eq!(composer.markup(), "<h2><strong>Hello</strong></h2>");
    assert!(matches!(
        composer.set_heading(7),
        CommandOutcome::NoOp(Diagnostic::Rejected(_))
    ));
    composer.set_paragraph();
    composer.toggle_mark(Mark::Bold);
    assert_eq!(composer.markup(), "<p>Hello</p>");

    composer.set_selection(6, 6).unwrap();
    assert_eq!(composer.insert_horizontal_rule(), CommandOutcome::Applied);
    assert!(composer.markup().starts_with("<p>Hello</p><hr>"));
}

#[test]
fn test_undo_redo_commands() {
    let mut composer = mount("<p>Hello</p>");
    composer.set_selection(6, 6).unwrap();
    composer.handle_key(Key::Char('!'));
    assert_eq!(composer.undo(), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>Hello</p>");
    assert_eq!(composer.redo(), CommandOutcome::Applied);
    assert_eq!(composer.markup(), "<p>Hello!</p>");
    assert!(matches!(
        composer.redo(),
        CommandOutcome::NoOp(Diagnostic::Rejected(_))
    ));
}

#[test]
fn test_history_cap_from_settings() {
    let mut settings = ComposerSettings::default();
    settings.history.max_entries = 2;
    let hub = PointerHub::new();
    let mut composer = Composer::new(
        "<p>abc</p>",
        settings,
        Box::new(FakeClipboard::default()),
        Box::new(ScriptedPrompt::default()),
        &hub,
    )
    .unwrap();
    composer.focus();
    composer.set_selection(4, 4).unwrap();
    for _ in 0..3 {
        composer.handle_key(Key::Backspace);
    }
    assert!(composer.undo().is_applied());
    assert!(composer.undo().is_applied());
    assert!(!composer.undo().is_applied());
    assert_eq!(composer.markup(), "<p>ab</p>");
}

#[test]
fn test_pointer_events_drive_table_selection() {
    let hub = PointerHub::new();
    let mut composer = Composer::new(
        &format!("<p>Hello</p>{}", table_markup(2, 2)),
        ComposerSettings::default(),
        Box::new(FakeClipboard::default()),
        Box::new(ScriptedPrompt::default()),
        &hub,
    )
    .unwrap();
    let table = composer.document().child(1).unwrap().id().unwrap();

    hub.publish(PointerEvent::new(composer.region(), PointerTarget::Table(table)));
    assert_eq!(composer.pump_pointer_events(), 1);
    assert_eq!(
        composer.table_state(),
        &TableState::TableSelected {
            table,
            path: vec![1]
        }
    );

    // A press anywhere else deselects
    hub.publish(PointerEvent::outside());
    composer.pump_pointer_events();
    assert_eq!(composer.table_state(), &TableState::Idle);

    // A press on text focuses and places the caret
    hub.publish(PointerEvent::new(composer.region(), PointerTarget::Position(3)));
    composer.pump_pointer_events();
    assert_eq!(composer.selection().current().map(|s| s.head), Some(3));

    assert_eq!(hub.subscriber_count(), 1);
    drop(composer);
    assert_eq!(hub.subscriber_count(), 0);
}

#[test]
fn test_unknown_markup_is_mapped() {
    let composer = mount("<div>Loose <span>text</span></div><blockquote><p>Quoted</p></blockquote>");
    assert_eq!(composer.markup(), "<p>Loose text</p><p>Quoted</p>");
}

proptest! {
    #[test]
    fn prop_undo_everything_restores_seed(keys in prop::collection::vec(0u8..6, 1..20), start in 0usize..20) {
        let mut composer = hello_table_world();
        let original = composer.document().clone();
        let size = original.content_size();
        composer.set_selection(start % size, start % size).unwrap();

        let mut applied = 0;
        for key in keys {
            let key = match key {
                0 => Key::Char('a'),
                1 => Key::Char(' '),
                2 => Key::Backspace,
                3 => Key::Delete,
                4 => Key::Enter,
                _ => Key::Escape,
            };
            if composer.handle_key(key).is_applied() && key != Key::Escape {
                applied += 1;
            }
        }
        for _ in 0..applied {
            prop_assert!(composer.undo().is_applied());
        }
        prop_assert_eq!(composer.document(), &original);
    }
}
