use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;

fn widget() -> (Document, Rte) {
    let mut page = Document::new();
    let container = page.create_element("div");
    page.append_child(page.body(), container);
    let rte = Rte::init(&mut page, container, 300, 200);
    (page, rte)
}

/// Adds `<div>text</div>` to the editor and returns the text node.
fn line(rte: &mut Rte, text: &str) -> NodeId {
    let editor = rte.editor();
    let doc = rte.document_mut();
    let div = doc.create_element("div");
    let node = doc.create_text(text);
    doc.append_child(editor, div);
    doc.append_child(div, node);
    node
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn init_builds_frame_inside_container() {
    let (page, rte) = widget();
    assert_eq!(page.element_by_id(FRAME_ID), Some(rte.frame()));
    assert_eq!(page.parent(rte.frame()), Some(rte.root()));
    assert_eq!(
        page.css_text(rte.frame()),
        "border: 1px solid black; width: 300px; height: 200px;"
    );
    assert_eq!((rte.width(), rte.height()), (300, 200));
}

#[test]
fn init_places_toolbar_before_editor() {
    let (_, rte) = widget();
    let doc = rte.document();
    assert_eq!(doc.children(doc.body()), &[rte.command_area(), rte.editor()]);
    assert_eq!(doc.element_by_id(EDITOR_ID), Some(rte.editor()));
    assert_eq!(doc.element_by_id(COMMAND_AREA_ID), Some(rte.command_area()));
    assert!(doc.has_class(rte.command_area(), "rte_commandArea"));
    assert_eq!(doc.attribute(rte.editor(), "contenteditable"), Some("true"));
    assert_eq!(doc.style(rte.editor(), "height"), Some("100%"));
    assert_eq!(doc.style(rte.command_area(), "height"), Some("2em"));
}

#[test]
fn toolbar_buttons_follow_command_order() {
    let (_, rte) = widget();
    let doc = rte.document();
    let labels: Vec<String> = doc
        .children(rte.command_area())
        .iter()
        .map(|button| doc.text_content(*button))
        .collect();
    assert_eq!(
        labels,
        ["サイズ", "bold", "italic", "underline", "left", "center", "right", "hr"]
    );
    assert!(doc.children(rte.command_area()).iter().all(|b| doc.has_tag(*b, "button")));
    assert_eq!(rte.button(Command::Hr), doc.last_child(rte.command_area()));
}

#[test]
fn resize_rewrites_frame_style() {
    let (mut page, mut rte) = widget();
    rte.resize(&mut page, 80, 24);
    assert_eq!(page.style(rte.frame(), "width"), Some("80px"));
    assert_eq!(page.style(rte.frame(), "height"), Some("24px"));
    assert_eq!(rte.width(), 80);
}

#[test]
fn hr_twice_appends_two_rules() {
    let (_, mut rte) = widget();
    line(&mut rte, "text");
    assert_eq!(rte.invoke(Command::Hr), CommandOutcome::Applied);
    assert_eq!(rte.invoke(Command::Hr), CommandOutcome::Applied);

    let doc = rte.document();
    let children = doc.children(rte.editor());
    assert_eq!(children.len(), 3);
    for rule in &children[1..] {
        assert!(doc.has_tag(*rule, "hr"));
        assert_eq!(doc.attribute(*rule, "contenteditable"), Some("false"));
        assert_eq!(doc.style(*rule, "pointer-events"), Some("none"));
        assert!(!doc.is_editable(*rule));
    }
}

#[test]
fn stub_commands_alert_without_touching_the_document() {
    let (_, mut rte) = widget();
    let text = line(&mut rte, "hello");
    move_caret(rte.document_mut(), text, 0, 5);

    assert_eq!(rte.invoke(Command::Size), CommandOutcome::Alert("size"));
    assert_eq!(rte.invoke(Command::Italic), CommandOutcome::Alert("toggleItalic"));
    assert_eq!(
        rte.invoke(Command::Underline),
        CommandOutcome::Alert("toggleUnderline")
    );
    for command in [Command::Left, Command::Center, Command::Right] {
        assert_eq!(rte.invoke(command), CommandOutcome::Ignored);
    }
    let doc = rte.document();
    assert_eq!(doc.children(rte.editor()).len(), 1);
    assert_eq!(doc.text(text), Some("hello"));
}

#[test]
fn click_on_button_label_runs_its_command() {
    let (_, mut rte) = widget();
    let button = rte.button(Command::Size).expect("size button");
    let label = rte.document().first_child(button).expect("label text");
    assert_eq!(rte.click(label), Some(CommandOutcome::Alert("size")));
    assert_eq!(rte.click(rte.editor()), None);
}

#[test]
fn bold_button_toggles_selection() {
    let (_, mut rte) = widget();
    let text = line(&mut rte, "hello");
    move_caret(rte.document_mut(), text, 0, 5);

    assert_eq!(rte.invoke(Command::Bold), CommandOutcome::Applied);
    let doc = rte.document();
    let range = doc.range().expect("selection survives");
    let wrapper = doc
        .child(range.start.node, range.start.offset)
        .expect("wrapper");
    assert!(doc.has_class(wrapper, WRAPPER_CLASS));
    assert_eq!(doc.text_content(wrapper), "hello");
    let inner = doc.first_child(wrapper).expect("wrapped text");
    assert_eq!(doc.computed_style(inner, "font-weight"), Some("bold"));
}

#[test]
fn bold_without_selection_changes_nothing() {
    let (_, mut rte) = widget();
    line(&mut rte, "hello");
    rte.focus();
    assert_eq!(rte.invoke(Command::Bold), CommandOutcome::Unchanged);
}

#[test]
fn only_backspace_is_intercepted() {
    let (_, mut rte) = widget();
    let text = line(&mut rte, "ab");
    rte.document_mut().collapse(BoundaryPoint::new(text, 0));

    assert_eq!(rte.handle_key(&key(KeyCode::Char('x'))), KeyFlow::Propagate);
    assert_eq!(rte.handle_key(&key(KeyCode::Enter)), KeyFlow::Propagate);
    assert_eq!(rte.handle_key(&key(KeyCode::Backspace)), KeyFlow::Suppress);
    assert_eq!(rte.document().text(text), Some("ab"));

    rte.document_mut().collapse(BoundaryPoint::new(text, 2));
    assert_eq!(rte.handle_key(&key(KeyCode::Backspace)), KeyFlow::Propagate);
}

#[test]
fn backspace_outside_the_editor_is_not_intercepted() {
    let (_, mut rte) = widget();
    let button = rte.button(Command::Bold).expect("bold button");
    rte.document_mut().collapse(BoundaryPoint::new(button, 0));
    assert_eq!(rte.handle_key(&key(KeyCode::Backspace)), KeyFlow::Propagate);
}

#[test]
fn focus_moves_caret_to_first_stop() {
    let (_, mut rte) = widget();
    let text = line(&mut rte, "ab");
    assert!(!rte.has_focus());
    rte.focus();
    assert_eq!(
        rte.document().selection().focus(),
        Some(BoundaryPoint::new(text, 0))
    );
}

#[test]
fn move_caret_selects_inside_node() {
    let (_, mut rte) = widget();
    let text = line(&mut rte, "hello");
    move_caret(rte.document_mut(), text, 1, 3);
    let range = rte.document().range().expect("selection");
    assert_eq!(range.start, BoundaryPoint::new(text, 1));
    assert_eq!(range.end, BoundaryPoint::new(text, 3));
}

#[test]
fn character_offset_counts_text_before_caret() {
    let (_, mut rte) = widget();
    line(&mut rte, "foo");
    let bar = line(&mut rte, "bar");
    let editor = rte.editor();
    let range = crate::dom::Range::collapsed_at(BoundaryPoint::new(bar, 2));
    assert_eq!(character_offset(rte.document_mut(), &range, editor), 5);
}

#[test]
fn character_offset_for_element_caret() {
    let (_, mut rte) = widget();
    line(&mut rte, "foo");
    line(&mut rte, "bar");
    let editor = rte.editor();
    let range = crate::dom::Range::collapsed_at(BoundaryPoint::new(editor, 1));
    assert_eq!(character_offset(rte.document_mut(), &range, editor), 3);
}
