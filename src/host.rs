//! What the terminal host does with keys the widget lets through.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::trace;

use crate::dom::{CaretMotion, Document};
use crate::editor::{KeyFlow, Rte};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultAction {
    InsertChar(char),
    InsertParagraph,
    DeleteBackward,
    Move { motion: CaretMotion, extend: bool },
}

/// The editing action a key triggers when nobody suppresses it.
pub fn default_action(key: &KeyEvent) -> Option<DefaultAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let extend = key.modifiers.contains(KeyModifiers::SHIFT);
    let motion = |motion| Some(DefaultAction::Move { motion, extend });
    match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(DefaultAction::InsertChar(ch))
        }
        KeyCode::Tab => Some(DefaultAction::InsertChar('\t')),
        KeyCode::Enter => Some(DefaultAction::InsertParagraph),
        KeyCode::Backspace => Some(DefaultAction::DeleteBackward),
        KeyCode::Left => motion(CaretMotion::Left),
        KeyCode::Right => motion(CaretMotion::Right),
        KeyCode::Home => motion(CaretMotion::LineStart),
        KeyCode::End => motion(CaretMotion::LineEnd),
        _ => None,
    }
}

pub fn perform(doc: &mut Document, action: DefaultAction) -> bool {
    match action {
        DefaultAction::InsertChar(ch) => {
            let mut buffer = [0; 4];
            doc.insert_text(ch.encode_utf8(&mut buffer))
        }
        DefaultAction::InsertParagraph => doc.insert_paragraph(),
        DefaultAction::DeleteBackward => doc.delete_backward(),
        DefaultAction::Move { motion, extend } => doc.move_caret(motion, extend),
    }
}

/// Runs `key` through the widget's key listener and then, unless the
/// listener suppressed it, through the host's default action. Returns
/// whether anything may have changed.
pub fn dispatch_key(rte: &mut Rte, key: &KeyEvent) -> bool {
    if rte.handle_key(key) == KeyFlow::Suppress {
        return true;
    }
    let Some(action) = default_action(key) else {
        return false;
    };
    if !rte.has_focus() {
        return false;
    }
    let changed = perform(rte.document_mut(), action);
    trace!(?action, changed, "default action");
    changed
}
