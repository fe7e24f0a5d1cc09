use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::dom::{BoundaryPoint, Document, NodeId};

mod caret;
mod commands;
mod delete;
mod sanitize;
mod styles;

pub use caret::{character_offset, move_caret};
pub use commands::{Command, CommandOutcome, insert_horizontal_rule};
pub use delete::{DeleteOutcome, delete_previous_node};
pub use sanitize::sanitize;
pub use styles::{InlineStyle, NodeClass, Overlap, WRAPPER_CLASS, apply, classify, overlap, toggle_style};

pub const FRAME_ID: &str = "rte_iframe";
pub const EDITOR_ID: &str = "rte_editor";
pub const COMMAND_AREA_ID: &str = "rte_commandArea";

/// Whether a key should still reach the host's default handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFlow {
    Propagate,
    Suppress,
}

/// One editor widget: a frame in the page, and the content document inside
/// it holding the toolbar and the editable region.
#[derive(Debug)]
pub struct Rte {
    root: NodeId,
    width: u16,
    height: u16,
    frame: NodeId,
    content: Document,
    editor: NodeId,
    command_area: NodeId,
    buttons: Vec<(NodeId, Command)>,
}

impl Rte {
    /// Builds the widget under `root` in `page`.
    pub fn init(page: &mut Document, root: NodeId, width: u16, height: u16) -> Self {
        let frame = page.create_element("iframe");
        page.set_attribute(frame, "id", FRAME_ID);
        page.append_child(root, frame);
        page.set_css_text(frame, &frame_css(width, height));

        let mut content = Document::new();
        let editor = content.create_element("div");
        content.set_attribute(editor, "id", EDITOR_ID);
        content.set_attribute(editor, "contenteditable", "true");
        content.append_child(content.body(), editor);
        content.set_css_text(editor, "width: 100%; height: 100%");

        let command_area = content.create_element("div");
        content.set_attribute(command_area, "class", "rte_commandArea");
        content.set_attribute(command_area, "id", COMMAND_AREA_ID);
        content.set_css_text(
            command_area,
            "width: 100%; height: 2em; border-bottom: 1px solid black;",
        );
        content.insert_before(content.body(), command_area, Some(editor));

        let buttons = Command::ALL
            .iter()
            .map(|&command| {
                let button = commands::create_button(&mut content, command.label());
                content.append_child(command_area, button);
                (button, command)
            })
            .collect();

        debug!(width, height, "editor initialised");
        Self {
            root,
            width,
            height,
            frame,
            content,
            editor,
            command_area,
            buttons,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The `iframe` element in the page document.
    pub fn frame(&self) -> NodeId {
        self.frame
    }

    pub fn document(&self) -> &Document {
        &self.content
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.content
    }

    pub fn editor(&self) -> NodeId {
        self.editor
    }

    pub fn command_area(&self) -> NodeId {
        self.command_area
    }

    pub fn buttons(&self) -> &[(NodeId, Command)] {
        &self.buttons
    }

    pub fn button(&self, command: Command) -> Option<NodeId> {
        self.buttons
            .iter()
            .find(|(_, bound)| *bound == command)
            .map(|(node, _)| *node)
    }

    pub fn resize(&mut self, page: &mut Document, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        page.set_css_text(self.frame, &frame_css(width, height));
    }

    /// Puts the caret at the start of the editor unless it is already
    /// inside.
    pub fn focus(&mut self) {
        if self.has_focus() {
            return;
        }
        let start = self
            .content
            .caret_stops(self.editor)
            .first()
            .copied()
            .unwrap_or(BoundaryPoint::new(self.editor, 0));
        self.content.collapse(start);
    }

    /// True when the caret is inside the editable region.
    pub fn has_focus(&self) -> bool {
        self.content
            .selection()
            .focus_node()
            .is_some_and(|node| self.content.contains(self.editor, node))
    }

    pub fn invoke(&mut self, command: Command) -> CommandOutcome {
        let outcome = match command {
            Command::Size => CommandOutcome::Alert("size"),
            Command::Bold => {
                if toggle_style(&mut self.content, &InlineStyle::BOLD) {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Unchanged
                }
            }
            Command::Italic => CommandOutcome::Alert("toggleItalic"),
            Command::Underline => CommandOutcome::Alert("toggleUnderline"),
            Command::Left | Command::Center | Command::Right => CommandOutcome::Ignored,
            Command::Hr => {
                insert_horizontal_rule(&mut self.content, self.editor);
                CommandOutcome::Applied
            }
        };
        debug!(?command, ?outcome, "toolbar command");
        outcome
    }

    /// Dispatches a click on `node` to the button containing it.
    pub fn click(&mut self, node: NodeId) -> Option<CommandOutcome> {
        let command = self
            .buttons
            .iter()
            .find(|(button, _)| self.content.contains(*button, node))
            .map(|(_, command)| *command)?;
        Some(self.invoke(command))
    }

    /// Backspace handling for the editable region.
    pub fn backspace(&mut self) -> DeleteOutcome {
        let outcome = delete_previous_node(&mut self.content, self.editor);
        if outcome == DeleteOutcome::Handled {
            self.content.normalize_caret();
        }
        debug!(?outcome, "backspace");
        outcome
    }

    /// Key listener of the editable region. Only backspace is intercepted.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyFlow {
        if key.kind == KeyEventKind::Release || key.code != KeyCode::Backspace || !self.has_focus() {
            return KeyFlow::Propagate;
        }
        if self.backspace().suppresses_default() {
            KeyFlow::Suppress
        } else {
            KeyFlow::Propagate
        }
    }
}

fn frame_css(width: u16, height: u16) -> String {
    format!("border: 1px solid black; width: {width}px; height: {height}px;")
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;


#[cfg(test)]
#[path = "editor/style_tests.rs"]
mod style_tests;

#[cfg(test)]
#[path = "editor/delete_tests.rs"]
mod delete_tests;
