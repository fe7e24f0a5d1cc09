use crate::dom::{Document, NodeId};

/// Toolbar commands, in button order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Size,
    Bold,
    Italic,
    Underline,
    Left,
    Center,
    Right,
    Hr,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Size,
        Command::Bold,
        Command::Italic,
        Command::Underline,
        Command::Left,
        Command::Center,
        Command::Right,
        Command::Hr,
    ];

    /// Text shown on the button.
    pub fn label(self) -> &'static str {
        match self {
            Command::Size => "サイズ",
            Command::Bold => "bold",
            Command::Italic => "italic",
            Command::Underline => "underline",
            Command::Left => "left",
            Command::Center => "center",
            Command::Right => "right",
            Command::Hr => "hr",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran and changed the document.
    Applied,
    /// The command ran but found nothing to change.
    Unchanged,
    /// Not implemented yet; the message is meant for an alert box.
    Alert(&'static str),
    /// Wired to a button but does nothing.
    Ignored,
}

pub(crate) fn create_button(doc: &mut Document, label: &str) -> NodeId {
    let button = doc.create_element("button");
    let text = doc.create_text(label);
    doc.append_child(button, text);
    button
}

/// Appends a non-editable `<hr>` at the end of the editor.
pub fn insert_horizontal_rule(doc: &mut Document, editor: NodeId) -> NodeId {
    let rule = doc.create_element("hr");
    doc.set_attribute(rule, "contenteditable", "false");
    doc.set_attribute(rule, "style", "pointer-events: none;");
    doc.append_child(editor, rule);
    rule
}
