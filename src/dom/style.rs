use super::{Document, NodeId};

/// Inline `style` attribute of an element, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    entries: Vec<(String, String)>,
}

impl StyleDeclaration {
    /// Parses `prop: value; prop: value`. Malformed declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let mut style = Self::default();
        for declaration in css.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            style.set(property, value);
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(property))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a property; an empty value removes it, as in CSSOM.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        if value.is_empty() {
            self.entries.retain(|(key, _)| *key != property);
            return;
        }
        match self.entries.iter_mut().find(|(key, _)| *key == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((property, value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Values a tag implies without any inline style.
fn tag_default(tag: &str, property: &str) -> Option<&'static str> {
    match (property, tag) {
        ("font-weight", "b" | "strong" | "h1" | "h2" | "h3" | "th") => Some("bold"),
        ("font-style", "i" | "em" | "cite") => Some("italic"),
        ("text-decoration", "u" | "a") => Some("underline"),
        ("text-decoration", "s" | "strike" | "del") => Some("line-through"),
        ("font-family", "code" | "pre" | "kbd") => Some("monospace"),
        _ => None,
    }
}

impl Document {
    /// Value of `property` as it applies to `node`: the nearest inline
    /// declaration or tag default among its inclusive ancestors.
    pub fn computed_style(&self, node: NodeId, property: &str) -> Option<&str> {
        for ancestor in self.ancestors(node) {
            if let Some(value) = self.style(ancestor, property) {
                return Some(value);
            }
            if let Some(value) = self
                .tag_name(ancestor)
                .and_then(|tag| tag_default(tag, property))
            {
                return Some(value);
            }
        }
        None
    }
}
