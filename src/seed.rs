//! Initial content for the editable region, read from an FTML or Markdown
//! file and laid out as plain HTML-like markup.

use std::{fs, io::Cursor, path::Path};

use anyhow::{Context, Result};
use tdoc::{ChecklistItem, InlineStyle, Paragraph, ParagraphType, Span, markdown, parse};
use tracing::debug;

use crate::dom::{Document, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedFormat {
    Ftml,
    Markdown,
}

impl SeedFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("md" | "markdown" | "mkd" | "mdown" | "mdtxt") => SeedFormat::Markdown,
            _ => SeedFormat::Ftml,
        }
    }
}

/// A parsed seed file, plus a message for the status line when the file
/// could not be used as is.
#[derive(Debug)]
pub struct Seed {
    pub document: tdoc::Document,
    pub format: SeedFormat,
    pub status: Option<String>,
}

/// Reads `path`. Missing files and parse failures give an empty document;
/// only I/O errors on an existing file are reported as errors.
pub fn load_document(path: &Path) -> Result<Seed> {
    let format = SeedFormat::from_path(path);
    if !path.exists() {
        return Ok(Seed {
            document: tdoc::Document::new(),
            format,
            status: Some("New document".to_string()),
        });
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = match format {
        SeedFormat::Ftml => parse(Cursor::new(content))
            .map_err(|err| -> Box<dyn std::error::Error + Send + Sync> { Box::new(err) }),
        SeedFormat::Markdown => markdown::parse(Cursor::new(content)),
    };
    Ok(match parsed {
        Ok(document) => Seed {
            document,
            format,
            status: None,
        },
        Err(err) => Seed {
            document: tdoc::Document::new(),
            format,
            status: Some(format!("Parse error: {err}. Starting with empty document.")),
        },
    })
}

/// Appends one block per paragraph of `source` to `editor`.
pub fn populate(doc: &mut Document, editor: NodeId, source: &tdoc::Document) {
    for paragraph in &source.paragraphs {
        append_paragraph(doc, editor, paragraph);
    }
    debug!(blocks = doc.children(editor).len(), "seeded editor");
}

fn append_paragraph(doc: &mut Document, parent: NodeId, paragraph: &Paragraph) {
    let tag = match paragraph.paragraph_type() {
        ParagraphType::Header1 => "h1",
        ParagraphType::Header2 => "h2",
        ParagraphType::Header3 => "h3",
        ParagraphType::CodeBlock => "pre",
        ParagraphType::Quote => "blockquote",
        ParagraphType::UnorderedList | ParagraphType::Checklist => "ul",
        ParagraphType::OrderedList => "ol",
        _ => "div",
    };
    let block = doc.create_element(tag);
    doc.append_child(parent, block);

    append_spans(doc, block, paragraph.content());
    for child in paragraph.children() {
        append_paragraph(doc, block, child);
    }
    for entry in paragraph.entries() {
        let item = doc.create_element("li");
        doc.append_child(block, item);
        // A lone text paragraph is the item's own text.
        match entry.as_slice() {
            [only] if only.paragraph_type() == ParagraphType::Text => {
                append_spans(doc, item, only.content());
            }
            paragraphs => {
                for child in paragraphs {
                    append_paragraph(doc, item, child);
                }
            }
        }
    }
    for item in paragraph.checklist_items() {
        append_checklist_item(doc, block, item);
    }
}

fn append_checklist_item(doc: &mut Document, list: NodeId, item: &ChecklistItem) {
    let element = doc.create_element("li");
    doc.append_child(list, element);

    let marker = doc.create_element("span");
    doc.set_attribute(marker, "contenteditable", "false");
    let label = doc.create_text(if item.checked { "[x] " } else { "[ ] " });
    doc.append_child(marker, label);
    doc.append_child(element, marker);

    append_spans(doc, element, &item.content);
    if !item.children.is_empty() {
        let nested = doc.create_element("ul");
        doc.append_child(element, nested);
        for child in &item.children {
            append_checklist_item(doc, nested, child);
        }
    }
}

fn append_spans(doc: &mut Document, parent: NodeId, spans: &[Span]) {
    for span in spans {
        let container = match inline_tag(&span.style) {
            Some(tag) => {
                let element = doc.create_element(tag);
                if let Some(target) = span.link_target.as_deref() {
                    doc.set_attribute(element, "href", target);
                }
                doc.append_child(parent, element);
                element
            }
            None => parent,
        };
        if !span.text.is_empty() {
            let text = doc.create_text(&span.text);
            doc.append_child(container, text);
        }
        append_spans(doc, container, &span.children);
    }
}

fn inline_tag(style: &InlineStyle) -> Option<&'static str> {
    match style {
        InlineStyle::Bold => Some("b"),
        InlineStyle::Italic => Some("i"),
        InlineStyle::Underline => Some("u"),
        InlineStyle::Strike => Some("s"),
        InlineStyle::Code => Some("code"),
        InlineStyle::Highlight => Some("mark"),
        InlineStyle::Link => Some("a"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn text_paragraph(text: &str) -> Paragraph {
        Paragraph::new_text().with_content(vec![Span::new_text(text)])
    }

    fn editor() -> (Document, NodeId) {
        let mut doc = Document::new();
        let editor = doc.create_element("div");
        doc.set_attribute(editor, "contenteditable", "true");
        doc.append_child(doc.body(), editor);
        (doc, editor)
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SeedFormat::from_path(Path::new("notes.MD")), SeedFormat::Markdown);
        assert_eq!(SeedFormat::from_path(Path::new("notes.ftml")), SeedFormat::Ftml);
        assert_eq!(SeedFormat::from_path(Path::new("notes")), SeedFormat::Ftml);
    }

    #[test]
    fn text_paragraphs_become_divs() {
        let mut bold = Span::new_text("World");
        bold.style = InlineStyle::Bold;
        let paragraph = Paragraph::new_text().with_content(vec![
            Span::new_text("Hello "),
            bold,
            Span::new_text("!"),
        ]);
        let source =
            tdoc::Document::new().with_paragraphs(vec![paragraph, text_paragraph("Second")]);

        let (mut doc, editor) = editor();
        populate(&mut doc, editor, &source);

        let blocks = doc.children(editor).to_vec();
        assert_eq!(blocks.len(), 2);
        assert!(doc.has_tag(blocks[0], "div"));
        assert_eq!(doc.text_content(blocks[0]), "Hello World!");
        let strong = doc.children(blocks[0])[1];
        assert!(doc.has_tag(strong, "b"));
        let world = doc.children(strong)[0];
        assert_eq!(doc.computed_style(world, "font-weight"), Some("bold"));
    }

    #[test]
    fn lists_and_quotes_nest() {
        let list = Paragraph::new_unordered_list().with_entries(vec![
            vec![text_paragraph("one")],
            vec![text_paragraph("two")],
        ]);
        let quote = Paragraph::new_quote().with_children(vec![text_paragraph("cited")]);
        let source = tdoc::Document::new().with_paragraphs(vec![list, quote]);

        let (mut doc, editor) = editor();
        populate(&mut doc, editor, &source);

        let blocks = doc.children(editor).to_vec();
        assert!(doc.has_tag(blocks[0], "ul"));
        let items = doc.children(blocks[0]).to_vec();
        assert_eq!(items.len(), 2);
        assert!(doc.has_tag(items[1], "li"));
        assert_eq!(doc.text_content(items[1]), "two");
        assert!(doc.has_tag(blocks[1], "blockquote"));
        assert_eq!(doc.text_content(blocks[1]), "cited");
    }

    #[test]
    fn checklist_boxes_are_not_editable() {
        let done = ChecklistItem::new(true).with_content(vec![Span::new_text("done")]);
        let todo = ChecklistItem::new(false).with_content(vec![Span::new_text("todo")]);
        let source = tdoc::Document::new()
            .with_paragraphs(vec![Paragraph::new_checklist().with_checklist_items(vec![done, todo])]);

        let (mut doc, editor) = editor();
        populate(&mut doc, editor, &source);

        let list = doc.children(editor)[0];
        let items = doc.children(list).to_vec();
        assert_eq!(doc.text_content(items[0]), "[x] done");
        assert_eq!(doc.text_content(items[1]), "[ ] todo");
        let marker = doc.children(items[0])[0];
        assert!(!doc.is_editable(marker));
        assert!(!doc.caret_stops(editor).iter().any(|stop| doc.contains(marker, stop.node)));
    }

    #[test]
    fn missing_file_starts_empty() {
        let path = PathBuf::from("/nonexistent/rte-seed.ftml");
        let seed = load_document(&path).expect("missing file is not an error");
        assert!(seed.document.paragraphs.is_empty());
        assert_eq!(seed.status.as_deref(), Some("New document"));
    }

    #[test]
    fn markdown_file_is_parsed() {
        let path = std::env::temp_dir().join(format!("rte-seed-{}.md", std::process::id()));
        fs::write(&path, "Hello **world**\n").expect("write seed");
        let seed = load_document(&path).expect("load seed");
        fs::remove_file(&path).ok();

        assert_eq!(seed.format, SeedFormat::Markdown);
        assert!(seed.status.is_none());
        let (mut doc, editor) = editor();
        populate(&mut doc, editor, &seed.document);
        assert!(doc.text_content(editor).contains("world"));
    }
}
