use std::collections::HashSet;
use std::mem;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::dom::{BoundaryPoint, Document, NodeId, Range};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    pub cursor_map: Vec<(BoundaryPoint, CursorVisualPosition)>,
}

impl RenderResult {
    pub fn position_of(&self, point: BoundaryPoint) -> Option<CursorVisualPosition> {
        self.cursor_map
            .iter()
            .find(|(candidate, _)| *candidate == point)
            .map(|(_, position)| *position)
    }

    /// Caret stop closest to a screen position. Lines without stops defer
    /// to the nearest line that has some.
    pub fn point_at(&self, line: usize, column: u16) -> Option<BoundaryPoint> {
        let target_line = self
            .cursor_map
            .iter()
            .map(|(_, position)| position.line)
            .min_by_key(|candidate| candidate.abs_diff(line))?;
        self.cursor_map
            .iter()
            .filter(|(_, position)| position.line == target_line)
            .min_by_key(|(_, position)| position.column.abs_diff(column))
            .map(|(point, _)| *point)
    }

    /// Stop on the next visual line above or below `from`, keeping the
    /// column as far as the line allows.
    pub fn vertical_target(&self, from: CursorVisualPosition, down: bool) -> Option<BoundaryPoint> {
        let line = self
            .cursor_map
            .iter()
            .map(|(_, position)| position.line)
            .filter(|line| if down { *line > from.line } else { *line < from.line })
            .min_by_key(|line| line.abs_diff(from.line))?;
        self.point_at(line, from.column)
    }
}

/// Lays out the subtree under `root` into terminal lines of at most
/// `width` cells, recording where every caret stop lands.
pub fn render_surface(doc: &Document, root: NodeId, width: usize, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(doc, root, width.max(1), theme);
    renderer.render_block_contents(root);
    renderer.flush();
    renderer.finish()
}

/// The toolbar row and the columns each button occupies.
#[derive(Debug)]
pub struct ToolbarLayout {
    pub line: Line<'static>,
    pub buttons: Vec<(NodeId, std::ops::Range<u16>)>,
}

impl ToolbarLayout {
    pub fn button_at(&self, column: u16) -> Option<NodeId> {
        self.buttons
            .iter()
            .find(|(_, columns)| columns.contains(&column))
            .map(|(button, _)| *button)
    }
}

pub fn render_toolbar(doc: &Document, command_area: NodeId, theme: &Theme) -> ToolbarLayout {
    let mut spans = Vec::new();
    let mut buttons = Vec::new();
    let mut column: u16 = 0;
    for (idx, &button) in doc.children(command_area).iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" ", theme.toolbar_style()));
            column += 1;
        }
        let label = format!(" {} ", doc.text_content(button));
        let width = visible_width(&label) as u16;
        buttons.push((button, column..column + width));
        spans.push(Span::styled(label, theme.button_style()));
        column += width;
    }
    ToolbarLayout {
        line: Line::from(spans),
        buttons,
    }
}

struct Renderer<'a> {
    doc: &'a Document,
    theme: &'a Theme,
    wrap_width: usize,
    stops: HashSet<BoundaryPoint>,
    caret: Option<BoundaryPoint>,
    selection: Option<Range>,
    run: RunBuilder,
    prefix: String,
    marker: Option<String>,
    preformatted: bool,
    cursor: Option<CursorVisualPosition>,
    cursor_map: Vec<(BoundaryPoint, CursorVisualPosition)>,
    lines: Vec<Line<'static>>,
}

impl<'a> Renderer<'a> {
    fn new(doc: &'a Document, root: NodeId, wrap_width: usize, theme: &'a Theme) -> Self {
        let stops = match doc.editing_host(root) {
            Some(host) => doc.caret_stops(host).into_iter().collect(),
            None => HashSet::new(),
        };
        let caret = doc
            .selection()
            .focus()
            .and_then(|focus| doc.caret_stop(focus));
        let selection = doc.range().filter(|range| !range.is_collapsed());
        Self {
            doc,
            theme,
            wrap_width,
            stops,
            caret,
            selection,
            run: RunBuilder::new(wrap_width),
            prefix: String::new(),
            marker: None,
            preformatted: false,
            cursor: None,
            cursor_map: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn render_node(&mut self, node: NodeId) {
        let doc = self.doc;
        if let Some(text) = doc.text(node) {
            self.render_text(node, text);
            return;
        }
        match doc.tag_name(node) {
            Some("hr") => {
                self.flush();
                self.push_rule();
            }
            Some("br") => self.run.line_break(),
            _ if doc.is_block(node) => self.render_block(node),
            _ => {
                for &child in doc.children(node) {
                    self.render_node(child);
                }
            }
        }
    }

    fn render_block(&mut self, node: NodeId) {
        self.flush();
        let saved_prefix = self.prefix.clone();
        let saved_preformatted = self.preformatted;
        let is_item = self.doc.has_tag(node, "li");
        let saved_marker = if is_item { self.marker.take() } else { None };

        match self.doc.tag_name(node) {
            Some("li") => {
                let marker = self.list_marker(node);
                let continuation = " ".repeat(visible_width(&marker));
                self.marker = Some(format!("{}{}", self.prefix, marker));
                self.prefix.push_str(&continuation);
            }
            Some("blockquote") => self.prefix.push_str("| "),
            Some("pre") => self.preformatted = true,
            _ => {}
        }
        self.run.max_word = self.word_limit();

        self.render_block_contents(node);
        self.flush();

        self.prefix = saved_prefix;
        if is_item {
            self.marker = saved_marker;
        }
        self.preformatted = saved_preformatted;
        self.run.max_word = self.word_limit();
    }

    fn render_block_contents(&mut self, node: NodeId) {
        let stop = BoundaryPoint::new(node, 0);
        if self.stops.contains(&stop) {
            self.run.push_event(stop);
        }
        let doc = self.doc;
        for &child in doc.children(node) {
            self.render_node(child);
        }
    }

    fn list_marker(&self, item: NodeId) -> String {
        let ordered = self
            .doc
            .parent(item)
            .is_some_and(|list| self.doc.has_tag(list, "ol"));
        if !ordered {
            return "• ".to_string();
        }
        let number = self
            .doc
            .parent(item)
            .map(|list| {
                self.doc
                    .children(list)
                    .iter()
                    .take_while(|sibling| **sibling != item)
                    .filter(|sibling| self.doc.has_tag(**sibling, "li"))
                    .count()
            })
            .unwrap_or(0);
        format!("{}. ", number + 1)
    }

    fn word_limit(&self) -> usize {
        if self.preformatted {
            return usize::MAX;
        }
        self.wrap_width
            .saturating_sub(visible_width(&self.prefix))
            .max(1)
    }

    fn render_text(&mut self, node: NodeId, text: &str) {
        let base = self.text_style(node);
        let selection = self.selection.filter(|range| self.doc.range_intersects_node(range, node));
        let fully_selected = selection.is_some_and(|range| self.doc.range_contains_node(&range, node));

        let mut len = 0;
        for (offset, ch) in text.chars().enumerate() {
            let point = BoundaryPoint::new(node, offset);
            if self.stops.contains(&point) {
                self.run.push_event(point);
            }
            let selected = fully_selected
                || selection.is_some_and(|range| {
                    self.doc.compare_points(range.start, point).is_le()
                        && self
                            .doc
                            .compare_points(BoundaryPoint::new(node, offset + 1), range.end)
                            .is_le()
                });
            let style = if selected {
                base.patch(self.theme.selection_style())
            } else {
                base
            };
            self.run.push_char(ch, style);
            len = offset + 1;
        }
        let end = BoundaryPoint::new(node, len);
        if self.stops.contains(&end) {
            self.run.push_event(end);
        }
    }

    fn text_style(&self, node: NodeId) -> Style {
        let doc = self.doc;
        let mut style = Style::default();
        if let Some(weight) = doc.computed_style(node, "font-weight")
            && matches!(weight, "bold" | "bolder" | "600" | "700" | "800" | "900")
        {
            style = style.add_modifier(Modifier::BOLD);
        }
        if doc.computed_style(node, "font-style") == Some("italic") {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if let Some(decoration) = doc.computed_style(node, "text-decoration") {
            if decoration.contains("underline") {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if decoration.contains("line-through") {
                style = style.add_modifier(Modifier::CROSSED_OUT);
            }
        }
        if doc.computed_style(node, "font-family") == Some("monospace") {
            style = style.add_modifier(Modifier::DIM);
        }
        for ancestor in doc.ancestors(node) {
            match doc.tag_name(ancestor) {
                Some("mark") => style = style.patch(self.theme.highlight_style()),
                Some("a") => style = style.patch(self.theme.link_style()),
                _ => {}
            }
        }
        style
    }

    fn push_rule(&mut self) {
        let prefix = self.marker.take().unwrap_or_else(|| self.prefix.clone());
        let width = self.wrap_width.saturating_sub(visible_width(&prefix)).max(1);
        let spans = vec![
            Span::raw(prefix),
            Span::styled("─".repeat(width), self.theme.rule_style()),
        ];
        self.lines.push(Line::from(spans));
    }

    fn flush(&mut self) {
        let items = self.run.finish();
        if items.is_empty() {
            return;
        }
        let first_prefix = self.marker.take().unwrap_or_else(|| self.prefix.clone());
        let width = if self.preformatted {
            usize::MAX / 4
        } else {
            self.wrap_width
        };
        let outputs = wrap_fragments(&items, &first_prefix, &self.prefix, width);
        self.consume_lines(outputs);
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let line_index = self.lines.len();
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            for event in output.events {
                let position = CursorVisualPosition {
                    line: line_index,
                    column: event.column,
                };
                if Some(event.point) == self.caret {
                    self.cursor = Some(position);
                }
                self.cursor_map.push((event.point, position));
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
            cursor_map: self.cursor_map,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
}

#[derive(Clone, Copy)]
struct LocatedEvent {
    column: u16,
    point: BoundaryPoint,
}

#[derive(Clone)]
struct Fragment {
    segments: Vec<LineSegment>,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

#[derive(Clone, Copy)]
struct TextEvent {
    offset: usize,
    point: BoundaryPoint,
}

/// Collects the inline content of one block into wrap-ready fragments.
/// Words longer than `max_word` cells are cut so they can still wrap.
struct RunBuilder {
    items: Vec<FragmentItem>,
    builder: Option<TokenBuilder>,
    pending: Vec<TextEvent>,
    max_word: usize,
}

impl RunBuilder {
    fn new(max_word: usize) -> Self {
        Self {
            items: Vec::new(),
            builder: None,
            pending: Vec::new(),
            max_word,
        }
    }

    fn push_event(&mut self, point: BoundaryPoint) {
        self.pending.push(TextEvent { offset: 0, point });
    }

    fn push_char(&mut self, ch: char, style: Style) {
        match ch {
            '\r' => {}
            '\n' => self.line_break(),
            '\t' => {
                for _ in 0..4 {
                    self.push_visible(' ', style);
                }
            }
            _ => self.push_visible(ch, style),
        }
    }

    fn push_visible(&mut self, ch: char, style: Style) {
        let is_whitespace = ch.is_whitespace();
        let fits = self.builder.as_ref().is_some_and(|existing| {
            existing.kind_matches(is_whitespace) && existing.width < self.max_word
        });
        if !fits {
            self.finish_token();
            self.builder = Some(TokenBuilder::new(is_whitespace));
        }
        if let Some(current) = self.builder.as_mut() {
            current.add_events(&mut self.pending);
            current.push_char(ch, style);
        }
    }

    fn finish_token(&mut self) {
        if let Some(mut token) = self.builder.take() {
            token.add_events(&mut self.pending);
            self.items.push(FragmentItem::Token(token.finish()));
        } else if !self.pending.is_empty() {
            self.items.push(FragmentItem::Token(Fragment {
                segments: Vec::new(),
                kind: FragmentKind::Word,
                width: 0,
                events: self.pending.drain(..).collect(),
            }));
        }
    }

    fn line_break(&mut self) {
        self.finish_token();
        self.items.push(FragmentItem::LineBreak);
    }

    fn finish(&mut self) -> Vec<FragmentItem> {
        self.finish_token();
        mem::take(&mut self.items)
    }
}

struct TokenBuilder {
    segments: Vec<LineSegment>,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

impl TokenBuilder {
    fn new(is_whitespace: bool) -> Self {
        Self {
            segments: Vec::new(),
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            events: Vec::new(),
        }
    }

    fn kind_matches(&self, is_whitespace: bool) -> bool {
        matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        )
    }

    fn add_events(&mut self, pending: &mut Vec<TextEvent>) {
        for mut event in pending.drain(..) {
            event.offset = self.width;
            self.events.push(event);
        }
    }

    fn push_char(&mut self, ch: char, style: Style) {
        match self.segments.last_mut() {
            Some(segment) if segment.style == style => segment.text.push(ch),
            _ => self.segments.push(LineSegment {
                text: ch.to_string(),
                style,
            }),
        }
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            segments: self.segments,
            kind: self.kind,
            width: self.width,
            events: self.events,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &str,
    continuation_prefix: &str,
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > builder.prefix_width
                        && builder.width + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix);
                    }
                    builder.consume_pending(&mut pending_whitespace);
                    builder.append_token(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &str) -> Self {
        let prefix_width = visible_width(prefix);
        let mut segments = Vec::new();
        if !prefix.is_empty() {
            segments.push(LineSegment {
                text: prefix.to_string(),
                style: Style::default(),
            });
        }
        Self {
            segments,
            events: Vec::new(),
            width: prefix_width,
            prefix_width,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        let start = self.width;
        self.segments.extend(fragment.segments);
        self.width += fragment.width;
        for event in fragment.events {
            self.events.push(LocatedEvent {
                column: (start + event.offset) as u16,
                point: event.point,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        self.events.sort_by_key(|event| event.column);
        LineOutput {
            spans: self.segments,
            events: self.events,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}
