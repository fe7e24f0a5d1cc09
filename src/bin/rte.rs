use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rte_tui::dom::{self, BoundaryPoint};
use rte_tui::editor::{Command, CommandOutcome, Rte, character_offset};
use rte_tui::host;
use rte_tui::render::{RenderResult, ToolbarLayout, render_surface, render_toolbar};
use rte_tui::seed;
use rte_tui::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const MOUSE_SCROLL_LINES: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "rte", version, about = "A minimal rich-text editor in the terminal", long_about = None)]
struct Cli {
    /// FTML or Markdown file to seed the editor with
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Width of the editor frame in cells
    #[arg(long, default_value_t = 72)]
    width: u16,

    /// Height of the editor frame in cells
    #[arg(long, default_value_t = 18)]
    height: u16,

    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    run(cli)
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut app = App::new(cli.width, cli.height);
    if let Some(path) = &cli.file {
        let loaded = seed::load_document(path)?;
        app.seed(&loaded.document);
        if let Some(status) = loaded.status {
            app.set_status(status);
        }
        app.file_path = Some(path.clone());
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.status_message.is_some();
            app.prune_status_message();
            last_tick = Instant::now();
            if had_message_before && app.status_message.is_none() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

struct App {
    page: dom::Document,
    rte: Rte,
    theme: Theme,
    file_path: Option<PathBuf>,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    scroll_top: usize,
    last_render: Option<RenderResult>,
    toolbar: Option<ToolbarLayout>,
    toolbar_area: Rect,
    text_area: Rect,
    drag_anchor: Option<BoundaryPoint>,
}

impl App {
    fn new(width: u16, height: u16) -> Self {
        let mut page = dom::Document::new();
        let root = page.create_element("div");
        page.set_attribute(root, "id", "rte");
        page.append_child(page.body(), root);
        let mut rte = Rte::init(&mut page, root, width, height);
        rte.focus();

        Self {
            page,
            rte,
            theme: Theme::default(),
            file_path: None,
            should_quit: false,
            status_message: None,
            scroll_top: 0,
            last_render: None,
            toolbar: None,
            toolbar_area: Rect::default(),
            text_area: Rect::default(),
            drag_anchor: None,
        }
    }

    fn seed(&mut self, document: &tdoc::Document) {
        let editor = self.rte.editor();
        seed::populate(self.rte.document_mut(), editor, document);
        self.rte.document_mut().remove_all_ranges();
        self.rte.focus();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let main_area = vertical[0];
        let status_area = vertical[1];

        let frame_area = Rect {
            x: main_area.x,
            y: main_area.y,
            width: (self.rte.width().saturating_add(2)).min(main_area.width),
            height: (self.rte.height().saturating_add(2)).min(main_area.height),
        };
        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.frame_style());
        let inner = outer.inner(frame_area);
        frame.render_widget(outer, frame_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);
        let command_block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.frame_style());
        self.toolbar_area = command_block.inner(rows[0]);
        frame.render_widget(command_block, rows[0]);
        self.text_area = rows[1];

        let doc = self.rte.document();
        let toolbar = render_toolbar(doc, self.rte.command_area(), &self.theme);
        frame.render_widget(
            Paragraph::new(toolbar.line.clone()).style(self.theme.toolbar_style()),
            self.toolbar_area,
        );
        self.toolbar = Some(toolbar);

        let render = render_surface(
            doc,
            self.rte.editor(),
            self.text_area.width.max(1) as usize,
            &self.theme,
        );
        let viewport_height = self.text_area.height as usize;
        self.adjust_scroll(&render, viewport_height);

        let paragraph =
            Paragraph::new(Text::from(render.lines.clone())).scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, self.text_area);

        if self.rte.has_focus()
            && let Some(cursor) = render.cursor
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
            && self.text_area.width > 0
        {
            let cursor_y = self.text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = self.text_area.x + cursor.column.min(self.text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }
        self.last_render = Some(render);

        let status_line = self.status_line(status_area.width as usize);
        frame.render_widget(
            Paragraph::new(status_line).style(self.theme.status_bar_style()),
            status_area,
        );
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let Some(cursor) = render.cursor else {
            return;
        };
        if viewport_height == 0 {
            return;
        }
        if cursor.line < self.scroll_top {
            self.scroll_top = cursor.line;
        } else if cursor.line >= self.scroll_top + viewport_height {
            self.scroll_top = cursor.line + 1 - viewport_height;
        }
        let max_scroll = render.total_lines.saturating_sub(viewport_height);
        self.scroll_top = self.scroll_top.min(max_scroll);
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();
        if let Some((message, _)) = &self.status_message {
            return Line::from(vec![Span::styled(
                format!(" {message} "),
                self.theme.alert_style(),
            )]);
        }

        let mut spans = Vec::new();
        spans.push(Span::raw(self.cursor_position_text()));
        if let Some(path) = &self.file_path {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                path.display().to_string(),
                self.theme.filename_style(),
            ));
        }

        let left_width: usize = spans.iter().map(|span| span.content.chars().count()).sum();
        let shortcuts = "F1-F8:Toolbar ^B:Bold ^Q:Quit";
        let shortcuts_width = shortcuts.chars().count();
        if left_width + 1 + shortcuts_width <= terminal_width {
            spans.push(Span::raw(
                " ".repeat(terminal_width - left_width - shortcuts_width),
            ));
            spans.push(Span::raw(shortcuts));
        }
        Line::from(spans)
    }

    fn cursor_position_text(&mut self) -> String {
        let editor = self.rte.editor();
        let position = self
            .last_render
            .as_ref()
            .and_then(|render| render.cursor)
            .map(|cursor| format!("{}:{}", cursor.line + 1, cursor.column + 1))
            .unwrap_or_else(|| "-:-".to_string());
        let Some(range) = self.rte.document().range() else {
            return position;
        };
        if !self.rte.has_focus() {
            return position;
        }
        let offset = character_offset(self.rte.document_mut(), &range, editor);
        format!("{position} ({offset})")
    }

    fn report(&mut self, outcome: CommandOutcome) {
        if let CommandOutcome::Alert(message) = outcome {
            self.set_status(message);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Resize(width, height) => self.fit_to_terminal(width, height),
            _ => {}
        }
    }

    /// Shrinks the frame when the terminal no longer has room for it.
    fn fit_to_terminal(&mut self, width: u16, height: u16) {
        let fitted_width = self.rte.width().min(width.saturating_sub(2)).max(1);
        let fitted_height = self.rte.height().min(height.saturating_sub(3)).max(1);
        if (fitted_width, fitted_height) != (self.rte.width(), self.rte.height()) {
            self.rte.resize(&mut self.page, fitted_width, fitted_height);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q' | 'c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('b'), m) if m.contains(KeyModifiers::CONTROL) => {
                let outcome = self.rte.invoke(Command::Bold);
                self.report(outcome);
            }
            (KeyCode::F(n), _) => {
                let Some(&command) = Command::ALL.get(usize::from(n).wrapping_sub(1)) else {
                    return;
                };
                let outcome = self.rte.invoke(command);
                self.report(outcome);
            }
            (KeyCode::Up, m) => self.move_vertically(false, m.contains(KeyModifiers::SHIFT)),
            (KeyCode::Down, m) => self.move_vertically(true, m.contains(KeyModifiers::SHIFT)),
            _ => {
                host::dispatch_key(&mut self.rte, &key);
            }
        }
    }

    fn move_vertically(&mut self, down: bool, extend: bool) {
        let target = self.last_render.as_ref().and_then(|render| {
            let cursor = render.cursor?;
            render.vertical_target(cursor, down)
        });
        let Some(point) = target else {
            return;
        };
        self.place_caret(point, extend);
    }

    fn place_caret(&mut self, point: BoundaryPoint, extend: bool) {
        let doc = self.rte.document_mut();
        if extend && doc.selection().focus().is_some() {
            doc.extend(point);
        } else {
            doc.collapse(point);
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_top = self.scroll_top.saturating_sub(MOUSE_SCROLL_LINES);
            }
            MouseEventKind::ScrollDown => {
                let max_scroll = self.last_render.as_ref().map_or(0, |render| {
                    render
                        .total_lines
                        .saturating_sub(self.text_area.height as usize)
                });
                self.scroll_top = (self.scroll_top + MOUSE_SCROLL_LINES).min(max_scroll);
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_mouse_down(event),
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag_anchor.is_some()
                    && let Some(point) = self.point_from_mouse(event.column, event.row)
                {
                    self.place_caret(point, true);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_anchor = None,
            _ => {}
        }
    }

    fn handle_mouse_down(&mut self, event: MouseEvent) {
        let position = Position::new(event.column, event.row);
        if self.toolbar_area.contains(position) {
            let button = self.toolbar.as_ref().and_then(|toolbar| {
                toolbar.button_at(event.column - self.toolbar_area.x)
            });
            if let Some(button) = button
                && let Some(outcome) = self.rte.click(button)
            {
                self.report(outcome);
            }
            return;
        }

        let Some(point) = self.point_from_mouse(event.column, event.row) else {
            self.drag_anchor = None;
            return;
        };
        let extend = event.modifiers.contains(KeyModifiers::SHIFT);
        self.place_caret(point, extend);
        self.drag_anchor = Some(point);
        debug!(?point, "caret placed by mouse");
    }

    fn point_from_mouse(&self, column: u16, row: u16) -> Option<BoundaryPoint> {
        if !self.text_area.contains(Position::new(column, row)) {
            return None;
        }
        let render = self.last_render.as_ref()?;
        let line = (row - self.text_area.y) as usize + self.scroll_top;
        let point = render.point_at(line, column - self.text_area.x);
        if point.is_none() {
            debug!(line, column, "no caret stop under the mouse");
        }
        point
    }
}
