use ratatui::style::{Color, Modifier, Style};

/// Colors used when drawing the widget
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the page around the frame
    pub background: Color,

    /// Color of the frame border
    pub frame_color: Color,

    /// Foreground color for the toolbar row
    pub toolbar_fg: Color,

    /// Background color for the toolbar row
    pub toolbar_bg: Color,

    /// Foreground color for toolbar buttons
    pub button_fg: Color,

    /// Background color for toolbar buttons
    pub button_bg: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the file name in the status bar
    pub filename_color: Color,

    /// Foreground color for alert messages
    pub alert_fg: Color,

    /// Background color for alert messages
    pub alert_bg: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Foreground color for `<mark>` text
    pub highlight_fg: Color,

    /// Background color for `<mark>` text
    pub highlight_bg: Color,

    /// Color for links
    pub link_color: Color,

    /// Color for horizontal rules
    pub rule_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            frame_color: Color::Gray,
            toolbar_fg: Color::White,
            toolbar_bg: Color::Reset,
            button_fg: Color::Black,
            button_bg: Color::Gray,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            alert_fg: Color::Black,
            alert_bg: Color::LightYellow,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
            link_color: Color::Blue,
            rule_color: Color::DarkGray,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_style(&self) -> Style {
        Style::default().fg(self.frame_color).bg(self.background)
    }

    pub fn toolbar_style(&self) -> Style {
        Style::default().fg(self.toolbar_fg).bg(self.toolbar_bg)
    }

    pub fn button_style(&self) -> Style {
        Style::default().fg(self.button_fg).bg(self.button_bg)
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    pub fn alert_style(&self) -> Style {
        Style::default()
            .fg(self.alert_fg)
            .bg(self.alert_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn rule_style(&self) -> Style {
        Style::default().fg(self.rule_color)
    }
}
