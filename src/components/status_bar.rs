use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct StatusBar {
    pub connected: bool,
    pub live_feed: bool,
    /// True while a wave submission round-trip is outstanding
    pub busy: bool,
    pub error_message: Option<String>,
    pub notice: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            connected: false,
            live_feed: false,
            busy: false,
            error_message: None,
            notice: None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        // --- Left side ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if self.busy {
            Line::from(Span::styled(
                " Waving...",
                Style::default().fg(THEME.text_accent),
            ))
        } else if let Some(ref notice) = self.notice {
            Line::from(Span::styled(format!(" {notice}"), THEME.muted_style()))
        } else {
            Line::from(vec![
                Span::styled("m", Style::default().fg(THEME.text_accent)),
                Span::styled(":Message  ", Style::default().fg(THEME.text_muted)),
                Span::styled("w", Style::default().fg(THEME.text_accent)),
                Span::styled(":Wave  ", Style::default().fg(THEME.text_muted)),
                Span::styled("c", Style::default().fg(THEME.text_accent)),
                Span::styled(":Connect  ", Style::default().fg(THEME.text_muted)),
                Span::styled("r", Style::default().fg(THEME.text_accent)),
                Span::styled(":Refresh  ", Style::default().fg(THEME.text_muted)),
                Span::styled("?", Style::default().fg(THEME.text_accent)),
                Span::styled(":Help  ", Style::default().fg(THEME.text_muted)),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: live feed + connection status ---
        let (dot_color, status_text) = if self.connected {
            (THEME.success, "Connected")
        } else {
            (THEME.error, "Disconnected")
        };

        let (feed_color, feed_text) = if self.live_feed {
            (THEME.success, "Live")
        } else {
            (THEME.text_muted, "Live:--")
        };

        let right_content = Line::from(vec![
            Span::styled(feed_text, Style::default().fg(feed_color)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(status_text, Style::default().fg(dot_color)),
            Span::raw(" "),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
