use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// What the connect prompt asked the app to do.
pub enum ConnectAction {
    /// User submitted a passphrase
    Unlock(String),
    /// User dismissed the prompt; treated as a declined authorization
    Dismiss,
}

/// Passphrase prompt shown by the explicit connect action. Input is masked.
pub struct ConnectPrompt {
    pub active: bool,
    pub error: Option<String>,
    input: String,
}

impl ConnectPrompt {
    pub fn new() -> Self {
        Self {
            active: false,
            error: None,
            input: String::new(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.input.clear();
        self.error = None;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.input.clear();
        self.error = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ConnectAction> {
        if !self.active {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                let password = std::mem::take(&mut self.input);
                Some(ConnectAction::Unlock(password))
            }
            KeyCode::Esc => Some(ConnectAction::Dismiss),
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        let width = area.width.min(60);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let popup_area = Rect::new(x, area.y + 2, width, 3);

        frame.render_widget(Clear, popup_area);

        let border_style = if self.error.is_some() {
            Style::default().fg(THEME.error)
        } else {
            THEME.border_focused_style()
        };

        let title = if let Some(ref err) = self.error {
            format!(" Connect wallet - {err} ")
        } else {
            " Connect wallet (keystore passphrase) ".to_string()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .style(Style::default().bg(THEME.surface));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let masked = "*".repeat(self.input.len());
        let display_text = if masked.is_empty() {
            Span::styled("Enter passphrase, Esc to cancel", THEME.muted_style())
        } else {
            Span::styled(masked, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(display_text), inner);
    }
}
