use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// What the compose panel asked the app to do with a key press.
pub enum ComposeAction {
    /// User pressed Enter: submit a wave carrying the current draft
    Submit(String),
}

/// Draft message input. The buffer survives failed submissions so the user
/// can retry; only a confirmed wave clears it.
pub struct Compose {
    pub focused: bool,
    pub input: String,
    cursor_position: usize,
}

impl Compose {
    pub fn new() -> Self {
        Self {
            focused: false,
            input: String::new(),
            cursor_position: 0,
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Returns Some(action) when the app should act on the key.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ComposeAction> {
        if !self.focused {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                self.focused = false;
                Some(ComposeAction::Submit(self.input.clone()))
            }
            KeyCode::Esc => {
                self.focused = false;
                None
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    self.input.remove(self.cursor_position);
                }
                None
            }
            KeyCode::Delete => {
                if self.cursor_position < self.input.len() {
                    self.input.remove(self.cursor_position);
                }
                None
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.cursor_position < self.input.len() {
                    self.cursor_position += 1;
                }
                None
            }
            KeyCode::Home => {
                self.cursor_position = 0;
                None
            }
            KeyCode::End => {
                self.cursor_position = self.input.len();
                None
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                    self.clear();
                } else {
                    self.input.insert(self.cursor_position, c);
                    self.cursor_position += 1;
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };

        let title = if self.focused {
            " Message (Enter to wave, Esc to leave) "
        } else {
            " Message (m to edit, w to wave) "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let display_text = if self.input.is_empty() && !self.focused {
            Span::styled("say something nice...", THEME.muted_style())
        } else {
            Span::styled(&self.input, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(display_text), inner);

        if self.focused {
            let cursor_x = inner.x + self.cursor_position as u16;
            if cursor_x < inner.right() {
                frame.set_cursor_position((cursor_x, inner.y));
            }
        }
    }
}
