use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::types::WaveRecord;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

/// The single main view: running tally plus the wave feed, newest first.
pub struct PortalView {
    pub total_waves: Option<u64>,
    pub waves: Vec<WaveRecord>,
    table_state: TableState,
}

impl PortalView {
    pub fn new() -> Self {
        Self {
            total_waves: None,
            waves: Vec::new(),
            table_state: TableState::default(),
        }
    }

    /// Replace the feed with a freshly fetched history.
    pub fn set_waves(&mut self, waves: Vec<WaveRecord>) {
        self.waves = waves;
        self.table_state.select(if self.waves.is_empty() { None } else { Some(0) });
    }

    /// Append one live wave unless an identical one is already present.
    /// Returns true if the record was appended.
    pub fn append_wave(&mut self, record: WaveRecord) -> bool {
        if self.waves.iter().any(|w| w.same_wave(&record)) {
            return false;
        }
        self.waves.push(record);
        true
    }

    fn select_next(&mut self) {
        if self.waves.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= self.waves.len() { current } else { current + 1 };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.waves.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(current.saturating_sub(1)));
    }
}

impl Component for PortalView {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') => {
                if !self.waves.is_empty() {
                    self.table_state.select(Some(0));
                }
                None
            }
            KeyCode::Char('G') => {
                if !self.waves.is_empty() {
                    self.table_state.select(Some(self.waves.len() - 1));
                }
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(area);

        // Greeting
        let greeting = Paragraph::new(Line::from(vec![
            Span::styled("Hey there! ", Style::default().fg(THEME.text)),
            Span::styled(
                "Connect a wallet and wave with a message.",
                THEME.muted_style(),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(THEME.border_style()),
        );
        frame.render_widget(greeting, chunks[0]);

        // Counter
        let count_span = match self.total_waves {
            Some(total) => Span::styled(utils::format_number(total), THEME.counter_style()),
            None => Span::styled("--", THEME.muted_style()),
        };
        let counter = Paragraph::new(Line::from(vec![
            Span::styled("Total waves: ", THEME.muted_style()),
            count_span,
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(THEME.border_style()),
        );
        frame.render_widget(counter, chunks[1]);

        // Feed, newest first
        let header = Row::new(vec![
            Cell::from("When"),
            Cell::from("Waver"),
            Cell::from("Message"),
        ])
        .style(THEME.table_header_style());

        let rows: Vec<Row> = self
            .waves
            .iter()
            .rev()
            .map(|w| {
                Row::new(vec![
                    Cell::from(utils::format_time_ago(w.timestamp)).style(THEME.muted_style()),
                    Cell::from(utils::truncate_address(&w.waver)).style(THEME.address_style()),
                    Cell::from(w.message.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Min(20),
        ];

        let feed_block = Block::default()
            .title(format!(" Waves ({}) ", self.waves.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        if self.waves.is_empty() {
            let inner = feed_block.inner(chunks[2]);
            frame.render_widget(feed_block, chunks[2]);
            let empty = Paragraph::new("No waves yet")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(feed_block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");

        frame.render_stateful_widget(table, chunks[2], &mut self.table_state);

        // Full detail for the selected wave (rows render newest first)
        let selected = self
            .table_state
            .selected()
            .filter(|i| *i < self.waves.len())
            .map(|i| &self.waves[self.waves.len() - 1 - i]);
        if let Some(wave) = selected {
            let detail = Line::from(vec![
                Span::styled(
                    format!(" {} ", utils::format_timestamp(wave.timestamp)),
                    THEME.hash_style(),
                ),
                Span::styled(format!("{} ", wave.waver), THEME.address_style()),
                Span::styled(wave.message.as_str(), Style::default().fg(THEME.text)),
            ]);
            frame.render_widget(Paragraph::new(detail), chunks[3]);
        }
    }
}
