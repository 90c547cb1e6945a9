use alloy::primitives::Address;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub chain_id: u64,
    pub contract: Address,
    pub account: Option<Address>,
    pub connected: bool,
}

impl Header {
    pub fn new(contract: Address) -> Self {
        Self {
            chain_id: 0,
            contract,
            account: None,
            connected: false,
        }
    }

    fn display_chain_name(&self) -> &str {
        if !self.connected {
            return "Connecting";
        }
        match self.chain_id {
            1 => "Mainnet",
            11155111 => "Sepolia",
            17000 => "Holesky",
            31337 => "Anvil",
            _ => "Unknown",
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Left (title), center (contract), right (chain + account)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(16),
                Constraint::Min(0),
                Constraint::Length(36),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " waveportal",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let contract_line = Line::from(vec![
            Span::styled("portal ", THEME.muted_style()),
            Span::styled(utils::truncate_address(&self.contract), THEME.address_style()),
        ]);
        let contract_paragraph = Paragraph::new(contract_line)
            .alignment(Alignment::Center)
            .style(THEME.header_style());
        frame.render_widget(contract_paragraph, chunks[1]);

        let account_span = match self.account {
            Some(account) => {
                Span::styled(utils::truncate_address(&account), THEME.address_style())
            }
            None => Span::styled("no account", THEME.muted_style()),
        };
        let network_info = Line::from(vec![
            Span::styled(self.display_chain_name(), Style::default().fg(THEME.text)),
            Span::styled(" | ", THEME.muted_style()),
            account_span,
            Span::raw(" "),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}
