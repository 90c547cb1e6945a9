use std::sync::Arc;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::components::compose::{Compose, ComposeAction};
use crate::components::connect::{ConnectAction, ConnectPrompt};
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::portal::PortalView;
use crate::components::status_bar::StatusBar;
use crate::components::Component;
use crate::data::gateway::PortalGateway;
use crate::data::PortalService;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;
use crate::wallet::Wallet;

/// The controller. Owns all UI state and mediates between the wallet, the
/// portal service, and the render surface. All chain results arrive as
/// `AppEvent`s, so state mutation happens in exactly one place.
pub struct App<G: PortalGateway> {
    // Components
    header: Header,
    portal: PortalView,
    compose: Compose,
    connect: ConnectPrompt,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Collaborators
    service: Arc<PortalService<G>>,
    wallet: Wallet,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    account: Option<Address>,
    should_quit: bool,
    tick_rate: Duration,
}

impl<G: PortalGateway> App<G> {
    pub fn new(
        service: Arc<PortalService<G>>,
        wallet: Wallet,
        contract: Address,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate_ms: u64,
    ) -> Self {
        Self {
            header: Header::new(contract),
            portal: PortalView::new(),
            compose: Compose::new(),
            connect: ConnectPrompt::new(),
            status_bar: StatusBar::new(),
            help: HelpOverlay::new(),
            service,
            wallet,
            event_rx,
            account: None,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        // Session binder: adopt an already-authorized account without
        // prompting. Anything else waits for the explicit connect action.
        if let Some(signer) = self.wallet.authorized_signer() {
            self.service.bind_account(EthereumWallet::from(signer));
        } else if !self.wallet.is_available() {
            self.status_bar.notice =
                Some("No wallet configured (set --keystore or PRIVATE_KEY); waving disabled".to_string());
        }

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        // Explicit teardown so no subscription outlives the controller
        self.service.unbind();

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | portal (fill) | compose (3) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);
        self.portal.render(frame, chunks[1]);
        self.compose.render(frame, chunks[2]);
        self.status_bar.render(frame, chunks[3]);

        // Overlays (rendered on top)
        self.connect.render(frame, area);
        self.help.render(frame, area);
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }

            // Help overlay consumes all keys when visible
            if self.help.handle_key(key) {
                return;
            }

            // Connect prompt consumes keys when active
            if self.connect.active {
                match self.connect.handle_key(key) {
                    Some(ConnectAction::Unlock(password)) => self.try_unlock(&password),
                    Some(ConnectAction::Dismiss) => {
                        // Declined authorization is a no-op, not an error
                        self.connect.deactivate();
                    }
                    None => {}
                }
                return;
            }

            // Compose consumes keys while focused
            if self.compose.focused {
                if let Some(ComposeAction::Submit(message)) = self.compose.handle_key(key) {
                    self.submit_wave(message);
                }
                return;
            }

            // Global keys
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                }
                KeyCode::Char('m') => {
                    self.compose.focus();
                }
                KeyCode::Char('w') => {
                    let message = self.compose.input.clone();
                    self.submit_wave(message);
                }
                KeyCode::Char('c') => {
                    self.connect_wallet();
                }
                KeyCode::Char('r') => {
                    if self.account.is_some() {
                        self.service.fetch_total_waves();
                        self.service.fetch_wave_history();
                    } else {
                        self.status_bar.notice = Some("Connect a wallet first (c)".to_string());
                    }
                }
                _ => {
                    if let Some(event) = self.portal.handle_key(key) {
                        self.handle_app_event(event);
                    }
                }
            }
        }
    }

    /// Explicit connect action. With no wallet configured this is a notice,
    /// never an error.
    fn connect_wallet(&mut self) {
        if self.account.is_some() {
            self.status_bar.notice = Some("Wallet already connected".to_string());
            return;
        }
        if !self.wallet.is_available() {
            self.status_bar.notice =
                Some("No wallet configured (set --keystore or PRIVATE_KEY)".to_string());
            return;
        }
        if let Some(signer) = self.wallet.authorized_signer() {
            // Key material needs no passphrase; bind straight away
            self.service.bind_account(EthereumWallet::from(signer));
            return;
        }
        self.connect.activate();
    }

    fn try_unlock(&mut self, password: &str) {
        match self.wallet.unlock(password) {
            Ok(signer) => {
                self.connect.deactivate();
                self.status_bar.notice = Some("Unlocking wallet...".to_string());
                self.service.bind_account(EthereumWallet::from(signer));
            }
            Err(e) => {
                self.connect.error = Some(e.to_string());
            }
        }
    }

    /// Submit the draft as a wave. Busy covers the whole round-trip; nothing
    /// prevents overlapping submissions, each clears busy independently.
    fn submit_wave(&mut self, message: String) {
        if self.account.is_none() {
            self.status_bar.notice = Some("Connect a wallet first (c)".to_string());
            return;
        }
        self.status_bar.busy = true;
        self.status_bar.error_message = None;
        self.service.submit_wave(message);
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected(chain_id) => {
                self.header.chain_id = chain_id;
                self.header.connected = true;
                self.status_bar.connected = true;
            }
            AppEvent::AccountBound(account) => {
                self.account = Some(account);
                self.header.account = Some(account);
                self.status_bar.notice =
                    Some(format!("Connected as {}", utils::truncate_address(&account)));
            }
            AppEvent::TotalWaves(total) => {
                self.portal.total_waves = Some(total);
            }
            AppEvent::WaveHistory(waves) => {
                self.portal.set_waves(waves);
            }
            AppEvent::NewWave(record) => {
                // Bulk fetch and live feed can overlap; duplicates neither
                // append nor bump the counter.
                if self.portal.append_wave(record) {
                    self.portal.total_waves = Some(self.portal.total_waves.unwrap_or(0) + 1);
                }
            }
            AppEvent::WaveAccepted(hash) => {
                self.status_bar.notice =
                    Some(format!("Mining wave {}", utils::truncate_hash(&hash)));
            }
            AppEvent::WaveConfirmed(hash) => {
                self.status_bar.busy = false;
                self.status_bar.notice =
                    Some(format!("Wave {} confirmed", utils::truncate_hash(&hash)));
                self.compose.clear();
                self.service.fetch_total_waves();
            }
            AppEvent::WaveFailed(msg) => {
                // Draft stays intact for a retry; no automatic resubmission
                self.status_bar.busy = false;
                self.status_bar.error_message = Some(msg);
            }
            AppEvent::FeedConnected => {
                self.status_bar.live_feed = true;
            }
            AppEvent::FeedDisconnected => {
                self.status_bar.live_feed = false;
            }
            AppEvent::Error(msg) => {
                self.status_bar.error_message = Some(msg);
            }
        }
    }
}
