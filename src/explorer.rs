//! Synchronous facade over the explorer state and the background worker

use std::time::{Duration, Instant};

use alloy_primitives::Address;
use anyhow::Result;
use tracing::warn;

use crate::app::App;
use crate::domain::aggregate::SortDirection;
use crate::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, Screen, Worker};
use crate::store::SessionStore;

// Upper bound on one blocking wait inside `wait_idle`
const IDLE_POLL: Duration = Duration::from_millis(50);

pub struct Explorer {
    app: App,
    bridge: RuntimeBridge,
    session: Option<SessionStore>,
    contract: Address,
}

impl Explorer {
    pub fn new(worker: Worker, app: App, session: Option<SessionStore>) -> Result<Self> {
        let contract = worker.contract();
        let bridge = RuntimeBridge::new(worker)?;
        Ok(Self {
            app,
            bridge,
            session,
            contract,
        })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn fetch_collection(&mut self) -> Result<()> {
        let generation = self.app.begin(Screen::Collection);
        self.bridge.send(RuntimeCommand::FetchCollection { generation })
    }

    pub fn fetch_leaderboard(&mut self) -> Result<()> {
        let generation = self.app.begin(Screen::Leaderboard);
        self.bridge.send(RuntimeCommand::FetchLeaderboard { generation })
    }

    pub fn fetch_owners_of(&mut self, token_id: &str) -> Result<()> {
        let token_id = token_id.trim();
        let generation = self.app.begin_owners(token_id);
        self.bridge.send(RuntimeCommand::FetchOwners {
            generation,
            token_id: token_id.to_string(),
        })
    }

    /// Look up a wallet by address or name. Blank input does nothing and returns false.
    pub fn search_wallet(&mut self, input: &str) -> Result<bool> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(false);
        }

        if let Some(session) = &self.session {
            if let Err(e) = session.set_last_search(input) {
                warn!(error = %format!("{e:#}"), "could not persist wallet search");
            }
        }

        let generation = self.app.begin_wallet();
        self.bridge.send(RuntimeCommand::SearchWallet {
            generation,
            input: input.to_string(),
        })?;
        Ok(true)
    }

    /// Wallet input of the previous session, if one was stored
    pub fn last_search(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        match session.last_search() {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "could not read last wallet search");
                None
            }
        }
    }

    pub fn set_query(&mut self, screen: Screen, text: &str) {
        self.app.set_query(screen, text);
    }

    pub fn set_page(&mut self, screen: Screen, page: usize) {
        self.app.set_page(screen, page);
    }

    pub fn set_page_size(&mut self, screen: Screen, page_size: usize) {
        self.app.set_page_size(screen, page_size);
    }

    pub fn toggle_sort(&mut self) -> SortDirection {
        self.app.toggle_sort()
    }

    pub fn set_sort(&mut self, sort: SortDirection) {
        self.app.set_sort(sort);
    }

    /// Apply every pending worker event; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        for event in self.bridge.poll_events() {
            if self.app.apply_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until no screen is loading or waiting for names.
    ///
    /// Returns false when `timeout` elapsed first.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if !self.app.is_busy() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Some(event) = self.bridge.recv_timeout((deadline - now).min(IDLE_POLL)) {
                self.app.apply_event(event);
            }
        }
    }
}
