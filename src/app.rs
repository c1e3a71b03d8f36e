//! Explorer state: one result set per screen plus its fetch status
//!
//! The state is synchronous and only changes through `begin_*` (a new fetch
//! was sent) and `apply_event` (the worker answered).

use tracing::{debug, warn};

use crate::domain::aggregate::{sort_holders, splice_names, SortDirection};
use crate::domain::models::{HolderSummary, OwnedToken, TokenItem, TokenOwner, WalletOwner};
use crate::domain::search::{PageView, Query};
use crate::infrastructure::runtime::{RuntimeEvent, Screen};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub loaded: usize,
    pub total: usize,
}

/// Fetch bookkeeping shared by every screen
#[derive(Debug, Clone)]
pub struct ScreenMeta {
    pub status: FetchStatus,
    pub query: Query,
    pub progress: Option<Progress>,
    pub names_complete: bool,
    generation: u64,
}

impl ScreenMeta {
    fn new(page_size: usize) -> Self {
        Self {
            status: FetchStatus::Idle,
            query: Query::new(page_size),
            progress: None,
            names_complete: false,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Still loading, or loaded with names still arriving
    pub fn is_busy(&self) -> bool {
        match self.status {
            FetchStatus::Loading => true,
            FetchStatus::Ready => !self.names_complete,
            FetchStatus::Idle | FetchStatus::Failed(_) => false,
        }
    }

    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.progress = None;
        self.names_complete = false;
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct ScreenState<T> {
    pub meta: ScreenMeta,
    pub items: Vec<T>,
}

impl<T> ScreenState<T> {
    fn new(page_size: usize) -> Self {
        Self {
            meta: ScreenMeta::new(page_size),
            items: Vec::new(),
        }
    }

    fn finish(&mut self, items: Vec<T>) {
        self.items = items;
        self.meta.status = FetchStatus::Ready;
        self.meta.progress = None;
    }
}

impl<T: crate::domain::search::Searchable> ScreenState<T> {
    /// Current page of the filtered rows
    pub fn view(&self) -> PageView<'_, T> {
        self.meta.query.view(&self.items)
    }
}

pub struct App {
    pub collection: ScreenState<TokenItem>,
    pub leaderboard: ScreenState<HolderSummary>,
    pub owners: ScreenState<TokenOwner>,
    pub wallet: ScreenState<OwnedToken>,
    sort: SortDirection,
    owners_token: Option<String>,
    wallet_owner: Option<WalletOwner>,
}

impl App {
    /// `grid_page_size` applies to token cards, `table_page_size` to holder tables
    pub fn new(grid_page_size: usize, table_page_size: usize) -> Self {
        Self {
            collection: ScreenState::new(grid_page_size),
            leaderboard: ScreenState::new(table_page_size),
            owners: ScreenState::new(table_page_size),
            wallet: ScreenState::new(grid_page_size),
            sort: SortDirection::default(),
            owners_token: None,
            wallet_owner: None,
        }
    }

    pub fn meta(&self, screen: Screen) -> &ScreenMeta {
        match screen {
            Screen::Collection => &self.collection.meta,
            Screen::Leaderboard => &self.leaderboard.meta,
            Screen::Owners => &self.owners.meta,
            Screen::Wallet => &self.wallet.meta,
        }
    }

    fn meta_mut(&mut self, screen: Screen) -> &mut ScreenMeta {
        match screen {
            Screen::Collection => &mut self.collection.meta,
            Screen::Leaderboard => &mut self.leaderboard.meta,
            Screen::Owners => &mut self.owners.meta,
            Screen::Wallet => &mut self.wallet.meta,
        }
    }

    pub fn status(&self, screen: Screen) -> &FetchStatus {
        &self.meta(screen).status
    }

    pub fn sort(&self) -> SortDirection {
        self.sort
    }

    pub fn owners_token(&self) -> Option<&str> {
        self.owners_token.as_deref()
    }

    pub fn wallet_owner(&self) -> Option<&WalletOwner> {
        self.wallet_owner.as_ref()
    }

    /// Mark `screen` as loading; returns the generation for the new fetch.
    ///
    /// Anything still in flight for that screen becomes stale.
    pub fn begin(&mut self, screen: Screen) -> u64 {
        let generation = self.meta_mut(screen).begin();
        debug!(screen = screen.label(), generation, "fetch started");
        generation
    }

    /// Switch the owners screen to `token_id`; rows of the previous token are dropped
    pub fn begin_owners(&mut self, token_id: &str) -> u64 {
        if self.owners_token.as_deref() != Some(token_id) {
            self.owners.items.clear();
            self.owners.meta.query.set_page(1);
        }
        self.owners_token = Some(token_id.to_string());
        self.begin(Screen::Owners)
    }

    pub fn begin_wallet(&mut self) -> u64 {
        self.begin(Screen::Wallet)
    }

    pub fn set_query(&mut self, screen: Screen, text: &str) {
        self.meta_mut(screen).query.set_text(text);
    }

    pub fn set_page(&mut self, screen: Screen, page: usize) {
        self.meta_mut(screen).query.set_page(page);
    }

    pub fn set_page_size(&mut self, screen: Screen, page_size: usize) {
        self.meta_mut(screen).query.set_page_size(page_size);
    }

    /// Flip the leaderboard between biggest-first and smallest-first
    pub fn toggle_sort(&mut self) -> SortDirection {
        self.set_sort(self.sort.toggle());
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortDirection) {
        self.sort = sort;
        sort_holders(&mut self.leaderboard.items, sort);
    }

    /// True while any screen is loading or waiting for names
    pub fn is_busy(&self) -> bool {
        [Screen::Collection, Screen::Leaderboard, Screen::Owners, Screen::Wallet]
            .into_iter()
            .any(|screen| self.meta(screen).is_busy())
    }

    /// Apply one worker event. Returns false when the event was stale and dropped.
    pub fn apply_event(&mut self, event: RuntimeEvent) -> bool {
        let Some((screen, generation)) = event.origin() else {
            if let RuntimeEvent::Error { message } = event {
                self.apply_worker_error(message);
            }
            return true;
        };

        let current = self.meta(screen).generation;
        if generation != current {
            warn!(screen = screen.label(), generation, current, "dropping stale event");
            return false;
        }

        match event {
            RuntimeEvent::Progress { loaded, total, .. } => {
                self.meta_mut(screen).progress = Some(Progress { loaded, total });
            }
            RuntimeEvent::CollectionReady { items, .. } => {
                self.collection.finish(items);
                self.collection.meta.names_complete = true;
            }
            RuntimeEvent::LeaderboardReady { mut holders, .. } => {
                sort_holders(&mut holders, self.sort);
                self.leaderboard.finish(holders);
            }
            RuntimeEvent::OwnersReady { token_id, owners, .. } => {
                if self.owners_token.as_deref() != Some(token_id.as_str()) {
                    warn!(token_id = %token_id, "dropping owners of another token");
                    return false;
                }
                self.owners.finish(owners);
            }
            RuntimeEvent::WalletReady { owner, tokens, .. } => {
                self.wallet_owner = Some(owner);
                self.wallet.finish(tokens);
                self.wallet.meta.names_complete = true;
            }
            RuntimeEvent::NamesResolved { names, .. } => {
                let updated = match screen {
                    Screen::Leaderboard => splice_names(&mut self.leaderboard.items, &names),
                    Screen::Owners => splice_names(&mut self.owners.items, &names),
                    Screen::Collection | Screen::Wallet => 0,
                };
                debug!(screen = screen.label(), updated, "names spliced");
            }
            RuntimeEvent::NamesComplete { .. } => {
                self.meta_mut(screen).names_complete = true;
            }
            RuntimeEvent::Failed { message, .. } => {
                self.meta_mut(screen).status = FetchStatus::Failed(message);
            }
            RuntimeEvent::Error { .. } => {}
        }
        true
    }

    fn apply_worker_error(&mut self, message: String) {
        for screen in [Screen::Collection, Screen::Leaderboard, Screen::Owners, Screen::Wallet] {
            let meta = self.meta_mut(screen);
            if meta.is_loading() {
                meta.status = FetchStatus::Failed(message.clone());
            }
            meta.names_complete = true;
        }
    }
}
