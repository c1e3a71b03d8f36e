//! Runtime bridge - connects the synchronous caller with the async Tokio runtime
//!
//! Commands go down a channel to a worker thread that owns the runtime; events
//! come back up and are drained without blocking.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::Context;
use tokio::runtime::Runtime;
use tracing::error;

use crate::domain::models::{HolderSummary, OwnedToken, TokenItem, TokenOwner, WalletOwner};
use crate::infrastructure::runtime::worker::{run_async_worker, Worker};

/// Screen a command or event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Collection,
    Leaderboard,
    Owners,
    Wallet,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Collection => "collection",
            Screen::Leaderboard => "leaderboard",
            Screen::Owners => "owners",
            Screen::Wallet => "wallet",
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    FetchCollection { generation: u64 },
    FetchLeaderboard { generation: u64 },
    FetchOwners { generation: u64, token_id: String },
    SearchWallet { generation: u64, input: String },
    Shutdown,
}

impl RuntimeCommand {
    pub fn screen(&self) -> Option<Screen> {
        match self {
            RuntimeCommand::FetchCollection { .. } => Some(Screen::Collection),
            RuntimeCommand::FetchLeaderboard { .. } => Some(Screen::Leaderboard),
            RuntimeCommand::FetchOwners { .. } => Some(Screen::Owners),
            RuntimeCommand::SearchWallet { .. } => Some(Screen::Wallet),
            RuntimeCommand::Shutdown => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Progress {
        screen: Screen,
        generation: u64,
        loaded: usize,
        total: usize,
    },
    CollectionReady {
        generation: u64,
        items: Vec<TokenItem>,
    },
    LeaderboardReady {
        generation: u64,
        holders: Vec<HolderSummary>,
    },
    OwnersReady {
        generation: u64,
        token_id: String,
        owners: Vec<TokenOwner>,
    },
    WalletReady {
        generation: u64,
        owner: WalletOwner,
        tokens: Vec<OwnedToken>,
    },
    /// Partial name fill: one settled batch
    NamesResolved {
        screen: Screen,
        generation: u64,
        names: Vec<(Address, Option<String>)>,
    },
    NamesComplete {
        screen: Screen,
        generation: u64,
    },
    Failed {
        screen: Screen,
        generation: u64,
        message: String,
    },
    /// The worker itself stopped
    Error { message: String },
}

impl RuntimeEvent {
    /// Screen and generation the event answers, `None` for worker errors
    pub fn origin(&self) -> Option<(Screen, u64)> {
        match self {
            RuntimeEvent::Progress { screen, generation, .. }
            | RuntimeEvent::NamesResolved { screen, generation, .. }
            | RuntimeEvent::NamesComplete { screen, generation }
            | RuntimeEvent::Failed { screen, generation, .. } => Some((*screen, *generation)),
            RuntimeEvent::CollectionReady { generation, .. } => Some((Screen::Collection, *generation)),
            RuntimeEvent::LeaderboardReady { generation, .. } => {
                Some((Screen::Leaderboard, *generation))
            }
            RuntimeEvent::OwnersReady { generation, .. } => Some((Screen::Owners, *generation)),
            RuntimeEvent::WalletReady { generation, .. } => Some((Screen::Wallet, *generation)),
            RuntimeEvent::Error { .. } => None,
        }
    }
}

pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(worker: Worker) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Runtime::new().context("create Tokio runtime")?;

        // The worker thread owns the runtime and drives the command loop
        thread::Builder::new()
            .name("mintscope-worker".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(worker, cmd_rx, evt_tx.clone()).await {
                        error!(error = %format!("{err:#}"), "worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })
            .context("spawn worker thread")?;

        Ok(Self { cmd_tx, evt_rx })
    }

    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block for at most `timeout` waiting for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        self.evt_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
