//! Explorer for a single ERC-1155 collection: token catalogue, holder
//! leaderboard, per-token owners and wallet lookup, with ENS names filled in
//! as they resolve.

pub mod app;
pub mod config;
pub mod domain;
pub mod explorer;
pub mod export;
pub mod infrastructure;
pub mod store;

pub use app::{App, FetchStatus, Progress, ScreenMeta, ScreenState};
pub use explorer::Explorer;
pub use infrastructure::runtime::Screen;
