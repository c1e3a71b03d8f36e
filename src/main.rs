use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mintscope::app::{FetchStatus, ScreenState};
use mintscope::config::{self, Config, Settings};
use mintscope::domain::address::{format_address, short_addr};
use mintscope::domain::search::{filter, PageView, PAGE_SIZE_OPTIONS};
use mintscope::domain::{HolderSummary, OwnedToken, SortDirection, TokenItem, TokenOwner};
use mintscope::export::{self, ExportFormat};
use mintscope::infrastructure::runtime::{Screen, Worker};
use mintscope::infrastructure::{AlchemyClient, EnsResolver};
use mintscope::store::{NameCache, SessionStore};
use mintscope::{App, Explorer};

#[derive(Debug, Parser)]
#[command(
    name = "mintscope",
    version,
    about = "Explore an ERC-1155 collection: tokens, holders and wallets"
)]
struct Args {
    /// Collection contract address
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Alchemy API key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Alchemy network (e.g. polygon-mainnet)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Alchemy base URL, overrides --network
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Ethereum mainnet JSON-RPC endpoint for ENS lookups
    #[arg(long, global = true)]
    ens_rpc: Option<String>,

    /// Seconds to wait for data and names before printing what arrived
    #[arg(long, global = true, default_value_t = 120)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
struct ListArgs {
    /// Free-text filter
    #[arg(long, short)]
    query: Option<String>,

    /// 1-based page to show
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page: 10, 20, 50 or 100
    #[arg(long, value_parser = parse_page_size)]
    page_size: Option<usize>,

    /// Export every matching row
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// Export file path, defaults to the data directory
    #[arg(long, requires = "export")]
    out: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Token catalogue with holder counts
    Collection(ListArgs),
    /// Holders ranked by total balance
    Leaderboard {
        /// Smallest holders first
        #[arg(long)]
        ascending: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Holders of one token
    Owners {
        token_id: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Tokens held by a wallet address or ENS name
    Wallet {
        /// Address or name; defaults to the previous search
        input: Option<String>,
        #[command(flatten)]
        list: ListArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mintscope=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = settings_from_args(&args)?;
    let mut explorer = build_explorer(&settings)?;
    let timeout = Duration::from_secs(args.timeout);

    match &args.command {
        Command::Collection(list) => {
            explorer.fetch_collection()?;
            apply_list_args(&mut explorer, Screen::Collection, list);
            wait(&mut explorer, timeout, Screen::Collection)?;

            let state = &explorer.app().collection;
            print_collection(&state.view(), state);
            if let Some(format) = list.export {
                let rows = filter(&state.items, state.meta.query.text());
                let path = export::resolve_path(list.out.as_deref(), "collection", format)?;
                let count = export::write_tokens(&path, format, &explorer.contract(), &rows)?;
                info!(count, path = %path.display(), "exported collection");
            }
        }

        Command::Leaderboard { ascending, list } => {
            if *ascending {
                explorer.set_sort(SortDirection::Ascending);
            }
            explorer.fetch_leaderboard()?;
            apply_list_args(&mut explorer, Screen::Leaderboard, list);
            wait(&mut explorer, timeout, Screen::Leaderboard)?;

            let app = explorer.app();
            print_holders(&app.leaderboard.view(), app.sort());
            if let Some(format) = list.export {
                let state = &app.leaderboard;
                let rows = filter(&state.items, state.meta.query.text());
                let path = export::resolve_path(list.out.as_deref(), "holders", format)?;
                let count = export::write_holders(&path, format, &rows)?;
                info!(count, path = %path.display(), "exported holders");
            }
        }

        Command::Owners { token_id, list } => {
            explorer.fetch_owners_of(token_id)?;
            apply_list_args(&mut explorer, Screen::Owners, list);
            wait(&mut explorer, timeout, Screen::Owners)?;

            let state = &explorer.app().owners;
            print_owners(token_id, &state.view());
            if let Some(format) = list.export {
                let rows = filter(&state.items, state.meta.query.text());
                let prefix = format!("owners-{token_id}");
                let path = export::resolve_path(list.out.as_deref(), &prefix, format)?;
                let count = export::write_owners(&path, format, &rows)?;
                info!(count, path = %path.display(), "exported owners");
            }
        }

        Command::Wallet { input, list } => {
            let input = match input {
                Some(input) => input.clone(),
                None => explorer
                    .last_search()
                    .context("no wallet given and no previous search")?,
            };
            if !explorer.search_wallet(&input)? {
                bail!("wallet input is blank");
            }
            apply_list_args(&mut explorer, Screen::Wallet, list);
            wait(&mut explorer, timeout, Screen::Wallet)?;

            print_wallet(explorer.app());
            if list.export.is_some() {
                warn!("wallet view has no export; ignoring --export");
            }
        }
    }

    Ok(())
}

fn settings_from_args(args: &Args) -> Result<Settings> {
    let mut config: Config = config::load();
    config.apply_env();

    let overrides = [
        (&args.api_key, &mut config.api_key),
        (&args.network, &mut config.network),
        (&args.contract, &mut config.contract),
        (&args.base_url, &mut config.base_url),
        (&args.ens_rpc, &mut config.ens_rpc),
    ];
    for (flag, slot) in overrides {
        if flag.is_some() {
            *slot = flag.clone();
        }
    }

    Ok(config.validate()?)
}

fn build_explorer(settings: &Settings) -> Result<Explorer> {
    let alchemy = match &settings.base_url {
        Some(base_url) => AlchemyClient::with_base_url(base_url.clone(), settings.api_key.clone()),
        None => AlchemyClient::new(&settings.network, settings.api_key.clone()),
    }
    .context("create Alchemy client")?;
    let alchemy = Arc::new(alchemy);

    let resolver = Arc::new(EnsResolver::connect(&settings.ens_rpc).context("connect ENS resolver")?);
    let names = Arc::new(NameCache::new(resolver.clone()));
    info!(alchemy = alchemy.base_url(), ens = resolver.endpoint(), "providers configured");

    let worker = Worker::new(
        alchemy.clone(),
        alchemy,
        resolver,
        names,
        settings.contract,
        settings.batch,
    );

    let session = config::session_db_path().and_then(|path| match SessionStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "session store disabled");
            None
        }
    });

    let app = App::new(settings.collection_page_size, settings.leaderboard_page_size);
    Explorer::new(worker, app, session)
}

fn parse_page_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|e| format!("{e}"))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

fn apply_list_args(explorer: &mut Explorer, screen: Screen, list: &ListArgs) {
    if let Some(query) = &list.query {
        explorer.set_query(screen, query);
    }
    if let Some(page_size) = list.page_size {
        explorer.set_page_size(screen, page_size);
    }
    explorer.set_page(screen, list.page);
}

/// Wait for `screen` to settle; a failed fetch becomes the process error
fn wait(explorer: &mut Explorer, timeout: Duration, screen: Screen) -> Result<()> {
    if !explorer.wait_idle(timeout) {
        warn!(screen = screen.label(), "timed out; showing partial results");
    }
    match explorer.app().status(screen) {
        FetchStatus::Failed(message) => bail!("{message}"),
        FetchStatus::Loading => bail!("{} did not load within {:?}", screen.label(), timeout),
        FetchStatus::Idle | FetchStatus::Ready => Ok(()),
    }
}

fn print_caption<T>(view: &PageView<'_, T>) {
    println!(
        "Showing {} - {} of {} (page {}/{})",
        view.first_row, view.last_row, view.total_items, view.page, view.total_pages
    );
}

fn print_collection(view: &PageView<'_, TokenItem>, state: &ScreenState<TokenItem>) {
    if state.items.is_empty() {
        println!("No tokens found.");
        return;
    }
    println!("{:>8}  {:<40}  {:<12}  {:<20}  {:>7}", "TOKEN", "TITLE", "DATE", "TOPIC", "HOLDERS");
    for token in &view.rows {
        println!(
            "{:>8}  {:<40}  {:<12}  {:<20}  {:>7}",
            token.token_id,
            truncate(&token.title, 40),
            truncate(&token.date, 12),
            truncate(&token.topic, 20),
            token.holder_count
        );
    }
    print_caption(view);
}

fn print_holders(view: &PageView<'_, HolderSummary>, sort: SortDirection) {
    if view.total_items == 0 {
        println!("No holders found.");
        return;
    }
    println!("{:>5}  {:<42}  {:<28}  {:>8} {}", "RANK", "ADDRESS", "NAME", "TOTAL", sort.arrow());
    for (index, holder) in view.rows.iter().enumerate() {
        println!(
            "{:>5}  {:<42}  {:<28}  {:>8}",
            view.first_row + index,
            format_address(&holder.holder),
            truncate(holder.name.as_deref().unwrap_or("-"), 28),
            holder.total_count
        );
    }
    print_caption(view);
}

fn print_owners(token_id: &str, view: &PageView<'_, TokenOwner>) {
    if view.total_items == 0 {
        println!("Token {token_id} has no holders.");
        return;
    }
    println!("Holders of token {token_id}");
    println!("{:<42}  {:<28}  {:>8}", "ADDRESS", "NAME", "BALANCE");
    for owner in &view.rows {
        println!(
            "{:<42}  {:<28}  {:>8}",
            format_address(&owner.holder),
            truncate(owner.name.as_deref().unwrap_or("-"), 28),
            owner.balance
        );
    }
    print_caption(view);
}

fn print_wallet(app: &App) {
    let Some(owner) = app.wallet_owner() else {
        return;
    };
    let Some(address) = owner.address else {
        println!("No wallet found for {}.", owner.input);
        return;
    };
    let who = match &owner.name {
        Some(name) => format!("{name} ({})", short_addr(&address)),
        None => format_address(&address),
    };
    println!("{who}: {} tokens, total balance {}", app.wallet.items.len(), owner.total_balance);

    let view = app.wallet.view();
    if view.total_items == 0 {
        println!("This wallet holds no tokens of the collection.");
        return;
    }
    println!("{:>8}  {:<40}  {:<12}  {:<20}  {:>7}", "TOKEN", "TITLE", "DATE", "TOPIC", "BALANCE");
    for token in &view.rows {
        print_owned(token);
    }
    print_caption(&view);
}

fn print_owned(token: &OwnedToken) {
    println!(
        "{:>8}  {:<40}  {:<12}  {:<20}  {:>7}",
        token.token_id,
        truncate(&token.title, 40),
        truncate(&token.date, 12),
        truncate(&token.topic, 20),
        token.balance
    );
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
