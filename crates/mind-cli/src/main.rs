//! # mind
//!
//! Command-line front end: parses arguments, loads settings, opens the
//! store and prints what each command returns.

#![deny(unsafe_code)]

mod cli;
mod logging;
mod render;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use mind_settings::MindSettings;
use mind_store::{
    ConnectionConfig, ItemQuery, OpenOptions, Order, Outcome, Phase, StuffStore, Transition,
};
use tracing::debug;

use crate::cli::{Cli, Command, ListArgs, PageArgs, Positions};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_subscriber(logging::default_level(cli.verbose));

    let mut settings = mind_settings::load_settings().context("Failed to load settings")?;
    if let Some(db) = &cli.db {
        settings.db_path.clone_from(db);
    }
    if cli.no_strict {
        settings.strict = false;
    }
    debug!(?settings, "settings resolved");

    let path = settings.resolved_db_path();
    let location = path.to_string_lossy();
    if location != mind_store::store::IN_MEMORY {
        ensure_parent_dir(&path)?;
    }

    let store = StuffStore::open(&location, &open_options(&settings))
        .with_context(|| format!("Failed to open store: {location}"))?;
    let command = cli.command.unwrap_or(Command::List(ListArgs::default()));
    let output = run_and_close(store, command, &settings)?;

    for line in output {
        println!("{line}");
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Store options from settings.
fn open_options(settings: &MindSettings) -> OpenOptions {
    OpenOptions {
        strict: settings.strict,
        verify_depth: settings.verify_depth,
        connection: ConnectionConfig {
            pool_size: settings.connection.pool_size,
            busy_timeout_ms: settings.connection.busy_timeout_ms,
            cache_size_kib: settings.connection.cache_size_kib,
        },
    }
}

/// Run `command`, then close the store whether or not it succeeded.
///
/// The command's own error wins over a close-time verification failure.
fn run_and_close(store: StuffStore, command: Command, settings: &MindSettings) -> Result<Vec<String>> {
    let output = run(&store, command, settings);
    let closed = store.close().context("Store verification failed on close");
    let output = output?;
    closed?;
    Ok(output)
}

/// Execute one command and return the lines to print.
fn run(store: &StuffStore, command: Command, settings: &MindSettings) -> Result<Vec<String>> {
    debug!(?command, "running command");
    match command {
        Command::Add { text, file } => {
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    let _ = std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let (item, tags) = store.add(&content)?;
            Ok(vec![render::added(&item, &tags)])
        }
        Command::List(args) => list(store, &args, Order::Latest, settings),
        Command::Clean(args) => list(store, &args, Order::Oldest, settings),
        Command::Tick { items } => transition(store, &items, Transition::Tick),
        Command::Forget { items } => transition(store, &items, Transition::Forget),
        Command::Untick { items } => transition(store, &items, Transition::Untick),
        Command::Unforget { items } => transition(store, &items, Transition::Unforget),
        Command::Show { item } => Ok(match store.show(item)? {
            Some((item, tags)) => render::show(&item, &tags),
            None => vec![Outcome::NotFound(item).message()],
        }),
        Command::History(paging) => history(store, &paging, settings),
        Command::Tags { num } => {
            let labels = store.query_tags(None, num.unwrap_or(settings.tag_limit))?;
            Ok(vec![render::tags(&labels)])
        }
        Command::Verify { depth } => {
            let report = store.verify(depth)?;
            Ok(vec![render::verified(&report)])
        }
    }
}

fn list(
    store: &StuffStore,
    args: &ListArgs,
    order: Order,
    settings: &MindSettings,
) -> Result<Vec<String>> {
    let num = args.paging.num.unwrap_or(settings.page_size).max(1);
    let offset = args.paging.offset(num);
    let label = args.label();

    let mut query = ItemQuery::phase(Phase::Active)
        .order(order)
        .page(offset, num + 1);
    query.tag.clone_from(&label);
    let items = store.query_items(&query)?;
    let tags = store.query_tags(None, settings.tag_limit)?;

    let header = render::list_header(order, label.as_deref(), num);
    Ok(render::listing(header, &items, offset + 1, num, &tags))
}

fn transition(store: &StuffStore, items: &Positions, transition: Transition) -> Result<Vec<String>> {
    let outcomes = store.transition(&items.0, transition)?;
    Ok(outcomes.iter().map(Outcome::message).collect())
}

fn history(store: &StuffStore, paging: &PageArgs, settings: &MindSettings) -> Result<Vec<String>> {
    let num = paging.num.unwrap_or(settings.page_size).max(1);
    let records = store.history(paging.offset(num), num)?;
    Ok(render::history(&records))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
