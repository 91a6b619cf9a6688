//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mind_store::ItemRef;

/// Hello! I'm here to mind your stuff for you.
#[derive(Parser, Debug)]
#[command(name = "mind", version, about = "Hello! I'm here to mind your stuff for you.")]
pub struct Cli {
    /// Store file (overrides settings and `MIND_DB`).
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Tolerate schema drift and skip eager verification.
    #[arg(long, global = true)]
    pub no_strict: bool,

    /// What to do; lists the latest stuff when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add stuff to mind. Reads stdin when neither --text nor --file is given.
    Add {
        /// Add text from the command line.
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// Add stuff from a file.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List your latest stuff.
    List(ListArgs),
    /// List oldest stuff, so you can clean it up ;).
    Clean(ListArgs),
    /// Mark stuff as complete.
    Tick {
        /// Comma-separated positions, e.g. `1,3`.
        #[arg(value_parser = parse_positions)]
        items: Positions,
    },
    /// Forget stuff.
    Forget {
        /// Comma-separated positions.
        #[arg(value_parser = parse_positions)]
        items: Positions,
    },
    /// Bring completed stuff back.
    Untick {
        /// Comma-separated positions among completed stuff.
        #[arg(value_parser = parse_positions)]
        items: Positions,
    },
    /// Bring forgotten stuff back.
    Unforget {
        /// Comma-separated positions among forgotten stuff.
        #[arg(value_parser = parse_positions)]
        items: Positions,
    },
    /// Show stuff.
    Show {
        /// Position of the item.
        #[arg(value_parser = parse_position)]
        item: ItemRef,
    },
    /// Show history of changes.
    History(PageArgs),
    /// Show the most recently used tags.
    Tags {
        /// How many tags to show.
        #[arg(short, long)]
        num: Option<usize>,
    },
    /// Check the hash chain against the stored stuff.
    Verify {
        /// Records to check, newest first; the whole chain when omitted.
        #[arg(long)]
        depth: Option<usize>,
    },
}

/// Paging options.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PageArgs {
    /// How much stuff to list.
    #[arg(short, long)]
    pub num: Option<usize>,
    /// Which page of results to list.
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

impl PageArgs {
    /// Rows to skip for `page_size` rows per page.
    pub fn offset(&self, page_size: usize) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(page_size)
    }
}

impl Default for PageArgs {
    fn default() -> Self {
        Self { num: None, page: 1 }
    }
}

/// Listing options.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Only stuff with this tag.
    pub tag: Option<String>,
    /// Paging.
    #[command(flatten)]
    pub paging: PageArgs,
}

impl ListArgs {
    /// Tag label as stored: without `#`, lowercase.
    pub fn label(&self) -> Option<String> {
        self.tag
            .as_deref()
            .map(|t| t.trim_start_matches('#').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
    }
}

/// Item positions given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positions(pub Vec<ItemRef>);

/// Parse `"1,3, 5"` into positions.
pub fn parse_positions(raw: &str) -> Result<Positions, String> {
    let refs = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;
    if refs.is_empty() {
        return Err("expected at least one position".to_string());
    }
    Ok(Positions(refs))
}

/// Parse one 1-based position.
pub fn parse_position(raw: &str) -> Result<ItemRef, String> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(ItemRef::Position(n)),
        _ => Err(format!("not a position: {raw}")),
    }
}
