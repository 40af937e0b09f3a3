//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use culture_read_core::record::DateLocale;

/// Browse, search and open documents from a digital library.
///
/// The whole item collection is fetched once per invocation, then filtered
/// and paginated locally.
#[derive(Parser, Debug)]
#[command(name = "culture-read")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file path (default: $XDG_CONFIG_HOME/culture-read/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository API base URL (overrides environment and config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Per-attempt timeout in seconds (1-300)
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: Option<u64>,

    /// Date display locale (th or en)
    #[arg(long, global = true, value_name = "LOCALE", value_parser = parse_locale)]
    pub date_locale: Option<DateLocale>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full catalog: facets, search and paginated cards (9 per page)
    Browse(BrowseArgs),
    /// Landing view: search only, first 12 matching cards
    Home(HomeArgs),
    /// List category, language and source facets with counts
    Facets,
    /// Open an item's primary file in the browser
    Open(OpenArgs),
}

/// Arguments for `browse`.
#[derive(Args, Debug, Clone, Default)]
pub struct BrowseArgs {
    /// Search text matched against titles and descriptions
    pub search: Option<String>,

    /// Select a category facet (repeatable)
    #[arg(long = "category", value_name = "LABEL")]
    pub categories: Vec<String>,

    /// Select a language facet (repeatable)
    #[arg(long = "language", value_name = "LABEL")]
    pub languages: Vec<String>,

    /// Select a source facet (repeatable)
    #[arg(long = "source", value_name = "LABEL")]
    pub sources: Vec<String>,

    /// Page to show (clamped to the available range)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,
}

/// Arguments for `home`.
#[derive(Args, Debug, Clone, Default)]
pub struct HomeArgs {
    /// Search text matched against titles and descriptions
    pub search: Option<String>,
}

/// Arguments for `open`.
#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Item identifier (`o:id`)
    pub item_id: String,

    /// Print the file URL instead of launching a browser
    #[arg(long)]
    pub print_url: bool,
}

fn parse_locale(value: &str) -> Result<DateLocale, String> {
    value.parse()
}
