//! Command execution: resolve config, load the catalog, render or open.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use culture_read_core::api::CatalogApi;
use culture_read_core::catalog::ViewProfile;
use culture_read_core::config::{self, ConfigOverrides, ResolvedConfig};
use culture_read_core::fetch::build_fetcher;
use culture_read_core::record::FacetDimension;
use culture_read_core::session::{
    CatalogSession, LoadState, RecordingOpener, SystemOpener, UrlOpener, open_file,
};

use crate::ProcessExit;
use crate::app::progress::LoadingSpinner;
use crate::app::{render, terminal};
use crate::cli::{BrowseArgs, Cli, Command, HomeArgs, OpenArgs};

pub(crate) async fn run() -> Result<ProcessExit> {
    let cli = Cli::parse();

    let no_color = terminal::is_no_color_requested(&cli);
    terminal::init_tracing(terminal::default_log_level(cli.verbose, cli.quiet), no_color);
    debug!(?cli, "CLI arguments parsed");

    let resolved = resolve_config(&cli)?;
    let fetcher = build_fetcher(&resolved.fetch)?;
    info!(
        transports = ?fetcher.transport_names(),
        base_url = %resolved.api.base_url,
        "Culture Read starting"
    );
    let api = CatalogApi::new(resolved.api.clone(), fetcher);

    match &cli.command {
        Command::Browse(args) => run_browse(&cli, &resolved, &api, args).await,
        Command::Home(args) => run_home(&cli, &resolved, &api, args).await,
        Command::Facets => run_facets(&cli, &api).await,
        Command::Open(args) => run_open(&cli, &api, args).await,
    }
}

fn resolve_config(cli: &Cli) -> Result<ResolvedConfig> {
    let loaded = config::load_config_file(cli.config.as_deref(), config::process_env)?;
    if let Some(path) = loaded.path.as_deref() {
        debug!(path = %path.display(), from_file = loaded.loaded_from_file(), "Config path");
    }
    let overrides = ConfigOverrides {
        api_base_url: cli.api_base_url.clone(),
        timeout_secs: cli.timeout,
        date_locale: cli.date_locale,
    };
    config::resolve(&overrides, &loaded, config::process_env)
        .context("Failed to resolve configuration")
}

/// Loads the catalog behind a spinner. Returns `None` after printing the
/// error when the load failed.
async fn load_session(cli: &Cli, api: &CatalogApi, profile: ViewProfile) -> Option<CatalogSession> {
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    );
    let spinner = LoadingSpinner::start(use_spinner, render::LOADING_TEXT);

    let mut session = CatalogSession::new(profile);
    session.load(api).await;
    spinner.finish();

    if let LoadState::Failed(message) = session.state() {
        eprintln!("{}", render::error_text(message));
        return None;
    }
    Some(session)
}

async fn run_browse(
    cli: &Cli,
    resolved: &ResolvedConfig,
    api: &CatalogApi,
    args: &BrowseArgs,
) -> Result<ProcessExit> {
    let Some(mut session) = load_session(cli, api, ViewProfile::BOOKS).await else {
        return Ok(ProcessExit::Failure);
    };

    if let Some(view) = session.view_mut() {
        if let Some(search) = args.search.as_deref() {
            view.set_search(search);
        }
        let selections = [
            (FacetDimension::Category, &args.categories),
            (FacetDimension::Language, &args.languages),
            (FacetDimension::Source, &args.sources),
        ];
        for (dimension, labels) in selections {
            for label in labels {
                if !view.filter().is_selected(dimension, label) {
                    view.toggle_facet(dimension, label);
                }
            }
        }
        let requested = usize::try_from(args.page).unwrap_or(usize::MAX);
        let shown = view.go_to_page(requested);
        if shown != requested {
            debug!(requested, shown, "Requested page clamped");
        }
    }

    print_session(cli, &session, resolved)?;
    Ok(ProcessExit::Success)
}

fn print_session(cli: &Cli, session: &CatalogSession, resolved: &ResolvedConfig) -> Result<()> {
    match session.view() {
        Some(view) if cli.json => {
            let text = render::render_view_json(view, resolved.date_locale)
                .context("Failed to serialize results")?;
            println!("{text}");
        }
        _ => print!("{}", render::render_session(session, resolved.date_locale)),
    }
    Ok(())
}

async fn run_home(
    cli: &Cli,
    resolved: &ResolvedConfig,
    api: &CatalogApi,
    args: &HomeArgs,
) -> Result<ProcessExit> {
    let Some(mut session) = load_session(cli, api, ViewProfile::HOME).await else {
        return Ok(ProcessExit::Failure);
    };
    if let (Some(view), Some(search)) = (session.view_mut(), args.search.as_deref()) {
        view.set_search(search);
    }
    print_session(cli, &session, resolved)?;
    Ok(ProcessExit::Success)
}

async fn run_facets(cli: &Cli, api: &CatalogApi) -> Result<ProcessExit> {
    let Some(session) = load_session(cli, api, ViewProfile::BOOKS).await else {
        return Ok(ProcessExit::Failure);
    };
    if let Some(view) = session.view() {
        if cli.json {
            let text = render::render_facets_json(view.facets())
                .context("Failed to serialize facets")?;
            println!("{text}");
            return Ok(ProcessExit::Success);
        }
        println!("{}", render::result_count_line(view.records().len()));
        println!();
        print!("{}", render::render_facets(view.facets(), None));
    }
    Ok(ProcessExit::Success)
}

async fn run_open(cli: &Cli, api: &CatalogApi, args: &OpenArgs) -> Result<ProcessExit> {
    let Some(session) = load_session(cli, api, ViewProfile::BOOKS).await else {
        return Ok(ProcessExit::Failure);
    };
    let Some(record) = session
        .view()
        .and_then(|view| {
            view.records()
                .iter()
                .find(|record| record.id().as_deref() == Some(args.item_id.as_str()))
        })
    else {
        bail!("item '{}' not found in the catalog", args.item_id);
    };

    let recorder = RecordingOpener::new();
    let system = SystemOpener;
    let opener: &dyn UrlOpener = if args.print_url { &recorder } else { &system };

    match open_file(record, api, opener).await {
        Ok(url) => {
            if args.print_url || !cli.quiet {
                println!("{url}");
            }
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            eprintln!("{}", render::error_text(&error.to_string()));
            Ok(ProcessExit::Failure)
        }
    }
}
