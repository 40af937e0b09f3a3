//! Per-load state machine and the open-file action.
//!
//! A [`CatalogSession`] moves `idle → loading → ready | failed`. Every load
//! is tagged with a generation number; a load that completes after a newer
//! one has started is discarded instead of overwriting fresher state.

mod opener;

pub use opener::{RecordingOpener, SystemOpener, UrlOpener};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::CatalogApi;
use crate::catalog::{CatalogView, ViewProfile};
use crate::fetch::FetchError;
use crate::record::{Record, media_original_url};

/// Errors from the open-file action.
#[derive(Debug, Error)]
pub enum OpenFileError {
    /// The record has no primary media reference.
    #[error("no primary file for this item")]
    NoPrimaryFile,

    /// The media record carries no original-file URL.
    #[error("no file URL found")]
    NoFileUrl,

    /// The media record could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The host could not open the URL.
    #[error("{reason}")]
    Opener {
        /// What went wrong.
        reason: String,
    },
}

/// Where the session is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// Records are available.
    Ready,
    /// The last load failed with this message.
    Failed(String),
}

/// Handle identifying one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a load must be completed with its ticket"]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Generation number of this load.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Whether a completed load was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the session state.
    Applied,
    /// A newer load had started; the result was dropped.
    Discarded,
}

/// What the grid area should show.
#[derive(Debug, PartialEq)]
pub enum RenderState<'a> {
    /// No load requested yet.
    Idle,
    /// Loading indicator.
    Loading,
    /// Error text; no grid.
    Error(&'a str),
    /// Load succeeded but nothing matches the filter.
    NoResults,
    /// Records on the current page.
    Grid(Vec<&'a Record>),
}

/// Load state plus the view built from the latest successful load.
#[derive(Debug)]
pub struct CatalogSession {
    profile: ViewProfile,
    state: LoadState,
    generation: u64,
    view: Option<CatalogView>,
}

impl CatalogSession {
    /// Creates an idle session for `profile`.
    #[must_use]
    pub fn new(profile: ViewProfile) -> Self {
        Self {
            profile,
            state: LoadState::Idle,
            generation: 0,
            view: None,
        }
    }

    /// Current load lifecycle state.
    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// View over the last applied records, if any.
    #[must_use]
    pub fn view(&self) -> Option<&CatalogView> {
        self.view.as_ref()
    }

    /// Mutable access for search, facet and page changes.
    pub fn view_mut(&mut self) -> Option<&mut CatalogView> {
        self.view.as_mut()
    }

    /// Starts a new load, superseding any in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        debug!(generation = self.generation, view = self.profile.name, "Load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies the result of the load identified by `ticket`.
    ///
    /// Results from superseded loads are discarded and leave state untouched.
    pub fn complete_load<E>(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Record>, E>,
    ) -> LoadOutcome
    where
        E: std::fmt::Display,
    {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding superseded load"
            );
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(records) => {
                info!(count = records.len(), view = self.profile.name, "Catalog loaded");
                self.view = Some(CatalogView::new(records, self.profile));
                self.state = LoadState::Ready;
            }
            Err(error) => {
                warn!(error = %error, "Catalog load failed");
                self.view = None;
                self.state = LoadState::Failed(error.to_string());
            }
        }
        LoadOutcome::Applied
    }

    /// Runs a full load through `api`.
    pub async fn load(&mut self, api: &CatalogApi) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = api.list_items().await;
        self.complete_load(ticket, result)
    }

    /// What to display for the current state.
    #[must_use]
    pub fn render(&self) -> RenderState<'_> {
        match (&self.state, &self.view) {
            (LoadState::Idle, _) => RenderState::Idle,
            (LoadState::Loading, _) => RenderState::Loading,
            (LoadState::Failed(message), _) => RenderState::Error(message),
            (LoadState::Ready, Some(view)) => {
                let visible = view.visible();
                if visible.is_empty() {
                    RenderState::NoResults
                } else {
                    RenderState::Grid(visible)
                }
            }
            (LoadState::Ready, None) => RenderState::NoResults,
        }
    }
}

/// Resolves a record's primary file and hands its URL to `opener`.
///
/// No request is made when the record has no primary media.
///
/// # Errors
///
/// Returns [`OpenFileError::NoPrimaryFile`], [`OpenFileError::NoFileUrl`],
/// the fetch failure, or the opener's failure.
#[instrument(skip_all, fields(item = ?record.id()))]
pub async fn open_file(
    record: &Record,
    api: &CatalogApi,
    opener: &dyn UrlOpener,
) -> Result<String, OpenFileError> {
    let media_id = record.primary_media_id().ok_or(OpenFileError::NoPrimaryFile)?;
    let media = api.media(&media_id).await?;
    let url = media_original_url(&media)
        .ok_or(OpenFileError::NoFileUrl)?
        .to_string();
    opener.open(&url)?;
    info!(media_id = %media_id, "Opened original file");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{ApiConfig, ApiCredentials};
    use crate::fetch::ResilientFetcher;

    fn records(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|i| Record::new(json!({ "o:id": i, "o:title": format!("Item {i}") })))
            .collect()
    }

    fn offline_api() -> CatalogApi {
        CatalogApi::new(
            ApiConfig {
                base_url: "https://lib.example.org/api".into(),
                credentials: ApiCredentials {
                    key_identity: "i".into(),
                    key_credential: "c".into(),
                },
            },
            ResilientFetcher::new(),
        )
    }

    #[test]
    fn test_lifecycle_to_ready() {
        let mut session = CatalogSession::new(ViewProfile::BOOKS);
        assert_eq!(session.render(), RenderState::Idle);

        let ticket = session.begin_load();
        assert_eq!(session.render(), RenderState::Loading);

        let outcome = session.complete_load::<FetchError>(ticket, Ok(records(3)));
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.state(), &LoadState::Ready);
        assert!(matches!(session.render(), RenderState::Grid(ref cards) if cards.len() == 3));
    }

    #[test]
    fn test_failure_renders_message_and_no_grid() {
        let mut session = CatalogSession::new(ViewProfile::BOOKS);
        let ticket = session.begin_load();
        session.complete_load(ticket, Err::<Vec<Record>, _>("HTTP 500"));
        assert_eq!(session.render(), RenderState::Error("HTTP 500"));
        assert!(session.view().is_none());
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let mut session = CatalogSession::new(ViewProfile::BOOKS);
        let first = session.begin_load();
        let second = session.begin_load();
        assert!(second.generation() > first.generation());

        let outcome = session.complete_load::<FetchError>(second, Ok(records(2)));
        assert_eq!(outcome, LoadOutcome::Applied);

        let stale = session.complete_load::<FetchError>(first, Ok(records(9)));
        assert_eq!(stale, LoadOutcome::Discarded);
        assert_eq!(session.view().map(|v| v.records().len()), Some(2));
    }

    #[test]
    fn test_no_results_state() {
        let mut session = CatalogSession::new(ViewProfile::BOOKS);
        let ticket = session.begin_load();
        session.complete_load::<FetchError>(ticket, Ok(records(4)));
        session.view_mut().unwrap().set_search("abc");
        assert_eq!(session.render(), RenderState::NoResults);
    }

    #[test]
    fn test_open_without_primary_file() {
        let record = Record::new(json!({ "o:id": 5, "o:title": "Loose leaf" }));
        let opener = RecordingOpener::new();
        let api = offline_api();
        let err = tokio_test::block_on(open_file(&record, &api, &opener)).unwrap_err();
        assert_eq!(err.to_string(), "no primary file for this item");
        assert!(opener.opened().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_via_empty_chain() {
        let mut session = CatalogSession::new(ViewProfile::HOME);
        let outcome = session.load(&offline_api()).await;
        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(matches!(session.state(), LoadState::Failed(msg) if msg.contains("no transports")));
    }
}
