//! Culture Read Core Library
//!
//! Client-side catalog browsing for an Omeka S style digital library: the
//! whole item collection is fetched once through a chain of fallback
//! transports, then searched, faceted and paginated locally.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Resilient JSON fetching through proxy and direct transports
//! - [`record`] - Raw catalog records and total field-resolution helpers
//! - [`catalog`] - Facets, filtering and pagination over a loaded record set
//! - [`config`] - Environment, config-file and flag layering
//! - [`api`] - Repository endpoints with access keys attached
//! - [`session`] - Load state machine and the open-file action

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod record;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use api::CatalogApi;
pub use catalog::{Card, CatalogView, Facet, FacetSummary, FilterState, PageControls, ViewProfile};
pub use config::{ApiConfig, ConfigError, ConfigOverrides, ResolvedConfig};
pub use fetch::{FetchError, FetchSettings, ResilientFetcher, Transport, TransportKind, build_fetcher};
pub use record::{DateLocale, FacetDimension, Record};
pub use session::{
    CatalogSession, LoadOutcome, LoadState, OpenFileError, RenderState, UrlOpener, open_file,
};
