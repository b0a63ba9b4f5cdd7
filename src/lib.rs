//! # tiktide
//!
//! Browser-driven harvesting of TikTok explore and search metadata.
//!
//! ## Architecture
//!
//! ```text
//! Session → Listing page → Video links → Video pages → Extraction cascade → JSON
//! ```
//!
//! - [`scraper`]: browser sessions, page interaction, extraction and collection
//! - [`server`]: HTTP API built with axum
//! - [`cli`]: command-line entry points
//!
//! ## Quick Start
//!
//! ```bash
//! # Metadata for ten explore videos
//! tiktide explore --number 10
//!
//! # Video URLs for a search
//! tiktide search "cute cats" --number 5
//!
//! # Serve the HTTP API on port 3000
//! tiktide serve
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires configuration, the
/// browser session provider and the [`Harvester`](scraper::Harvester).
pub mod app;

/// Command-line interface using clap.
///
/// - `serve` - Run the HTTP API
/// - `explore [--number N]` - Collect explore metadata
/// - `search <keywords> [--number N]` - List search result URLs
/// - `links` - List explore links without visiting them
pub mod cli;

/// Configuration file handling.
///
/// Loads from `~/.config/tiktide/config.toml`, creating a commented default
/// on first run.
pub mod config;

/// Core domain models.
///
/// - [`VideoLink`](domain::VideoLink): a link found on a listing page
/// - [`VideoMetadata`](domain::VideoMetadata): the normalized per-video record
pub mod domain;

/// Browser automation and metadata extraction.
///
/// - [`Harvester`](scraper::Harvester): explore collection and keyword search
/// - [`MetadataExtractor`](scraper::MetadataExtractor): ordered extraction strategies
/// - [`ChromeSessionProvider`](scraper::ChromeSessionProvider): chromiumoxide sessions
pub mod scraper;

/// HTTP API.
///
/// `GET /tiktok/explore`, `GET /tiktok/search` and `GET /health`.
pub mod server;
