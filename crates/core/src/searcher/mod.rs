//! Torrent search abstraction.
//!
//! This module provides a `TorrentSearch` trait for querying the torrent
//! search service for releases of a film title.

mod torrent_api;
mod types;

pub use torrent_api::TorrentApiSearcher;
pub use types::*;
