//! Download submission.
//!
//! This module provides a `DownloadSubmitter` trait for handing a magnet link
//! to the torrent client that performs the actual download.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentSubmitter;
pub use types::*;
