//! Torrent metadata inspection.
//!
//! Resolves a candidate's magnet link into its file listing so the matching
//! engine can look for embedded subtitle files.

mod metadata_api;
mod types;

pub use metadata_api::MetadataApiInspector;
pub use types::*;
