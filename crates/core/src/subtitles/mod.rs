//! Subtitle search abstraction.

mod subtitler;
mod types;

pub use subtitler::SubtitlerApiClient;
pub use types::*;
