//! HTTP trigger surface for the films processor.

pub mod api;
pub mod metrics;
pub mod state;
