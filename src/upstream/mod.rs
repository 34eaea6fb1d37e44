//! Client for the transit provider's route and vehicle endpoints.

mod client;
mod wire;

pub use client::{BATCH_CAP, DEFAULT_BASE_URL, UpstreamClient};
pub use wire::{FlexString, UpstreamError};
