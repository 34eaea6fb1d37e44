mod basic;
mod client;
pub mod auth;

pub use basic::{BasicClient, DEFAULT_TIMEOUT};
pub use client::HttpClient;
