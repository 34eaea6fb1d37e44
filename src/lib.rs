pub mod cancel;
pub mod classify;
pub mod config;
pub mod direction;
pub mod error;
pub mod fetch;
pub mod models;
pub mod output;
pub mod service;
pub mod stats;
pub mod tracker;
pub mod upstream;

pub use cancel::Cancel;
pub use error::{Error, Result};
pub use service::FleetService;
