//! Read-only HTTP surface over the running collector

mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use server::{router, run, shutdown_signal};
