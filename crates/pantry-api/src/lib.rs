//! Pantry API Library
//!
//! This crate provides the HTTP handlers, pipeline services, middleware and
//! application setup for the grocery catalog.

mod handlers;
mod middleware;
mod telemetry;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
