//! Command-line client for the IBU biathlon results service.
//!
//! The crate is split along the request path: [`api`] talks to the service
//! and parses payloads, [`report`] filters, sorts, and renders tables, and
//! [`commands`] wires one subcommand each on top of both.

pub mod api;
pub mod cli;
pub mod commands;
pub mod completion;
pub mod constants;
pub mod error;
pub mod logging;
pub mod report;
pub mod shooting;
pub mod timing;

pub use api::ApiClient;
pub use error::AppError;
