//! ytm-browser library: response parsing core, API client and terminal UI.

#[macro_use]
pub mod chain;

pub mod app_core;
pub mod classifier;
pub mod client;
pub mod download;
pub mod error;
pub mod logging;
pub mod paths;
pub mod registry;
pub mod responses;
pub mod session;
pub mod start_endpoints;
pub mod theme;
pub mod ui;
