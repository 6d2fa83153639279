//! weather-cli library
//!
//! Exposes the cache, API client, service and rendering modules for use by the
//! binary and in integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod data;
pub mod display;
pub mod logging;
pub mod service;
