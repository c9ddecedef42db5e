//! # SoftDesk API Server Library
//!
//! HTTP surface of the SoftDesk issue tracker. Handlers are thin wrappers
//! around `softdesk_shared::tracker`.
//!
//! ## Modules
//!
//! - `app`: application state, router and auth layer
//! - `config`: environment configuration
//! - `error`: domain error to HTTP response mapping
//! - `extract`: extractors that reject with JSON bodies
//! - `routes`: route handlers, one module per resource

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
