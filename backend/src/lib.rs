//! # Ercole API
//!
//! HTTP API of the Ercole IT-asset and license inventory.
//!
//! The crate exposes hosts, databases, license agreements and contracts,
//! license types and administrative entities over a REST API. Every
//! handler parses its request, calls one service operation and maps the
//! result to an HTTP response, as JSON or as a generated spreadsheet.
//!
//! ## Architecture
//!
//! - [`config`]: configuration file and environment overrides
//! - [`model`]: entities exchanged with the service layer and query filters
//! - [`service`]: per-family service traits and the in-memory implementation
//! - [`export`]: spreadsheet and CSV rendering
//! - [`auth`]: bearer-token authentication
//! - [`http`]: axum router, handlers, parameter parsing and error mapping

pub mod auth;
pub mod config;
pub mod export;
pub mod http;
pub mod model;
pub mod service;
