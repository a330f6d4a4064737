//! HTTP server module for the Ercole API.
//!
//! This module exposes the service layer as a REST API built on axum.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Parameter parsing, strict JSON decoding                │
//! │  - Read-only and feature gates                            │
//! │  - JSON / spreadsheet negotiation, error mapping          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (service/)                                 │
//! │  - One trait per resource family, composed in ApiService  │
//! │  - LocalService in-memory implementation                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod negotiate;
pub mod params;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::create_router;
pub use state::AppState;
