//! HTTP server module for the yard dashboard backend.
//!
//! Axum-based REST surface over the refresh orchestrator. This layer parses
//! requests and serializes responses — all business logic lives in the
//! service layer, and all visual concerns (colors, layout, the auto-refresh
//! timer) live in the frontend consuming this API.

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub use router::create_router;

pub use state::AppState;
