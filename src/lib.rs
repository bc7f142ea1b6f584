//! # Pátio Monitor Backend
//!
//! Data-refresh and view-derivation pipeline for the yard departure dashboard.
//!
//! This crate fetches raw yard-control records from the operational store,
//! joins them against vehicle-composition and shipping-reference data, derives
//! a time-based priority classification for every vehicle still waiting to
//! leave, and maintains a two-tier cache (in-process memo + persistent JSON
//! snapshot) so the dashboard always has data to show, even right after a
//! cold start or during a database outage. The derived table is exposed over
//! a REST API via Axum for the display frontend.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Core domain types (priority tiers, directions, display rows)
//!   and business-timezone arithmetic
//! - [`db`]: Data source adapter via the Repository pattern (Postgres or
//!   in-memory), connection pooling, and the process-wide singleton
//! - [`services`]: The pipeline itself — shipping precedence, join engine,
//!   view builder, and the refresh orchestrator
//! - [`cache`]: Persistent snapshot store with atomic replace and the
//!   staleness policy
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Refresh policy
//!
//! Every render cycle serves the cached view first and only then decides
//! whether to hit the data source: a broken or slow refresh can never take
//! the last good table off the screen.

pub mod cache;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
