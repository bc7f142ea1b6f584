//! Service layer: the data-refresh and view-derivation pipeline.
//!
//! Order of operations per refresh: shipping precedence resolution, then the
//! two left joins, then the pure view derivation. The orchestrator wires
//! these against the data source and the snapshot cache and decides when a
//! live refresh is needed at all.

pub mod join;
pub mod refresh;
pub mod shipping;
pub mod view;

pub use join::join_rows;
pub use refresh::{DashboardState, RefreshOrchestrator, RefreshOutcome};
pub use shipping::resolve_precedence;
pub use view::build_view;
