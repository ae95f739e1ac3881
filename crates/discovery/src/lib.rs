//! Discovery of alpha the public leaderboard's top-score ranking misses,
//! plus an informational estimate of how long a wallet's edge might last.

pub mod edge_persistence;
pub mod hidden_alpha;
pub mod store;

pub use store::{run_discovery_pass, run_persistence_pass};
