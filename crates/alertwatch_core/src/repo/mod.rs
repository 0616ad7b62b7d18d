//! Repository layer for persisted comparison state.
//!
//! # Responsibility
//! - Define the snapshot persistence contract used between runs.
//! - Keep SQLite query details out of the service layer.
//!
//! # Invariants
//! - The normalizer never reads or writes persisted state.

pub mod snapshot_repo;
