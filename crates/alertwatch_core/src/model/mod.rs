//! Domain model for alerts and their normalized active periods.
//!
//! # Responsibility
//! - Define the value types exchanged between feed decoding, selection,
//!   normalization and presentation.
//! - Keep serialized period shape stable (`YYYY-MM-DD HH:MM:SS` strings).
//!
//! # Invariants
//! - Period values are immutable once produced by a normalization strategy.
//! - A degenerate period carries the unparsed agency text in both endpoints.

pub mod alert;
pub mod period;
