//! GTFS-realtime alert feed decoding and alert selection.
//!
//! # Responsibility
//! - Decode the JSON alert feed into `RawAlert` records (`decode`).
//! - Narrow decoded alerts to the tracked route and disruption (`selector`).
//!
//! # Invariants
//! - Only `"en"` translations are read.
//! - Missing optional feed sections never fail decoding.

pub mod decode;
pub mod selector;
mod wire;

pub use decode::{decode_feed, FeedError};
