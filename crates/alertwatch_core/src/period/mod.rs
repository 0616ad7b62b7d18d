//! Active period normalization.
//!
//! # Responsibility
//! - Parse clock/date/weekday tokens (`token`).
//! - Classify period text against the known grammars (`grammar`).
//! - Expand classified text into atomic periods (`normalizer`).
//! - Expose normalization as a pluggable strategy (`strategy`).
//!
//! # Invariants
//! - Normalization is pure and synchronous; calls share no mutable state.

pub mod grammar;
pub mod normalizer;
pub mod strategy;
pub mod token;
