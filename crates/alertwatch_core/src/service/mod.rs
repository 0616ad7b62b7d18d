//! Core use-case services.
//!
//! # Responsibility
//! - Consolidate selected alerts into normalized, user-facing records.
//! - Classify alerts against the previous run's snapshot.
//! - Keep CLI callers decoupled from strategy and storage details.

pub mod alert_service;
pub mod snapshot_service;
