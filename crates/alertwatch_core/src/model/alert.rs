//! Alert records before and after normalization.
//!
//! # Responsibility
//! - Carry the English-only fields the pipeline reads from the feed.
//! - Hold the consolidated, user-facing record per tracked header.
//!
//! # Invariants
//! - `RawAlert` is produced once per feed entity and never mutated.
//! - `NormalizedAlert::atomic_periods` is sorted by start (see `sort_periods`).

use crate::model::period::AtomicPeriod;
use serde::{Deserialize, Serialize};

/// Agency-sourced alert, reduced to the fields the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAlert {
    /// Opaque feed entity identifier.
    pub id: String,
    /// English header translation.
    pub header_text: Option<String>,
    /// English human-readable active period translation.
    pub raw_active_period: Option<String>,
    /// Route sort-order tags from every informed entity, in feed order.
    #[serde(default)]
    pub sort_orders: Vec<String>,
}

impl RawAlert {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header_text: None,
            raw_active_period: None,
            sort_orders: Vec::new(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header_text = Some(header.into());
        self
    }

    pub fn with_active_period(mut self, period: impl Into<String>) -> Self {
        self.raw_active_period = Some(period.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_orders.push(sort_order.into());
        self
    }
}

/// Consolidated record for all alerts sharing one header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAlert {
    pub header: String,
    /// Contributing alert ids in selection order.
    pub alert_ids: Vec<String>,
    /// Raw period strings in selection order.
    pub raw_periods: Vec<String>,
    /// Concatenated expansions, sorted by start.
    pub atomic_periods: Vec<AtomicPeriod>,
}

impl NormalizedAlert {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alert_ids: Vec::new(),
            raw_periods: Vec::new(),
            atomic_periods: Vec::new(),
        }
    }

    /// Returns whether any contributing period could not be normalized.
    pub fn has_degenerate_periods(&self) -> bool {
        self.atomic_periods.iter().any(AtomicPeriod::is_degenerate)
    }
}
