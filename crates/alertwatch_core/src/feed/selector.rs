//! Alert selection for the tracked route and disruption.
//!
//! # Responsibility
//! - Compute the route sort-order match and the header phrase match for
//!   every alert, independently.
//! - Gate inclusion according to `SelectionPolicy`.
//!
//! # Invariants
//! - Both signals are always computed and logged, whatever the policy.
//! - Selection preserves feed order.

use crate::model::alert::RawAlert;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Which signals gate inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Header phrase alone decides; the route signal is informational.
    #[default]
    PhraseOnly,
    /// Both route and header phrase must match.
    RouteAndPhrase,
}

/// What the selector looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Exact sort-order tag, e.g. `MTASBWY:7:20`.
    pub route_sort_order: String,
    /// Case-sensitive substring of the English header.
    pub header_phrase: String,
    pub policy: SelectionPolicy,
}

/// Independent selection signals for one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertMatch {
    pub route_match: bool,
    pub phrase_match: bool,
}

/// Alert that passed selection, with the signals that admitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAlert {
    pub alert: RawAlert,
    pub signals: AlertMatch,
}

/// Filters raw alerts down to the tracked disruption.
#[derive(Debug, Clone)]
pub struct AlertSelector {
    criteria: SelectionCriteria,
}

impl AlertSelector {
    pub fn new(criteria: SelectionCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    /// Computes both signals for one alert.
    pub fn evaluate(&self, alert: &RawAlert) -> AlertMatch {
        let route_match = alert
            .sort_orders
            .iter()
            .any(|sort_order| *sort_order == self.criteria.route_sort_order);
        let phrase_match = alert
            .header_text
            .as_deref()
            .is_some_and(|header| header.contains(self.criteria.header_phrase.as_str()));

        AlertMatch {
            route_match,
            phrase_match,
        }
    }

    /// Returns whether `signals` admit an alert under the configured policy.
    pub fn admits(&self, signals: AlertMatch) -> bool {
        match self.criteria.policy {
            SelectionPolicy::PhraseOnly => signals.phrase_match,
            SelectionPolicy::RouteAndPhrase => signals.route_match && signals.phrase_match,
        }
    }

    /// Selects admitted alerts in input order.
    pub fn select(&self, alerts: Vec<RawAlert>) -> Vec<SelectedAlert> {
        let total = alerts.len();
        let selected: Vec<SelectedAlert> = alerts
            .into_iter()
            .filter_map(|alert| {
                let signals = self.evaluate(&alert);
                let included = self.admits(signals);
                debug!(
                    "event=alert_select module=feed alert_id={} route_match={} phrase_match={} included={}",
                    alert.id, signals.route_match, signals.phrase_match, included
                );
                included.then_some(SelectedAlert { alert, signals })
            })
            .collect();

        info!(
            "event=alert_select module=feed status=ok alerts={} selected={} route_matches={}",
            total,
            selected.len(),
            selected
                .iter()
                .filter(|selected| selected.signals.route_match)
                .count()
        );
        selected
    }
}
