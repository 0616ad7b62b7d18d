//! Alert consolidation service.
//!
//! # Responsibility
//! - Normalize every selected alert's active period with one strategy.
//! - Merge alerts that share a header into one `NormalizedAlert`.
//!
//! # Invariants
//! - One strategy per run; the report records which one.
//! - Groups appear in first-seen order; raw periods keep selection order.
//! - Atomic periods are concatenated, then stably sorted by start.

use crate::feed::selector::SelectedAlert;
use crate::model::alert::NormalizedAlert;
use crate::model::period::sort_periods;
use crate::period::strategy::{NormalizeError, PeriodNormalizationStrategy, StrategyRegistry};
use log::{debug, info};
use std::sync::Arc;

/// Output of one consolidation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    /// Strategy that produced every period in `alerts`.
    pub strategy_id: String,
    pub alerts: Vec<NormalizedAlert>,
}

/// Use-case service turning selected alerts into normalized records.
pub struct AlertService {
    strategy: Arc<dyn PeriodNormalizationStrategy>,
}

impl AlertService {
    pub fn new(strategy: Arc<dyn PeriodNormalizationStrategy>) -> Self {
        Self { strategy }
    }

    /// Binds the registry's active strategy for the lifetime of the service.
    pub fn from_registry(registry: &StrategyRegistry) -> Result<Self, NormalizeError> {
        Ok(Self::new(registry.active_strategy()?))
    }

    pub fn strategy_id(&self) -> &str {
        self.strategy.strategy_id()
    }

    /// Normalizes and merges selected alerts.
    ///
    /// Alerts without a header cannot be grouped and are skipped; alerts
    /// without an active period contribute their id only.
    ///
    /// # Errors
    /// - Propagates `NormalizeError` from a strict strategy.
    pub fn consolidate(
        &self,
        selected: &[SelectedAlert],
        assumed_year: i32,
    ) -> Result<ConsolidationReport, NormalizeError> {
        let mut groups: Vec<NormalizedAlert> = Vec::new();

        for SelectedAlert { alert, .. } in selected {
            let Some(header) = alert.header_text.as_deref() else {
                debug!(
                    "event=alert_consolidate module=service status=skip alert_id={} reason=missing_header",
                    alert.id
                );
                continue;
            };

            let index = match groups.iter().position(|group| group.header == header) {
                Some(index) => index,
                None => {
                    groups.push(NormalizedAlert::new(header));
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.alert_ids.push(alert.id.clone());

            let Some(period_text) = alert.raw_active_period.as_deref() else {
                debug!(
                    "event=alert_consolidate module=service status=skip alert_id={} reason=missing_period",
                    alert.id
                );
                continue;
            };

            let periods = self.strategy.normalize(period_text, assumed_year)?;
            group.raw_periods.push(period_text.to_string());
            group.atomic_periods.extend(periods);
        }

        for group in &mut groups {
            sort_periods(&mut group.atomic_periods);
        }

        info!(
            "event=alert_consolidate module=service status=ok strategy={} groups={} periods={}",
            self.strategy_id(),
            groups.len(),
            groups
                .iter()
                .map(|group| group.atomic_periods.len())
                .sum::<usize>()
        );

        Ok(ConsolidationReport {
            strategy_id: self.strategy_id().to_string(),
            alerts: groups,
        })
    }
}
