//! Core logic for alertwatch: turns a transit agency's service-alert feed
//! into normalized, sortable active periods for one tracked disruption.
//!
//! Pipeline: feed JSON → `feed::decode_feed` → `feed::selector` →
//! `service::alert_service` (period normalization) → `service::snapshot_service`
//! (change classification) → `render::render_page`.

pub mod config;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod period;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{ConfigError, MonitorConfig};
pub use feed::selector::{
    AlertMatch, AlertSelector, SelectedAlert, SelectionCriteria, SelectionPolicy,
};
pub use feed::{decode_feed, FeedError};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::alert::{NormalizedAlert, RawAlert};
pub use model::period::{sort_periods, AtomicPeriod, CalendarDate, ClockTime, PeriodPoint};
pub use period::normalizer::{normalize, NormalizeOptions, OvernightPolicy, PeriodNormalizer};
pub use period::strategy::{
    GrammarStrategy, NormalizeError, PeriodNormalizationStrategy, RawTextStrategy,
    StrategyRegistry, StrategyRegistryError,
};
pub use period::token::{parse_clock_time, parse_month_day, FormatError};
pub use render::{render_page, PageContext};
pub use repo::snapshot_repo::{
    RepoError, RepoResult, SnapshotEntry, SnapshotMap, SnapshotRepository,
    SqliteSnapshotRepository,
};
pub use service::alert_service::{AlertService, ConsolidationReport};
pub use service::snapshot_service::{AlertChange, SnapshotDiff, SnapshotService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
