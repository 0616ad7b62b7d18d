//! Normalization strategy capability and in-process registry.

use crate::model::period::AtomicPeriod;
use crate::period::normalizer::{NormalizeOptions, PeriodNormalizer};
use crate::period::token::FormatError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Strategy id of the grammar-based reference normalizer.
pub const GRAMMAR_STRATEGY_ID: &str = "grammar";
/// Strategy id of the pass-through normalizer.
pub const RAW_TEXT_STRATEGY_ID: &str = "raw";

/// Normalization failure surfaced by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Strict token mode rejected a malformed token.
    Format { text: String, source: FormatError },
    /// No strategy is selected in the registry.
    StrategyNotSelected,
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format { text, source } => {
                write!(f, "failed to normalize `{text}`: {source}")
            }
            Self::StrategyNotSelected => write!(f, "no normalization strategy selected"),
        }
    }
}

impl Error for NormalizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format { source, .. } => Some(source),
            Self::StrategyNotSelected => None,
        }
    }
}

/// Converts active-period text into atomic periods.
///
/// Implementations must be deterministic: identical arguments yield
/// identical, identically ordered output.
pub trait PeriodNormalizationStrategy: Send + Sync {
    /// Stable lowercase id (`[a-z0-9_-]+`).
    fn strategy_id(&self) -> &str;

    fn normalize(
        &self,
        text: &str,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, NormalizeError>;
}

/// Reference strategy backed by `PeriodNormalizer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarStrategy {
    normalizer: PeriodNormalizer,
}

impl GrammarStrategy {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            normalizer: PeriodNormalizer::new(options),
        }
    }
}

impl PeriodNormalizationStrategy for GrammarStrategy {
    fn strategy_id(&self) -> &str {
        GRAMMAR_STRATEGY_ID
    }

    fn normalize(
        &self,
        text: &str,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, NormalizeError> {
        self.normalizer
            .normalize(text, assumed_year)
            .map_err(|source| NormalizeError::Format {
                text: text.to_string(),
                source,
            })
    }
}

/// Degraded strategy: always emits the degenerate period.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTextStrategy;

impl PeriodNormalizationStrategy for RawTextStrategy {
    fn strategy_id(&self) -> &str {
        RAW_TEXT_STRATEGY_ID
    }

    fn normalize(
        &self,
        text: &str,
        _assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, NormalizeError> {
        Ok(vec![AtomicPeriod::degenerate(text)])
    }
}

/// Strategy registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyRegistryError {
    InvalidStrategyId(String),
    DuplicateStrategyId(String),
    StrategyNotFound(String),
}

impl Display for StrategyRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStrategyId(value) => write!(f, "strategy id is invalid: {value}"),
            Self::DuplicateStrategyId(value) => {
                write!(f, "strategy id already registered: {value}")
            }
            Self::StrategyNotFound(value) => write!(f, "strategy not found: {value}"),
        }
    }
}

impl Error for StrategyRegistryError {}

/// Runtime strategy registry with exactly one active strategy per run.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Arc<dyn PeriodNormalizationStrategy>>,
    active_strategy_id: Option<String>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in strategies with `grammar` selected.
    pub fn with_builtin(options: NormalizeOptions) -> Self {
        let mut strategies: BTreeMap<String, Arc<dyn PeriodNormalizationStrategy>> =
            BTreeMap::new();
        strategies.insert(
            GRAMMAR_STRATEGY_ID.to_string(),
            Arc::new(GrammarStrategy::new(options)),
        );
        strategies.insert(RAW_TEXT_STRATEGY_ID.to_string(), Arc::new(RawTextStrategy));
        Self {
            strategies,
            active_strategy_id: Some(GRAMMAR_STRATEGY_ID.to_string()),
        }
    }

    /// Registers one strategy.
    pub fn register(
        &mut self,
        strategy: Arc<dyn PeriodNormalizationStrategy>,
    ) -> Result<(), StrategyRegistryError> {
        let strategy_id = strategy.strategy_id().trim().to_string();
        if !is_valid_strategy_id(&strategy_id) {
            return Err(StrategyRegistryError::InvalidStrategyId(strategy_id));
        }
        if self.strategies.contains_key(strategy_id.as_str()) {
            return Err(StrategyRegistryError::DuplicateStrategyId(strategy_id));
        }

        self.strategies.insert(strategy_id, strategy);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Returns sorted strategy ids.
    pub fn strategy_ids(&self) -> Vec<String> {
        self.strategies.keys().cloned().collect()
    }

    /// Selects the strategy used for the rest of the run.
    pub fn select_active(&mut self, strategy_id: &str) -> Result<(), StrategyRegistryError> {
        let normalized = strategy_id.trim();
        if !self.strategies.contains_key(normalized) {
            return Err(StrategyRegistryError::StrategyNotFound(
                normalized.to_string(),
            ));
        }
        self.active_strategy_id = Some(normalized.to_string());
        Ok(())
    }

    pub fn active_strategy_id(&self) -> Option<&str> {
        self.active_strategy_id.as_deref()
    }

    pub fn get(&self, strategy_id: &str) -> Option<Arc<dyn PeriodNormalizationStrategy>> {
        self.strategies.get(strategy_id.trim()).cloned()
    }

    /// Returns the active strategy handle.
    pub fn active_strategy(
        &self,
    ) -> Result<Arc<dyn PeriodNormalizationStrategy>, NormalizeError> {
        self.active_strategy_id()
            .and_then(|id| self.get(id))
            .ok_or(NormalizeError::StrategyNotSelected)
    }
}

fn is_valid_strategy_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{
        NormalizeError, PeriodNormalizationStrategy, RawTextStrategy, StrategyRegistry,
        StrategyRegistryError, GRAMMAR_STRATEGY_ID, RAW_TEXT_STRATEGY_ID,
    };
    use crate::model::period::AtomicPeriod;
    use crate::period::normalizer::NormalizeOptions;
    use std::sync::Arc;

    struct FixedStrategy {
        strategy_id: String,
    }

    impl PeriodNormalizationStrategy for FixedStrategy {
        fn strategy_id(&self) -> &str {
            &self.strategy_id
        }

        fn normalize(
            &self,
            text: &str,
            _assumed_year: i32,
        ) -> Result<Vec<AtomicPeriod>, NormalizeError> {
            Ok(vec![AtomicPeriod::degenerate(format!("fixed:{text}"))])
        }
    }

    fn fixed(strategy_id: &str) -> Arc<dyn PeriodNormalizationStrategy> {
        Arc::new(FixedStrategy {
            strategy_id: strategy_id.to_string(),
        })
    }

    #[test]
    fn builtin_registry_selects_grammar() {
        let registry = StrategyRegistry::with_builtin(NormalizeOptions::default());
        assert_eq!(
            registry.strategy_ids(),
            vec![GRAMMAR_STRATEGY_ID.to_string(), RAW_TEXT_STRATEGY_ID.to_string()]
        );
        assert_eq!(registry.active_strategy_id(), Some(GRAMMAR_STRATEGY_ID));

        let strategy = registry.active_strategy().unwrap();
        let periods = strategy
            .normalize("Feb 25 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM", 2025)
            .unwrap();
        assert_eq!(periods.len(), 2);
    }

    #[test]
    fn register_rejects_invalid_and_duplicate_ids() {
        let mut registry = StrategyRegistry::new();
        registry.register(fixed("llm-assist")).unwrap();

        assert_eq!(
            registry.register(fixed("llm-assist")).unwrap_err(),
            StrategyRegistryError::DuplicateStrategyId("llm-assist".to_string())
        );
        assert_eq!(
            registry.register(fixed("Bad Id")).unwrap_err(),
            StrategyRegistryError::InvalidStrategyId("Bad Id".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn active_strategy_requires_selection() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.active_strategy(),
            Err(NormalizeError::StrategyNotSelected)
        ));

        registry.register(fixed("custom")).unwrap();
        assert_eq!(
            registry.select_active("missing").unwrap_err(),
            StrategyRegistryError::StrategyNotFound("missing".to_string())
        );
        registry.select_active(" custom ").unwrap();
        let periods = registry.active_strategy().unwrap().normalize("x", 2025).unwrap();
        assert_eq!(periods[0].raw_text(), Some("fixed:x"));
    }

    #[test]
    fn raw_text_strategy_never_parses() {
        let periods = RawTextStrategy
            .normalize("Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17", 2025)
            .unwrap();
        assert_eq!(
            periods,
            vec![AtomicPeriod::degenerate(
                "Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17"
            )]
        );
    }
}
