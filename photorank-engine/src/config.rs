//! Run-level settings for [`crate::RankingEngine`].

use std::time::Duration;

use photorank_core::{CombineMode, WeightError, WeightMap};
use serde::Deserialize;
use thiserror::Error;

/// Items scored concurrently when not configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Invalid engine configuration.
#[derive(Debug, Error)]
pub enum EngineConfigError {
    /// The worker pool would have no slots.
    #[error("max_concurrency must be greater than zero")]
    ZeroConcurrency,
    /// The run deadline is zero.
    #[error("run timeout must be greater than zero")]
    ZeroTimeout,
    /// No scorer was registered.
    #[error("at least one scorer must be registered")]
    NoScorers,
    /// Weight overrides were rejected.
    #[error("invalid weights")]
    Weights {
        /// Validation failure.
        #[source]
        source: WeightError,
    },
}

impl From<WeightError> for EngineConfigError {
    fn from(source: WeightError) -> Self {
        Self::Weights { source }
    }
}

/// Settings for one ranking engine.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use photorank_core::CombineMode;
/// use photorank_engine::RankingConfig;
///
/// let config = RankingConfig::default()
///     .with_max_concurrency(4)
///     .with_timeout(Duration::from_secs(120))
///     .with_combine_mode(CombineMode::ProviderOverall);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Items scored at the same time.
    pub max_concurrency: usize,
    /// Deadline for a whole run, measured from its start.
    pub timeout: Option<Duration>,
    /// Axis weights for aggregation.
    pub weights: WeightMap,
    /// How combined scores are derived.
    pub combine_mode: CombineMode,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
            weights: WeightMap::default(),
            combine_mode: CombineMode::default(),
        }
    }
}

impl RankingConfig {
    /// Set the worker pool size.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Bound each run by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the weight map.
    #[must_use]
    pub fn with_weights(mut self, weights: WeightMap) -> Self {
        self.weights = weights;
        self
    }

    /// Apply per-axis overrides on top of the current weights.
    ///
    /// # Errors
    /// Returns [`EngineConfigError::Weights`] when the merged map is
    /// invalid.
    pub fn with_weight_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (photorank_core::Axis, f64)>,
    ) -> Result<Self, EngineConfigError> {
        self.weights = self.weights.overridden(overrides)?;
        Ok(self)
    }

    /// Set the combine mode.
    #[must_use]
    pub const fn with_combine_mode(mut self, combine_mode: CombineMode) -> Self {
        self.combine_mode = combine_mode;
        self
    }

    /// Check the settings can drive a run.
    ///
    /// # Errors
    /// Returns [`EngineConfigError`] for a zero pool size or zero timeout.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.max_concurrency == 0 {
            return Err(EngineConfigError::ZeroConcurrency);
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(EngineConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photorank_core::Axis;
    use rstest::rstest;

    #[rstest]
    fn zero_concurrency_is_rejected() {
        let config = RankingConfig::default().with_max_concurrency(0);
        assert!(matches!(
            config.validate(),
            Err(EngineConfigError::ZeroConcurrency)
        ));
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        let config = RankingConfig::default().with_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(EngineConfigError::ZeroTimeout)));
    }

    #[rstest]
    fn overrides_keep_other_defaults() {
        let config = RankingConfig::default()
            .with_weight_overrides([(Axis::FAVORITE, 0.5)])
            .expect("valid overrides");
        assert_eq!(config.weights.get("favorite"), Some(0.5));
        assert_eq!(config.weights.get("aesthetic"), Some(0.25));
    }

    #[rstest]
    fn negative_override_is_rejected() {
        let result = RankingConfig::default().with_weight_overrides([(Axis::FAVORITE, -1.0)]);
        assert!(matches!(result, Err(EngineConfigError::Weights { .. })));
    }

    #[rstest]
    fn config_deserialises_from_partial_json() {
        let config: RankingConfig = serde_json::from_str(
            r#"{"max_concurrency": 2, "combine_mode": "provider_overall", "weights": {"favorite": 1.0}}"#,
        )
        .expect("parse config");
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.combine_mode, CombineMode::ProviderOverall);
        assert_eq!(config.weights.len(), 1);
        assert_eq!(config.timeout, None);
    }
}
