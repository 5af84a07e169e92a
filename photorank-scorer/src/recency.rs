//! Linear recency decay over whole elapsed days.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photorank_core::{Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput};

/// Days after which a photo no longer earns recency credit.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Source of the reference time for recency scoring.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Scores the `recency` axis from the item's creation time.
///
/// The score is `max(0, 1 - days / window)` where `days` counts whole
/// elapsed days. Missing timestamps score `0.0`; future timestamps score
/// `1.0`. Needs no image data.
#[derive(Clone)]
pub struct RecencyScorer {
    clock: Arc<dyn Clock>,
    window_days: u32,
}

impl std::fmt::Debug for RecencyScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyScorer")
            .field("now", &self.clock.now())
            .field("window_days", &self.window_days)
            .finish()
    }
}

impl Default for RecencyScorer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RecencyScorer {
    /// Score against the given clock with the default window.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Replace the decay window. A zero window is treated as one day.
    #[must_use]
    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days.max(1);
        self
    }

    /// Recency of `created` relative to `now`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{Duration, TimeZone, Utc};
    /// use photorank_scorer::{FixedClock, RecencyScorer};
    /// use std::sync::Arc;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    /// let scorer = RecencyScorer::new(Arc::new(FixedClock(now)));
    /// assert_eq!(scorer.recency(Some(now)), 1.0);
    /// assert_eq!(scorer.recency(Some(now - Duration::days(15))), 0.5);
    /// assert_eq!(scorer.recency(None), 0.0);
    /// ```
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "linear decay over elapsed days"
    )]
    #[must_use]
    pub fn recency(&self, created: Option<DateTime<Utc>>) -> f64 {
        let Some(created) = created else {
            return 0.0;
        };
        let days = self.clock.now().signed_duration_since(created).num_days();
        (1.0 - days as f64 / f64::from(self.window_days)).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl Scorer for RecencyScorer {
    fn name(&self) -> &str {
        "recency"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::RECENCY]
    }

    fn needs_image(&self) -> bool {
        false
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let value = self.recency(input.item().metadata().creation_time);
        Ok(ScoreFragment::single(Axis::RECENCY, AxisScore::unit(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn scorer(now: DateTime<Utc>) -> RecencyScorer {
        RecencyScorer::new(Arc::new(FixedClock(now)))
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(30, 0.0)]
    #[case(60, 0.0)]
    fn whole_day_boundaries(
        now: DateTime<Utc>,
        scorer: RecencyScorer,
        #[case] days: i64,
        #[case] expected: f64,
    ) {
        assert_eq!(scorer.recency(Some(now - Duration::days(days))), expected);
    }

    #[rstest]
    fn partial_days_are_truncated(now: DateTime<Utc>, scorer: RecencyScorer) {
        let created = now - Duration::hours(23);
        assert_eq!(scorer.recency(Some(created)), 1.0);
    }

    #[rstest]
    fn future_timestamps_clamp_to_one(now: DateTime<Utc>, scorer: RecencyScorer) {
        assert_eq!(scorer.recency(Some(now + Duration::days(3))), 1.0);
    }

    #[rstest]
    fn missing_timestamp_scores_zero(scorer: RecencyScorer) {
        assert_eq!(scorer.recency(None), 0.0);
    }

    #[rstest]
    fn custom_window_changes_decay(now: DateTime<Utc>) {
        let scorer = RecencyScorer::new(Arc::new(FixedClock(now))).with_window_days(10);
        assert_eq!(scorer.recency(Some(now - Duration::days(5))), 0.5);
    }

    #[rstest]
    fn recency_runs_without_image(scorer: RecencyScorer) {
        assert!(!scorer.needs_image());
    }
}
