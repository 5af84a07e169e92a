//! Score, aggregate and order a batch of items.
//!
//! Every item gets its own task on a [`JoinSet`], and a semaphore caps how
//! many run at once. For each item the image is loaded once, every scorer
//! runs concurrently, and scorer failures are recorded as failed axes rather
//! than aborting the item. Pixel scorers move decoding and inference onto
//! tokio's blocking pool, so a slow backend never holds up the deadline.
//! A run always yields a [`RankingRun`]; misconfiguration is rejected when
//! the engine is built.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::join_all;
use photorank_core::{
    Axis, AxisRange, ImageData, RankedItem, ScoreAggregator, ScoreSet, ScoreableItem, Scorer,
    ScoringInput, WeightMap,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::{EngineConfigError, RankingConfig};
use crate::loader::{ImageLoader, StaticImageLoader};
use crate::outcome::{OmissionReason, OmittedItem, RankingRun};

/// Per-item result before ordering.
#[derive(Debug)]
enum ItemOutcome {
    Scored(ScoreSet),
    Omitted(OmissionReason),
}

/// Builder for [`RankingEngine`].
///
/// Without an explicit loader the engine uses [`StaticImageLoader`], which
/// only serves inline bytes.
#[derive(Default)]
pub struct RankingEngineBuilder {
    scorers: Vec<Arc<dyn Scorer>>,
    loader: Option<Arc<dyn ImageLoader>>,
    config: RankingConfig,
}

impl RankingEngineBuilder {
    /// Register one scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    /// Register several scorers, keeping their order.
    #[must_use]
    pub fn with_scorers(mut self, scorers: impl IntoIterator<Item = Arc<dyn Scorer>>) -> Self {
        self.scorers.extend(scorers);
        self
    }

    /// Use `loader` to fetch image bytes.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Replace the run configuration.
    #[must_use]
    pub fn with_config(mut self, config: RankingConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and build the engine.
    ///
    /// Declared axes missing from the weight map, and weighted axes drawn
    /// from scorers on different ranges, are logged as warnings. They do
    /// not fail the build.
    ///
    /// # Errors
    /// Returns [`EngineConfigError::NoScorers`] when no scorer was
    /// registered, or the error reported by [`RankingConfig::validate`].
    pub fn build(self) -> Result<RankingEngine, EngineConfigError> {
        if self.scorers.is_empty() {
            return Err(EngineConfigError::NoScorers);
        }
        self.config.validate()?;
        let aggregator =
            ScoreAggregator::new(self.config.weights.clone(), self.config.combine_mode);

        let gaps = unweighted_axes(&self.scorers, &self.config.weights);
        if !gaps.is_empty() {
            let names: Vec<&str> = gaps.iter().map(Axis::as_str).collect();
            log::warn!(
                "axes [{}] have no weight and will not affect the combined score",
                names.join(", ")
            );
        }
        let ranges = weighted_ranges(&self.scorers, &self.config.weights);
        if ranges.len() > 1 {
            log::warn!("weighted axes mix score ranges {ranges:?}; combined scores blend scales");
        }

        let needs_pixels = self.scorers.iter().any(|scorer| scorer.needs_image());
        let worker = ItemWorker {
            scorers: self.scorers,
            loader: self
                .loader
                .unwrap_or_else(|| Arc::new(StaticImageLoader::default())),
            needs_pixels,
        };
        Ok(RankingEngine {
            worker: Arc::new(worker),
            aggregator,
            config: self.config,
            unweighted_axes: gaps,
            mixes_ranges: ranges.len() > 1,
        })
    }
}

impl fmt::Debug for RankingEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingEngineBuilder")
            .field("scorers", &scorer_names(&self.scorers))
            .field("has_loader", &self.loader.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Declared axes with no entry in `weights`, in registration order.
fn unweighted_axes(scorers: &[Arc<dyn Scorer>], weights: &WeightMap) -> Vec<Axis> {
    let mut gaps: Vec<Axis> = Vec::new();
    for axis in scorers.iter().flat_map(|scorer| scorer.axes()) {
        if weights.get(axis.as_str()).is_none() && !gaps.contains(&axis) {
            gaps.push(axis);
        }
    }
    gaps
}

/// Distinct ranges of scorers with at least one weighted axis.
fn weighted_ranges(scorers: &[Arc<dyn Scorer>], weights: &WeightMap) -> Vec<AxisRange> {
    let mut ranges: Vec<AxisRange> = Vec::new();
    for scorer in scorers {
        let range = scorer.range();
        let weighted = scorer
            .axes()
            .iter()
            .any(|axis| weights.get(axis.as_str()).is_some());
        if weighted && !ranges.contains(&range) {
            ranges.push(range);
        }
    }
    ranges
}

fn scorer_names(scorers: &[Arc<dyn Scorer>]) -> Vec<String> {
    scorers
        .iter()
        .map(|scorer| scorer.name().to_owned())
        .collect()
}

/// Shared by every item task of a run.
struct ItemWorker {
    scorers: Vec<Arc<dyn Scorer>>,
    loader: Arc<dyn ImageLoader>,
    needs_pixels: bool,
}

impl ItemWorker {
    async fn load_image(&self, item: &ScoreableItem) -> Option<ImageData> {
        match self.loader.load(item.image()).await {
            Ok(image) => image.filter(|data| !data.is_empty()),
            Err(err) => {
                log::warn!("image load failed for item {}: {err}", item.id());
                None
            }
        }
    }

    /// Load, score and judge one item.
    ///
    /// Without usable image bytes the item is only scored when no registered
    /// scorer needs pixels. It is ranked when at least one axis holds a
    /// valid value or a scorer supplied an overall score.
    async fn score_item(&self, item: &ScoreableItem) -> ItemOutcome {
        let image = self.load_image(item).await;
        if image.is_none() && self.needs_pixels {
            return ItemOutcome::Omitted(OmissionReason::NoImage);
        }

        let scoring_input = ScoringInput::new(item, image.as_ref());
        let input = &scoring_input;
        let results = join_all(self.scorers.iter().map(|scorer| async move {
            (scorer, scorer.score(input).await)
        }))
        .await;

        let mut builder = ScoreSet::builder();
        for (scorer, result) in results {
            match result {
                Ok(fragment) => {
                    log::debug!("scorer {} rated item {}", scorer.name(), item.id());
                    builder.merge(fragment);
                }
                Err(err) => {
                    log::warn!(
                        "scorer {} failed for item {}: {err}",
                        scorer.name(),
                        item.id()
                    );
                    for axis in scorer.axes() {
                        builder.mark_failed(axis, scorer.range());
                    }
                }
            }
        }

        let scores = builder.build();
        if scores.has_valid_axis() || scores.overall().is_some() {
            ItemOutcome::Scored(scores)
        } else {
            log::debug!("no usable score for item {}", item.id());
            ItemOutcome::Omitted(OmissionReason::AllScorersFailed)
        }
    }
}

/// Ranks batches of items with a fixed set of scorers.
///
/// The engine holds no per-run state; one instance can serve many runs.
/// Items are scored on spawned tasks, so [`RankingEngine::rank`] must be
/// awaited inside a tokio runtime.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use photorank_core::test_support::{FixedScorer, item_without_image};
/// use photorank_core::{Axis, WeightMap};
/// use photorank_engine::{RankingConfig, RankingEngine};
///
/// let engine = RankingEngine::builder()
///     .with_scorer(Arc::new(FixedScorer::new(Axis::FAVORITE, 0.5).with_value("b", 0.9)))
///     .with_config(RankingConfig::default().with_weights(WeightMap::new([(Axis::FAVORITE, 1.0)])?))
///     .build()?;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
/// let run = runtime.block_on(engine.rank(vec![
///     item_without_image("a", false),
///     item_without_image("b", false),
/// ]));
/// assert_eq!(run.ranked_ids().collect::<Vec<_>>(), ["b", "a"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RankingEngine {
    worker: Arc<ItemWorker>,
    aggregator: ScoreAggregator,
    config: RankingConfig,
    unweighted_axes: Vec<Axis>,
    mixes_ranges: bool,
}

impl fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingEngine")
            .field("scorers", &scorer_names(&self.worker.scorers))
            .field("aggregator", &self.aggregator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// What an item task hands back: input position, outcome, completion time.
type TaskReport = (usize, ItemOutcome, Instant);

impl RankingEngine {
    /// Start building an engine.
    #[must_use]
    pub fn builder() -> RankingEngineBuilder {
        RankingEngineBuilder::default()
    }

    /// Run configuration.
    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Axes declared by registered scorers that the weight map leaves out.
    ///
    /// Pair the LLM scorer with `WeightMap::llm_defaults()` and the
    /// heuristic suite with `WeightMap::default()` to keep this empty.
    #[must_use]
    pub fn unweighted_axes(&self) -> &[Axis] {
        &self.unweighted_axes
    }

    /// Whether weighted axes come from scorers on different ranges.
    #[must_use]
    pub const fn mixes_axis_ranges(&self) -> bool {
        self.mixes_ranges
    }

    /// Rank `items`, bounded by the configured run timeout if any.
    ///
    /// A timeout too large for the clock is treated as no timeout.
    pub async fn rank(&self, items: Vec<ScoreableItem>) -> RankingRun {
        let deadline = self.config.timeout.and_then(|timeout| {
            let at = Instant::now().checked_add(timeout);
            if at.is_none() {
                log::debug!("run timeout {timeout:?} exceeds the clock range; no deadline applied");
            }
            at
        });
        self.rank_with_deadline(items, deadline).await
    }

    /// Rank `items`, reporting those unfinished at `deadline` as timed out.
    pub async fn rank_until(&self, items: Vec<ScoreableItem>, deadline: Instant) -> RankingRun {
        self.rank_with_deadline(items, Some(deadline)).await
    }

    async fn rank_with_deadline(
        &self,
        batch: Vec<ScoreableItem>,
        deadline: Option<Instant>,
    ) -> RankingRun {
        let items: Vec<Arc<ScoreableItem>> = batch.into_iter().map(Arc::new).collect();
        let mut outcomes: Vec<Option<ItemOutcome>> = items.iter().map(|_| None).collect();
        let slots = Arc::new(Semaphore::new(
            self.config.max_concurrency.min(Semaphore::MAX_PERMITS),
        ));

        let mut tasks: JoinSet<TaskReport> = JoinSet::new();
        for (index, item) in items.iter().enumerate() {
            let worker = Arc::clone(&self.worker);
            let permits = Arc::clone(&slots);
            let task_item = Arc::clone(item);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = AssertUnwindSafe(worker.score_item(&task_item))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        log::warn!("scoring panicked for item {}", task_item.id());
                        ItemOutcome::Omitted(OmissionReason::AllScorersFailed)
                    });
                (index, outcome, Instant::now())
            });
        }

        loop {
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next())
                    .await
                    .ok()
                {
                    Some(joined) => joined,
                    None => {
                        log::warn!(
                            "ranking deadline passed; aborting {} unfinished items",
                            tasks.len()
                        );
                        break;
                    }
                },
                None => tasks.join_next().await,
            };
            let Some(result) = joined else { break };
            match result {
                Ok((index, outcome, finished_at)) => {
                    if deadline.is_some_and(|at| finished_at > at) {
                        continue;
                    }
                    if let Some(slot) = outcomes.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Err(err) => log::warn!("item task did not complete: {err}"),
            }
        }
        tasks.abort_all();
        self.assemble(items, outcomes)
    }

    fn assemble(
        &self,
        items: Vec<Arc<ScoreableItem>>,
        outcomes: Vec<Option<ItemOutcome>>,
    ) -> RankingRun {
        let mut scored = Vec::with_capacity(items.len());
        let mut omitted = Vec::new();
        for (item, outcome) in items.into_iter().zip(outcomes) {
            match outcome {
                Some(ItemOutcome::Scored(scores)) => {
                    let combined = self.aggregator.combined(&scores);
                    scored.push((item, scores, combined));
                }
                Some(ItemOutcome::Omitted(reason)) => {
                    omitted.push(OmittedItem::new(item, reason));
                }
                None => omitted.push(OmittedItem::new(item, OmissionReason::TimedOut)),
            }
        }
        // Stable sort keeps input order for equal combined scores.
        scored.sort_by(|left, right| right.2.total_cmp(&left.2));
        let ranked: Vec<RankedItem> = scored
            .into_iter()
            .zip(1..)
            .map(|((item, scores, combined), rank)| RankedItem::new(item, scores, combined, rank))
            .collect();
        for entry in &omitted {
            log::warn!("omitted item {} ({})", entry.item_id(), entry.reason());
        }
        log::info!(
            "ranked {} items, omitted {}",
            ranked.len(),
            omitted.len()
        );
        RankingRun::new(ranked, omitted)
    }
}
