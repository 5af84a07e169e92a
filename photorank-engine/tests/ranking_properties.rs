//! Property tests for ordering guarantees of [`RankingEngine`].

use std::sync::Arc;

use photorank_core::test_support::{FixedScorer, item_without_image};
use photorank_core::{Axis, WeightMap};
use photorank_engine::{RankingConfig, RankingEngine};
use proptest::prelude::*;

#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn rank_values(values: &[f64], max_concurrency: usize) -> Vec<(String, f64, usize)> {
    let scorer = values
        .iter()
        .enumerate()
        .fold(FixedScorer::new(Axis::FAVORITE, 0.0), |scorer, (index, value)| {
            scorer.with_value(&format!("item-{index}"), *value)
        });
    let weights = WeightMap::new([(Axis::FAVORITE, 1.0)]).expect("weights");
    let engine = RankingEngine::builder()
        .with_scorer(Arc::new(scorer))
        .with_config(
            RankingConfig::default()
                .with_weights(weights)
                .with_max_concurrency(max_concurrency),
        )
        .build()
        .expect("engine");
    let items = (0..values.len())
        .map(|index| item_without_image(&format!("item-{index}"), false))
        .collect();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    runtime
        .block_on(engine.rank(items))
        .ranked()
        .iter()
        .map(|ranked| {
            (
                ranked.item_id().to_owned(),
                ranked.combined_score(),
                ranked.rank(),
            )
        })
        .collect()
}

#[expect(clippy::expect_used, reason = "ids are generated by the test")]
fn input_index(id: &str) -> usize {
    id.trim_start_matches("item-").parse().expect("generated id")
}

proptest! {
    #[test]
    fn every_item_is_ranked_once_in_descending_order(
        values in prop::collection::vec(prop::sample::select(vec![0.0, 0.25, 0.5, 1.0]), 0..24),
        max_concurrency in 1_usize..6,
    ) {
        let ranked = rank_values(&values, max_concurrency);
        prop_assert_eq!(ranked.len(), values.len());
        for (position, (_, _, rank)) in ranked.iter().enumerate() {
            prop_assert_eq!(*rank, position + 1);
        }
        for pair in ranked.windows(2) {
            let [(left_id, left, _), (right_id, right, _)] = pair else {
                continue;
            };
            prop_assert!(left >= right);
            if left == right {
                prop_assert!(input_index(left_id) < input_index(right_id));
            }
        }
    }
}
