//! Favourite flag as a binary axis.

use async_trait::async_trait;
use photorank_core::{Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput};

/// Scores the `favorite` axis: `1.0` for favourites, `0.0` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct FavoriteScorer;

#[async_trait]
impl Scorer for FavoriteScorer {
    fn name(&self) -> &str {
        "favorite"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::FAVORITE]
    }

    fn needs_image(&self) -> bool {
        false
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let value = if input.item().metadata().is_favorite {
            1.0
        } else {
            0.0
        };
        Ok(ScoreFragment::single(Axis::FAVORITE, AxisScore::unit(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photorank_core::test_support::item_without_image;
    use rstest::rstest;

    #[rstest]
    #[case(true, 1.0)]
    #[case(false, 0.0)]
    fn flag_maps_to_binary_score(#[case] is_favorite: bool, #[case] expected: f64) {
        let item = item_without_image("f", is_favorite);
        let fragment = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(FavoriteScorer.score(&ScoringInput::new(&item, None)))
            .expect("favorite never fails");
        assert_eq!(fragment.axes().first().expect("axis").1.value(), expected);
    }
}
