//! Behavioural coverage for the heuristic scorer suite.

use std::cell::RefCell;
use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photorank_core::{
    Axis, ImageData, ImageRef, ItemMetadata, ScoreSet, ScoreableItem, ScoringInput,
};
use photorank_scorer::{FixedClock, ScorerFactory};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// World state shared by heuristic scoring scenarios.
#[derive(Debug, Default)]
struct ScoringWorld {
    metadata: RefCell<ItemMetadata>,
    scores: RefCell<Option<ScoreSet>>,
}

#[fixture]
fn world() -> ScoringWorld {
    ScoringWorld::default()
}

#[expect(clippy::expect_used, reason = "fixed timestamps are valid")]
fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[expect(clippy::expect_used, reason = "encoding an in-memory image cannot fail")]
fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
        if (x + y) % 3 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([40, 60, 80])
        }
    }))
    .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
    .expect("encode png");
    bytes
}

#[given("a photo marked as favourite")]
fn favourite_photo(world: &ScoringWorld) {
    world.metadata.borrow_mut().is_favorite = true;
}

#[given("a photo created {days} days ago")]
fn photo_created_days_ago(world: &ScoringWorld, days: i64) {
    world.metadata.borrow_mut().creation_time = Some(reference_time() - Duration::days(days));
}

#[when("the heuristic suite scores the photo")]
#[expect(clippy::expect_used, reason = "scenario setup should fail fast")]
fn suite_scores_photo(world: &ScoringWorld) {
    let bytes = png_bytes();
    let item = ScoreableItem::new("photo-1", ImageRef::Bytes(bytes.clone()))
        .expect("valid id")
        .with_metadata(world.metadata.borrow().clone());
    let image = ImageData::new(bytes, Some("image/png".to_owned()));
    let suite = ScorerFactory::default()
        .with_clock(Arc::new(FixedClock(reference_time())))
        .heuristic_suite();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let input = ScoringInput::new(&item, Some(&image));
    let mut builder = ScoreSet::builder();
    for scorer in &suite {
        match runtime.block_on(scorer.score(&input)) {
            Ok(fragment) => {
                builder.merge(fragment);
            }
            Err(_) => {
                for axis in scorer.axes() {
                    builder.mark_failed(axis, scorer.range());
                }
            }
        }
    }
    world.scores.replace(Some(builder.build()));
}

#[then("the {axis} axis is {value}")]
#[expect(clippy::float_arithmetic, reason = "assertions compare floating-point scores")]
fn axis_has_value(world: &ScoringWorld, axis: String, value: f64) {
    let binding = world.scores.borrow();
    let scores = binding
        .as_ref()
        .unwrap_or_else(|| panic!("scores must be recorded"));
    let Some(score) = scores.get(&axis) else {
        panic!("axis {axis} missing from {scores:?}");
    };
    assert!(
        (score.value() - value).abs() < 1e-9,
        "expected {axis} = {value}, got {}",
        score.value()
    );
}

#[then("every heuristic axis is valid")]
fn every_axis_valid(world: &ScoringWorld) {
    let binding = world.scores.borrow();
    let scores = binding
        .as_ref()
        .unwrap_or_else(|| panic!("scores must be recorded"));
    for axis in Axis::HEURISTIC_VOCABULARY {
        let valid = scores.get(axis.as_str()).is_some_and(|score| score.is_valid());
        assert!(valid, "axis {axis} should be valid");
    }
}

#[scenario(path = "tests/features/heuristic_scoring.feature", index = 0)]
fn favourite_scores_one(world: ScoringWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/heuristic_scoring.feature", index = 1)]
fn recency_decays_to_zero(world: ScoringWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/heuristic_scoring.feature", index = 2)]
fn recency_is_full_today(world: ScoringWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/heuristic_scoring.feature", index = 3)]
fn missing_backends_score_zero(world: ScoringWorld) {
    let _ = world;
}
