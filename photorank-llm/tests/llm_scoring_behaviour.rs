//! Behavioural coverage for [`LlmScorer`] through a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use photorank_core::{
    ImageData, ImageRef, ScoreSet, ScoreableItem, Scorer, ScorerError, ScoringInput,
};
use photorank_llm::{
    ChatRequest, ChatTransport, LlmScorer, LlmScorerConfig, LlmTransportError, RetryPolicy,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Replays canned replies and counts requests.
#[derive(Debug, Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, LlmTransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<String, LlmTransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<String, LlmTransportError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(LlmTransportError::EmptyReply))
    }
}

/// World state for LLM scoring scenarios.
#[derive(Default)]
struct LlmWorld {
    transport: RefCell<Option<Arc<ScriptedTransport>>>,
    outcome: RefCell<Option<Result<ScoreSet, ScorerError>>>,
}

#[fixture]
fn world() -> LlmWorld {
    LlmWorld::default()
}

fn script(world: &LlmWorld, replies: Vec<Result<String, LlmTransportError>>) {
    world
        .transport
        .replace(Some(Arc::new(ScriptedTransport::new(replies))));
}

#[given("a model that wraps its rating in prose")]
fn prose_wrapped_reply(world: &LlmWorld) {
    script(
        world,
        vec![Ok(
            "prefix noise {\"technical\":5,\"overall\":5} trailing".to_owned()
        )],
    );
}

#[given("a provider that is rate limited once before answering")]
fn rate_limited_once(world: &LlmWorld) {
    script(
        world,
        vec![
            Err(LlmTransportError::Http {
                url: "https://example.invalid/v2/chat".to_owned(),
                status: 429,
                message: "too many requests".to_owned(),
            }),
            Ok(r#"{"technical": 8, "overall": 7}"#.to_owned()),
        ],
    );
}

#[given("a model that never replies with JSON")]
fn never_json(world: &LlmWorld) {
    script(
        world,
        vec![
            Ok("What a lovely sunset!".to_owned()),
            Ok("Honestly, a solid eight.".to_owned()),
        ],
    );
}

#[when("the LLM scorer rates a photo")]
#[expect(clippy::expect_used, reason = "scenario setup should fail fast")]
fn rate_photo(world: &LlmWorld) {
    let transport = world
        .transport
        .borrow()
        .clone()
        .expect("transport must be scripted");
    let config = LlmScorerConfig::new("test-key")
        .with_min_request_interval(Duration::ZERO)
        .with_retry(RetryPolicy::new(3, Duration::ZERO, Duration::ZERO));
    let scorer = LlmScorer::with_transport(config, transport).expect("valid config");
    let item = ScoreableItem::new("sunset", ImageRef::Url("https://photos.invalid/a".to_owned()))
        .expect("valid id");
    let image = ImageData::new(vec![0xFF, 0xD8, 0xFF], Some("image/jpeg".to_owned()));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    let outcome = runtime
        .block_on(scorer.score(&ScoringInput::new(&item, Some(&image))))
        .map(|fragment| ScoreSet::builder().merge(fragment).build());
    world.outcome.replace(Some(outcome));
}

fn scores(world: &LlmWorld) -> ScoreSet {
    match world.outcome.borrow().as_ref() {
        Some(Ok(scores)) => scores.clone(),
        Some(Err(err)) => panic!("scoring should succeed, got {err}"),
        None => panic!("scoring outcome must be recorded"),
    }
}

#[then("the technical rating is {value}")]
fn technical_rating(world: &LlmWorld, value: f64) {
    let technical = scores(world).get("technical").map(|score| score.value());
    assert_eq!(technical, Some(value));
}

#[then("the provider overall is {value}")]
fn provider_overall(world: &LlmWorld, value: f64) {
    assert_eq!(scores(world).overall(), Some(value));
}

#[then("{count} axes are recorded as failed")]
fn failed_axes(world: &LlmWorld, count: usize) {
    assert_eq!(scores(world).failed_axes().count(), count);
}

#[then("the provider received {count} requests")]
fn provider_requests(world: &LlmWorld, count: usize) {
    let calls = world
        .transport
        .borrow()
        .as_ref()
        .map_or(0, |transport| transport.calls.load(Ordering::Relaxed));
    assert_eq!(calls, count);
}

#[then("the photo is reported as malformed")]
fn reported_malformed(world: &LlmWorld) {
    let outcome = world.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Err(ScorerError::MalformedResponse { .. }))),
        "expected a malformed response error, got {outcome:?}"
    );
}

#[scenario(path = "tests/features/llm_scoring.feature", index = 0)]
fn prose_wrapped_rating(world: LlmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/llm_scoring.feature", index = 1)]
fn rate_limited_provider(world: LlmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/llm_scoring.feature", index = 2)]
fn never_json_reply(world: LlmWorld) {
    let _ = world;
}
