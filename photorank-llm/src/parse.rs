//! Permissive parsing of model replies into axis scores.
//!
//! Models often wrap the requested JSON in prose or code fences. Parsing
//! first tries the whole reply, then the outermost brace-delimited span.

use photorank_core::{Axis, AxisRange, AxisScore, ScoreFragment};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key holding the model's overall rating.
pub const OVERALL_KEY: &str = "overall";

/// Why a reply could not be turned into ratings.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    /// The reply contains no `{ ... }` span.
    #[error("reply contains no JSON object")]
    NoJsonObject,
    /// The brace-delimited span is not valid JSON.
    #[error("reply contains an invalid JSON object")]
    InvalidJson {
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The object holds no usable rating for any requested axis nor an
    /// overall rating.
    #[error("reply rates none of the requested axes")]
    NoRatings,
}

/// Extract the JSON object from a model reply.
///
/// # Errors
/// Returns [`ResponseParseError::NoJsonObject`] when no braces are found
/// and [`ResponseParseError::InvalidJson`] when the braced span does not
/// parse.
///
/// # Examples
///
/// ```rust
/// use photorank_llm::parse_ratings;
///
/// let ratings = parse_ratings("Sure! {\"technical\": 5, \"overall\": 5} Hope that helps").unwrap();
/// assert_eq!(ratings["technical"], 5);
/// ```
pub fn parse_ratings(reply: &str) -> Result<Map<String, Value>, ResponseParseError> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(reply.trim()) {
        return Ok(map);
    }
    let span = reply
        .find('{')
        .zip(reply.rfind('}'))
        .and_then(|(start, end)| reply.get(start..=end))
        .ok_or(ResponseParseError::NoJsonObject)?;
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ResponseParseError::NoJsonObject),
        Err(source) => Err(ResponseParseError::InvalidJson { source }),
    }
}

/// Numeric value of a rating, accepting numeric strings.
fn rating_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Turn parsed ratings into a fragment over `axes`.
///
/// Values are clamped to `[0, 10]`. Declared axes that are absent or
/// non-numeric are recorded as failed. A usable `overall` becomes the
/// fragment's provider overall.
#[must_use]
pub fn ratings_fragment(ratings: &Map<String, Value>, axes: &[Axis]) -> ScoreFragment {
    let fragment = axes.iter().fold(ScoreFragment::new(), |fragment, axis| {
        let score = ratings
            .get(axis.as_str())
            .and_then(rating_value)
            .map_or(AxisScore::failed(AxisRange::DECILE), |value| {
                AxisScore::new(value, AxisRange::DECILE)
            });
        if !score.is_valid() {
            log::debug!("model reply has no usable {axis} rating");
        }
        fragment.with_axis(axis.clone(), score)
    });
    match ratings.get(OVERALL_KEY).and_then(rating_value) {
        Some(overall) => fragment.with_overall(AxisRange::DECILE.clamp(overall)),
        None => fragment,
    }
}

/// Like [`ratings_fragment`], but reject replies that rate nothing.
///
/// # Errors
/// Returns [`ResponseParseError::NoRatings`] when no requested axis holds a
/// usable value and no overall rating is present, as with `{}`.
pub fn rated_fragment(
    ratings: &Map<String, Value>,
    axes: &[Axis],
) -> Result<ScoreFragment, ResponseParseError> {
    let fragment = ratings_fragment(ratings, axes);
    let rated = fragment.overall().is_some()
        || fragment.axes().iter().any(|(_, score)| score.is_valid());
    if rated {
        Ok(fragment)
    } else {
        Err(ResponseParseError::NoRatings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("{\"technical\": 5, \"overall\": 5}")]
    #[case("prefix noise {\"technical\":5,\"overall\":5} trailing")]
    #[case("```json\n{\"technical\": 5, \"overall\": 5}\n```")]
    fn extracts_object_from_noise(#[case] reply: &str) {
        let ratings = parse_ratings(reply).expect("ratings");
        assert_eq!(ratings.get("technical").and_then(Value::as_f64), Some(5.0));
        assert_eq!(ratings.get("overall").and_then(Value::as_f64), Some(5.0));
    }

    #[rstest]
    #[case("no json here")]
    #[case("} backwards {")]
    #[case("")]
    fn missing_object_is_named(#[case] reply: &str) {
        assert!(matches!(
            parse_ratings(reply),
            Err(ResponseParseError::NoJsonObject)
        ));
    }

    #[rstest]
    fn broken_object_is_invalid_json() {
        assert!(matches!(
            parse_ratings("rating: {technical: five}"),
            Err(ResponseParseError::InvalidJson { .. })
        ));
    }

    #[rstest]
    fn fragment_clamps_and_marks_missing_axes() {
        let ratings = parse_ratings(
            r#"{"technical": 12, "aesthetic": "7.5", "semantic": "great", "overall": -3}"#,
        )
        .expect("ratings");
        let axes = [Axis::TECHNICAL, Axis::AESTHETIC, Axis::SEMANTIC, Axis::NOVELTY];
        let fragment = ratings_fragment(&ratings, &axes);
        let scores: Vec<(String, f64, bool)> = fragment
            .axes()
            .iter()
            .map(|(axis, score)| (axis.to_string(), score.value(), score.is_valid()))
            .collect();
        assert_eq!(
            scores,
            vec![
                ("technical".to_owned(), 10.0, true),
                ("aesthetic".to_owned(), 7.5, true),
                ("semantic".to_owned(), 0.0, false),
                ("novelty".to_owned(), 0.0, false),
            ]
        );
        assert_eq!(fragment.overall(), Some(0.0));
    }

    #[rstest]
    #[case("{}")]
    #[case(r#"{"foo": 1}"#)]
    #[case(r#"{"technical": "n/a", "overall": null}"#)]
    fn replies_without_ratings_are_rejected(#[case] reply: &str) {
        let ratings = parse_ratings(reply).expect("object");
        assert!(matches!(
            rated_fragment(&ratings, &[Axis::TECHNICAL, Axis::AESTHETIC]),
            Err(ResponseParseError::NoRatings)
        ));
    }

    #[rstest]
    #[case(r#"{"aesthetic": 6}"#)]
    #[case(r#"{"overall": 4}"#)]
    fn one_rating_is_enough(#[case] reply: &str) {
        let ratings = parse_ratings(reply).expect("object");
        assert!(rated_fragment(&ratings, &[Axis::TECHNICAL, Axis::AESTHETIC]).is_ok());
    }

    proptest! {
        #[test]
        fn object_survives_arbitrary_wrapping(
            prefix in "[^{}]{0,20}",
            suffix in "[^{}]{0,20}",
            value in 0.0_f64..10.0_f64,
        ) {
            let reply = format!("{prefix}{{\"overall\": {value}}}{suffix}");
            let ratings = parse_ratings(&reply).expect("ratings");
            let parsed = ratings.get("overall").and_then(Value::as_f64).expect("overall");
            prop_assert!((parsed - value).abs() < 1e-9);
        }
    }
}
