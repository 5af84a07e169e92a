//! Rubric and request assembly for the multimodal rating call.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use photorank_core::{ImageData, ScoreableItem};

use crate::LlmScorerConfig;
use crate::wire::{ChatMessage, ChatRequest, ContentPart, ImageUrl};

/// Mime type assumed when neither the loader nor the item reports one.
pub const FALLBACK_MIME: &str = "image/jpeg";

/// System rubric describing every axis the model must rate.
pub const RATING_RUBRIC: &str = r#"You curate photos for a personal highlights feed.
Rate the attached image and its metadata on each axis below using a number from 0 (poor) to 10 (excellent).

technical: focus, exposure, noise, dynamic range and resolution.
aesthetic: composition, colour harmony, visual flow and overall polish.
semantic: meaning, emotional impact, storytelling and how clearly it reads.
novelty: originality of subject, angle or execution compared with typical photos.
trendy_vibe: how well it would perform on social platforms today.
metadata: usefulness of the capture context, such as how recent it is and how complete its data are.
activity: clarity and energy of a visible action. Use 0 when nothing is happening.
achievement: a visible milestone, win or celebration. Use 0 when none is shown.
talent: a demonstrated skill or craft. Use 0 when none is shown.
overall: your weighted judgement across all axes.

Reply with one JSON object and nothing else, for example:
{"technical": 7.5, "aesthetic": 8.0, "semantic": 6.0, "novelty": 5.5, "trendy_vibe": 6.5, "metadata": 4.0, "activity": 0, "achievement": 0, "talent": 0, "overall": 6.4}"#;

/// Extra instruction appended when a previous reply could not be parsed.
pub const STRICT_SUFFIX: &str = "\n\nYour previous reply could not be parsed. Respond with a single JSON object containing only numeric values. Do not add prose, markdown or code fences.";

/// Encode image bytes as a `data:` URI.
///
/// # Examples
///
/// ```rust
/// use photorank_core::ImageData;
/// use photorank_llm::data_uri;
///
/// let image = ImageData::new(vec![0xFF, 0xD8], Some("image/jpeg".to_owned()));
/// assert_eq!(data_uri(&image, None), "data:image/jpeg;base64,/9g=");
/// ```
#[must_use]
pub fn data_uri(image: &ImageData, fallback_mime: Option<&str>) -> String {
    let mime = image
        .mime_type()
        .or(fallback_mime)
        .unwrap_or(FALLBACK_MIME);
    format!("data:{mime};base64,{}", STANDARD.encode(image.bytes()))
}

/// Build the rating request for one item.
///
/// `strict` appends [`STRICT_SUFFIX`] to the rubric for the re-prompt after
/// an unparseable reply.
#[must_use]
pub fn build_request(
    config: &LlmScorerConfig,
    item: &ScoreableItem,
    image_uri: String,
    strict: bool,
) -> ChatRequest {
    let mut rubric = RATING_RUBRIC.to_owned();
    if strict {
        rubric.push_str(STRICT_SUFFIX);
    }
    ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::System { content: rubric },
            ChatMessage::User {
                content: vec![
                    ContentPart::Text {
                        text: describe(item),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_uri },
                    },
                ],
            },
        ],
        max_tokens: config.max_tokens,
    }
}

fn describe(item: &ScoreableItem) -> String {
    let metadata = item.metadata();
    let description = metadata.description.as_deref().unwrap_or_default();
    let metadata_json = serde_json::to_string(metadata).unwrap_or_else(|err| {
        log::warn!("could not serialise metadata for {}: {err}", item.id());
        String::from("{}")
    });
    format!("Image description:\n{description}\n\nImage metadata:\n{metadata_json}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use photorank_core::{ImageRef, ItemMetadata};
    use rstest::{fixture, rstest};

    #[fixture]
    fn item() -> ScoreableItem {
        ScoreableItem::new("p1", ImageRef::None)
            .expect("item")
            .with_metadata(ItemMetadata {
                description: Some("Summit at dawn".to_owned()),
                filename: Some("IMG_0001.jpg".to_owned()),
                ..ItemMetadata::default()
            })
    }

    #[rstest]
    fn rubric_names_every_llm_axis() {
        for axis in photorank_core::Axis::LLM_VOCABULARY {
            assert!(
                RATING_RUBRIC.contains(&format!("{axis}:")),
                "rubric should describe {axis}"
            );
        }
        assert!(RATING_RUBRIC.contains("overall:"));
    }

    #[rstest]
    fn request_carries_description_metadata_and_image(item: ScoreableItem) {
        let config = LlmScorerConfig::new("k");
        let request = build_request(&config, &item, "data:image/jpeg;base64,AA==".to_owned(), false);
        let text = request.user_text();
        assert!(text.contains("Summit at dawn"));
        assert!(text.contains("IMG_0001.jpg"));
        assert_eq!(request.model, config.model);
        assert_eq!(request.max_tokens, config.max_tokens);
        assert_eq!(request.system_prompt(), Some(RATING_RUBRIC));
    }

    #[rstest]
    fn strict_request_appends_instruction(item: ScoreableItem) {
        let request = build_request(&LlmScorerConfig::new("k"), &item, String::new(), true);
        let prompt = request.system_prompt().expect("system prompt");
        assert!(prompt.starts_with(RATING_RUBRIC));
        assert!(prompt.ends_with(STRICT_SUFFIX));
    }

    #[rstest]
    #[case(None, None, "data:image/jpeg;base64,AQI=")]
    #[case(None, Some("image/png"), "data:image/png;base64,AQI=")]
    #[case(Some("image/webp"), Some("image/png"), "data:image/webp;base64,AQI=")]
    fn data_uri_prefers_loaded_mime(
        #[case] loaded: Option<&str>,
        #[case] fallback: Option<&str>,
        #[case] expected: &str,
    ) {
        let image = ImageData::new(vec![1, 2], loaded.map(str::to_owned));
        assert_eq!(data_uri(&image, fallback), expected);
    }
}
