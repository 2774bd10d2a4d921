//! Adapter for Aliyun OCR responses.

use crate::{error::OcrError, prelude::*, schema::Backend, schema::TextLine};

use super::{confidence_of, points_of, text_of};

/// Arrays the Aliyun API nests its recognized elements under, depending on
/// which API variant was invoked.
const CANDIDATE_KEYS: &[&str] = &["Results", "PrismWordsInfo", "Lines", "Blocks"];

/// Keys the recognized text may appear under.
const TEXT_KEYS: &[&str] = &["Text", "Word", "Content", "text"];

/// Keys the confidence score may appear under. Aliyun reports percentages,
/// which get rescaled into [0.0, 1.0].
const CONFIDENCE_KEYS: &[&str] = &["Score", "Confidence", "Prob"];

/// Keys the text-region polygon may appear under.
const POLYGON_KEYS: &[&str] = &["Polygon", "Quad", "Points"];

/// Convert a raw Aliyun OCR response into canonical text lines.
///
/// `alltext_type` is the `RecognizeAllText` type the request was made with,
/// or `None` for `RecognizeAdvanced`; the two variants nest their elements
/// under different keys, all of which are covered by [`CANDIDATE_KEYS`].
pub fn adapt_aliyun(
    raw: &Value,
    alltext_type: Option<&str>,
) -> Result<Vec<TextLine>, OcrError> {
    let variant = alltext_type.unwrap_or("advanced");
    let body = raw.get("body").ok_or_else(|| OcrError::MalformedResponse {
        backend: Backend::Aliyun,
        detail: format!("missing `body` object in {variant} response"),
    })?;

    // `RecognizeAdvanced` wraps its payload in a `Data` object; some variants
    // put the arrays directly in the body.
    let data = match body.get("Data") {
        Some(data) if data.is_object() => data,
        _ => body,
    };

    let mut lines = Vec::new();
    let mut found_container = false;
    let mut index = 0;
    for key in CANDIDATE_KEYS {
        let Some(items) = data.get(*key).and_then(Value::as_array) else {
            continue;
        };
        found_container = true;
        for item in items.iter().filter(|item| item.is_object()) {
            let Some(text) = text_of(item, TEXT_KEYS) else {
                index += 1;
                continue;
            };
            let bounding_box = POLYGON_KEYS
                .iter()
                .find_map(|key| item.get(*key).and_then(points_of));
            lines.push(TextLine {
                text,
                confidence: confidence_of(item, CONFIDENCE_KEYS),
                bounding_box,
                line_index: index,
            });
            index += 1;
        }
    }
    if !found_container {
        return Err(OcrError::MalformedResponse {
            backend: Backend::Aliyun,
            detail: format!(
                "no recognized-text array ({}) in {variant} response",
                CANDIDATE_KEYS.join(", ")
            ),
        });
    }
    Ok(lines)
}
