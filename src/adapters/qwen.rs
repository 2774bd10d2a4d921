//! Adapter for DashScope Qwen OCR responses.
//!
//! The response shape varies by task: document and general mode return a
//! flat line list with coordinates, while table mode nests cell text inside
//! row structures and reports no coordinates or confidences.

use crate::{
    error::OcrError,
    prelude::*,
    schema::{Backend, QwenTask, TextLine},
};

use super::{confidence_of, corners_of_rect, points_of, text_of};

/// Keys the recognized text may appear under.
const TEXT_KEYS: &[&str] = &["text", "content", "value"];

/// Keys a per-line confidence may appear under. The model doesn't always
/// report one; absence becomes `confidence: None`.
const CONFIDENCE_KEYS: &[&str] = &["confidence", "score", "probability", "prob"];

/// Keys an explicit polygon may appear under.
const POLYGON_KEYS: &[&str] = &["polygon", "points", "quad"];

/// Keys an `{x, y, w, h}` rectangle may appear under.
const RECT_KEYS: &[&str] = &["bbox", "bounding_box", "box"];

/// Convert a raw Qwen OCR response into canonical text lines, dispatching on
/// the task the request was made with.
pub fn adapt_qwen(raw: &Value, task: QwenTask) -> Result<Vec<TextLine>, OcrError> {
    let output = raw.get("output").ok_or_else(|| OcrError::MalformedResponse {
        backend: Backend::Qwen,
        detail: format!("missing `output` object in {task} response"),
    })?;
    match task {
        QwenTask::Document | QwenTask::General => adapt_flat_lines(output, task),
        QwenTask::Table => adapt_table(output),
    }
}

/// Document/general mode: a flat list of line nodes, each carrying its text
/// and usually explicit coordinates.
fn adapt_flat_lines(output: &Value, task: QwenTask) -> Result<Vec<TextLine>, OcrError> {
    let nodes = ["lines", "results", "words"]
        .iter()
        .find_map(|key| output.get(*key).and_then(Value::as_array))
        .ok_or_else(|| OcrError::MalformedResponse {
            backend: Backend::Qwen,
            detail: format!("no line array (`lines`, `results` or `words`) in {task} output"),
        })?;

    let mut lines = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        let Some(text) = text_of(node, TEXT_KEYS) else {
            continue;
        };
        lines.push(TextLine {
            text,
            confidence: confidence_of(node, CONFIDENCE_KEYS),
            bounding_box: bounding_box_of(node),
            line_index: index,
        });
    }
    Ok(lines)
}

/// Table mode: text nested inside `tables[].rows[].cells[]`. This mode does
/// not report per-cell coordinates or confidences, so both stay `None`
/// unless a cell carries them anyway.
fn adapt_table(output: &Value) -> Result<Vec<TextLine>, OcrError> {
    let tables = output.get("tables").and_then(Value::as_array).ok_or_else(|| {
        OcrError::MalformedResponse {
            backend: Backend::Qwen,
            detail: "no `tables` array in table output".to_owned(),
        }
    })?;

    let mut lines = Vec::new();
    let mut index = 0;
    for table in tables {
        let rows = table.get("rows").and_then(Value::as_array).ok_or_else(|| {
            OcrError::MalformedResponse {
                backend: Backend::Qwen,
                detail: "table entry without a `rows` array".to_owned(),
            }
        })?;
        for row in rows {
            let cells = row
                .get("cells")
                .and_then(Value::as_array)
                .map(|cells| cells.as_slice())
                .unwrap_or(std::slice::from_ref(row));
            for cell in cells {
                if let Some(text) = text_of(cell, TEXT_KEYS) {
                    lines.push(TextLine {
                        text,
                        confidence: confidence_of(cell, CONFIDENCE_KEYS),
                        bounding_box: bounding_box_of(cell),
                        line_index: index,
                    });
                }
                index += 1;
            }
        }
    }
    Ok(lines)
}

/// Extract a bounding box from either an explicit polygon or a rectangle.
fn bounding_box_of(node: &Value) -> Option<Vec<(f64, f64)>> {
    if let Some(points) = POLYGON_KEYS
        .iter()
        .find_map(|key| node.get(*key).and_then(points_of))
    {
        return Some(points);
    }
    RECT_KEYS
        .iter()
        .find_map(|key| node.get(*key).and_then(corners_of_rect))
}
