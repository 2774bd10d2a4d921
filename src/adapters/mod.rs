//! Provider response adapters.
//!
//! Each backend gets one pure function that turns its raw JSON response into
//! the canonical [`TextLine`](crate::schema::TextLine) list. The adapters are
//! the only code that knows about provider field names, nesting, coordinate
//! formats, or confidence scales. Everything downstream (the confidence
//! filter, the assembler, the sinks) is provider-independent.

pub mod aliyun;
pub mod qwen;

pub use aliyun::adapt_aliyun;
pub use qwen::adapt_qwen;

use crate::prelude::*;

/// Extract the first non-empty string under any of `keys`, trimmed.
fn text_of(node: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(text) = node.get(key).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_owned());
            }
        }
    }
    None
}

/// Extract a confidence under any of `keys`, normalized into [0.0, 1.0].
///
/// Aliyun reports percentages (0–100) while Qwen reports fractions, so any
/// value above 1.0 is treated as a percentage and divided down.
fn confidence_of(node: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(conf) = node.get(key).and_then(Value::as_f64) {
            return Some(if conf > 1.0 { conf / 100.0 } else { conf });
        }
    }
    None
}

/// Interpret a polygon value as a list of 2D points.
///
/// Providers send either a list of `[x, y]` pairs, a list of `{"x": …, "y": …}`
/// objects, or a flat list of numbers to be consumed pairwise. Point ordering
/// is passed through unmodified.
fn points_of(polygon: &Value) -> Option<Vec<(f64, f64)>> {
    let items = polygon.as_array()?;
    if items.is_empty() {
        return None;
    }

    // A flat coordinate list, e.g. `[x0, y0, x1, y1, …]`.
    if items.iter().all(Value::is_number) {
        let coords: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
        if coords.len() < 2 {
            return None;
        }
        return Some(coords.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect());
    }

    let points: Vec<(f64, f64)> = items.iter().filter_map(point_of).collect();
    if points.is_empty() { None } else { Some(points) }
}

/// Interpret one polygon element as a 2D point.
fn point_of(item: &Value) -> Option<(f64, f64)> {
    if let Some(pair) = item.as_array() {
        let x = pair.first().and_then(Value::as_f64)?;
        let y = pair.get(1).and_then(Value::as_f64)?;
        return Some((x, y));
    }
    for (x_key, y_key) in [("x", "y"), ("X", "Y")] {
        if let (Some(x), Some(y)) = (
            item.get(x_key).and_then(Value::as_f64),
            item.get(y_key).and_then(Value::as_f64),
        ) {
            return Some((x, y));
        }
    }
    None
}

/// Build a four-corner polygon from an `{x, y, w, h}`-style rectangle.
fn corners_of_rect(rect: &Value) -> Option<Vec<(f64, f64)>> {
    let x = rect.get("x").and_then(Value::as_f64).unwrap_or(0.0);
    let y = rect.get("y").and_then(Value::as_f64).unwrap_or(0.0);
    let w = ["w", "width"]
        .iter()
        .find_map(|key| rect.get(*key).and_then(Value::as_f64))?;
    let h = ["h", "height"]
        .iter()
        .find_map(|key| rect.get(*key).and_then(Value::as_f64))?;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_points_of_pair_lists() {
        let polygon = json!([[0.0, 1.0], [2.0, 1.0], [2.0, 3.0], [0.0, 3.0]]);
        assert_eq!(
            points_of(&polygon).unwrap(),
            vec![(0.0, 1.0), (2.0, 1.0), (2.0, 3.0), (0.0, 3.0)]
        );
    }

    #[test]
    fn test_points_of_flat_list() {
        let polygon = json!([0, 1, 2, 1, 2, 3, 0, 3]);
        assert_eq!(
            points_of(&polygon).unwrap(),
            vec![(0.0, 1.0), (2.0, 1.0), (2.0, 3.0), (0.0, 3.0)]
        );
    }

    #[test]
    fn test_points_of_xy_objects() {
        let polygon = json!([{"X": 1, "Y": 2}, {"X": 3, "Y": 2}]);
        assert_eq!(points_of(&polygon).unwrap(), vec![(1.0, 2.0), (3.0, 2.0)]);
    }

    #[test]
    fn test_confidence_rescales_percentages() {
        assert_eq!(confidence_of(&json!({"Score": 95.0}), &["Score"]), Some(0.95));
        assert_eq!(confidence_of(&json!({"Score": 0.95}), &["Score"]), Some(0.95));
        assert_eq!(confidence_of(&json!({"Score": 1.0}), &["Score"]), Some(1.0));
        assert_eq!(confidence_of(&json!({}), &["Score"]), None);
    }

    #[test]
    fn test_corners_of_rect() {
        let rect = json!({"x": 1.0, "y": 2.0, "w": 10.0, "h": 4.0});
        assert_eq!(
            corners_of_rect(&rect).unwrap(),
            vec![(1.0, 2.0), (11.0, 2.0), (11.0, 6.0), (1.0, 6.0)]
        );
        assert_eq!(corners_of_rect(&json!({"x": 1.0, "y": 2.0, "w": 0.0, "h": 4.0})), None);
    }
}
