//! Confidence-based line filtering, applied uniformly across backends.

use crate::{error::OcrError, schema::TextLine};

/// Check that a `--min_conf` value is inside [0.0, 1.0].
///
/// Called from argument handling so a bad threshold is rejected before any
/// provider call is attempted, and again by [`filter_lines`] itself.
pub fn validate_min_conf(min_conf: f64) -> Result<(), OcrError> {
    if !(0.0..=1.0).contains(&min_conf) {
        return Err(OcrError::InvalidArgument(format!(
            "--min_conf must be between 0.0 and 1.0, got {min_conf}"
        )));
    }
    Ok(())
}

/// Keep every line whose confidence is at least `min_conf`.
///
/// Lines without a confidence are always kept: a provider or mode that can't
/// report one must not have its output silently discarded by a threshold.
/// Relative order is preserved; nothing is reordered or deduplicated.
pub fn filter_lines(
    lines: Vec<TextLine>,
    min_conf: f64,
) -> Result<Vec<TextLine>, OcrError> {
    validate_min_conf(min_conf)?;
    Ok(lines
        .into_iter()
        .filter(|line| line.confidence.is_none_or(|conf| conf >= min_conf))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, confidence: Option<f64>, line_index: usize) -> TextLine {
        TextLine {
            text: text.to_owned(),
            confidence,
            bounding_box: None,
            line_index,
        }
    }

    fn sample_lines() -> Vec<TextLine> {
        vec![
            line("high", Some(0.9), 0),
            line("low", Some(0.3), 1),
            line("unknown", None, 2),
            line("middle", Some(0.6), 3),
        ]
    }

    #[test]
    fn test_keeps_order_and_null_confidence() {
        let kept = filter_lines(sample_lines(), 0.5).unwrap();
        let indices: Vec<_> = kept.iter().map(|line| line.line_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        assert_eq!(filter_lines(sample_lines(), 0.0).unwrap().len(), 4);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let kept = filter_lines(sample_lines(), 0.6).unwrap();
        let indices: Vec<_> = kept.iter().map(|line| line.line_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_idempotent() {
        let once = filter_lines(sample_lines(), 0.5).unwrap();
        let twice = filter_lines(once.clone(), 0.5).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dropped_lines_all_fall_below_threshold() {
        let original = sample_lines();
        let kept = filter_lines(original.clone(), 0.5).unwrap();
        for line in &original {
            let was_kept = kept.iter().any(|k| k.line_index == line.line_index);
            match line.confidence {
                None => assert!(was_kept),
                Some(conf) => assert_eq!(was_kept, conf >= 0.5),
            }
        }
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let err = filter_lines(sample_lines(), bad).unwrap_err();
            assert!(matches!(err, OcrError::InvalidArgument(_)), "min_conf {bad}");
        }
    }
}
