//! Assembling the final output document.

use chrono::Utc;

use crate::{
    error::OcrError,
    prelude::*,
    schema::{Backend, OcrResult, TextLine},
};

/// Wrap the filtered lines plus invocation metadata into an [`OcrResult`],
/// stamping the current time.
///
/// `raw_lines` is the adapter output before filtering and `kept_lines` the
/// output after; both are needed to record the line counts. A kept count
/// exceeding the raw count can only come from a logic bug upstream and is
/// reported as such rather than serialized.
pub fn assemble(
    backend: Backend,
    task: Option<String>,
    image_path: &Path,
    raw_lines: &[TextLine],
    kept_lines: Vec<TextLine>,
) -> Result<OcrResult, OcrError> {
    if kept_lines.len() > raw_lines.len() {
        return Err(OcrError::AssemblyInvariantViolation {
            raw: raw_lines.len(),
            kept: kept_lines.len(),
        });
    }
    Ok(OcrResult {
        backend,
        task,
        image_path: image_path.display().to_string(),
        timestamp: Utc::now(),
        raw_line_count: raw_lines.len(),
        kept_line_count: kept_lines.len(),
        lines: kept_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(confidence: Option<f64>, line_index: usize) -> TextLine {
        TextLine {
            text: format!("line {line_index}"),
            confidence,
            bounding_box: None,
            line_index,
        }
    }

    #[test]
    fn test_counts_match_inputs() {
        let raw = vec![line(Some(0.9), 0), line(Some(0.2), 1), line(None, 2)];
        let kept = vec![raw[0].clone(), raw[2].clone()];
        let result = assemble(
            Backend::Qwen,
            Some("document".to_owned()),
            Path::new("samples/sample.png"),
            &raw,
            kept,
        )
        .unwrap();
        assert_eq!(result.raw_line_count, 3);
        assert_eq!(result.kept_line_count, 2);
        assert_eq!(result.lines.len(), result.kept_line_count);
        assert_eq!(result.image_path, "samples/sample.png");
        assert_eq!(result.task.as_deref(), Some("document"));
    }

    #[test]
    fn test_kept_exceeding_raw_is_an_invariant_violation() {
        let raw = vec![line(Some(0.9), 0)];
        let kept = vec![raw[0].clone(), raw[0].clone()];
        let err = assemble(Backend::Aliyun, None, Path::new("x.png"), &raw, kept)
            .unwrap_err();
        assert!(matches!(
            err,
            OcrError::AssemblyInvariantViolation { raw: 1, kept: 2 }
        ));
    }

    #[test]
    fn test_empty_inputs_assemble_cleanly() {
        let result =
            assemble(Backend::Aliyun, None, Path::new("x.png"), &[], vec![]).unwrap();
        assert_eq!(result.raw_line_count, 0);
        assert_eq!(result.kept_line_count, 0);
        assert!(result.lines.is_empty());
    }
}
