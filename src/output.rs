//! Output sinks: console pretty-printing and timestamped JSON files.

use crate::{prelude::*, schema::OcrResult};

/// Timestamp format used in output filenames.
const DATE_PATTERN: &str = "%Y%m%d_%H%M%S";

/// Pretty-print the result document to standard output.
///
/// Logs go to stderr, so stdout stays a single valid JSON document that can
/// be piped into other tools.
pub fn print_result(result: &OcrResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .context("failed to serialize OCR result")?;
    println!("{json}");
    Ok(())
}

/// Write the result document to `{backend}_{label}_{timestamp}.json` inside
/// `outdir`, creating the directory if needed. Returns the path written.
///
/// `label` is the qwen task or the aliyun all-text type ("advanced" when
/// unset). The filename timestamp is the result's own timestamp, so the
/// filename and document contents always agree.
pub async fn write_result(
    outdir: &Path,
    label: &str,
    result: &OcrResult,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(outdir)
        .await
        .with_context(|| format!("failed to create output directory {}", outdir.display()))?;
    let filename = format!(
        "{}_{}_{}.json",
        result.backend,
        label,
        result.timestamp.format(DATE_PATTERN)
    );
    let path = outdir.join(filename);
    let json = serde_json::to_string_pretty(result)
        .context("failed to serialize OCR result")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
