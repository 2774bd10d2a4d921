use std::str::FromStr;

use clap::Parser;
use tracing_subscriber::{EnvFilter, filter::Directive};

use self::{
    adapters::{adapt_aliyun, adapt_qwen},
    assemble::assemble,
    config::AppConfig,
    filter::{filter_lines, validate_min_conf},
    image_input::{ensure_image_path, read_image_payload},
    output::{print_result, write_result},
    prelude::*,
    providers::provider_for_backend,
    schema::{Backend, QwenTask},
};

mod adapters;
mod assemble;
mod config;
mod error;
mod filter;
mod image_input;
mod output;
mod prelude;
mod providers;
mod schema;

/// Compare Aliyun and DashScope Qwen cloud OCR backends.
///
/// Calls the selected backend once for one image, normalizes the response
/// into a common line format, and writes the result to stdout and to a
/// timestamped JSON file.
#[derive(Debug, Parser)]
#[clap(
    version,
    after_help = r#"
Environment Variables:
  - ALIBABA_CLOUD_ACCESS_KEY_ID: Aliyun access key ID.
  - ALIBABA_CLOUD_ACCESS_KEY_SECRET: Aliyun access key secret.
  - ALIBABA_CLOUD_REGION (optional): Aliyun region, defaults to cn-hangzhou.
  - DASHSCOPE_API_KEY: DashScope API key, for the qwen backend.
  - OCR_OUTPUT_DIR (optional): Default output directory.

  These variables may be set in a standard `.env` file.
"#
)]
struct Opts {
    /// OCR backend to use.
    #[clap(long, value_enum)]
    backend: Backend,

    /// Path to the image file.
    #[clap(long)]
    image: PathBuf,

    /// Qwen OCR task type. Ignored for the aliyun backend.
    #[clap(long, value_enum, default_value_t = QwenTask::default())]
    task: QwenTask,

    /// Minimum confidence for keeping a recognized line, between 0.0 and
    /// 1.0. Lines without a reported confidence are always kept.
    #[clap(long = "min_conf", default_value_t = 0.0)]
    min_conf: f64,

    /// Directory to store JSON outputs. Defaults to `outputs`.
    #[clap(long)]
    outdir: Option<PathBuf>,

    /// Aliyun RecognizeAllText type (use to switch from RecognizeAdvanced).
    #[clap(long = "alltext_type")]
    alltext_type: Option<String>,
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing. Logs go to stderr so stdout stays valid JSON.
    let directive = Directive::from_str("info").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    real_main().await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main() -> Result<()> {
    // Load environment variables from a `.env` file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    // Reject bad arguments before we touch the network.
    validate_min_conf(opts.min_conf)?;
    let image = ensure_image_path(&opts.image)?;

    // Load credentials and build the client for the selected backend.
    let config = AppConfig::from_env();
    let provider = provider_for_backend(
        opts.backend,
        &config,
        opts.task,
        opts.alltext_type.as_deref(),
    )?;

    // Make the single provider call.
    let payload = read_image_payload(&image).await?;
    info!("Calling {} OCR for {}", provider.backend(), image.display());
    let raw = provider.call(&payload).await?;

    // Normalize, filter and assemble.
    let raw_lines = match opts.backend {
        Backend::Aliyun => adapt_aliyun(&raw, opts.alltext_type.as_deref())?,
        Backend::Qwen => adapt_qwen(&raw, opts.task)?,
    };
    let kept_lines = filter_lines(raw_lines.clone(), opts.min_conf)?;
    let task = match opts.backend {
        Backend::Qwen => Some(opts.task.to_string()),
        Backend::Aliyun => None,
    };
    let result = assemble(opts.backend, task, &image, &raw_lines, kept_lines)?;

    // Write to both sinks.
    let label = match opts.backend {
        Backend::Qwen => opts.task.to_string(),
        Backend::Aliyun => opts
            .alltext_type
            .clone()
            .unwrap_or_else(|| "advanced".to_owned()),
    };
    let outdir = opts
        .outdir
        .or(config.output_dir)
        .unwrap_or_else(|| PathBuf::from("outputs"));
    print_result(&result)?;
    let path = write_result(&outdir, &label, &result).await?;
    info!("Saved OCR output to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cli_parser_accepts_expected_switches() {
        let opts = Opts::try_parse_from([
            "ocr-compare",
            "--backend",
            "qwen",
            "--image",
            "samples/sample.png",
            "--task",
            "table",
            "--min_conf",
            "0.7",
            "--outdir",
            "outputs",
            "--alltext_type",
            "General",
        ])
        .unwrap();
        assert_eq!(opts.backend, Backend::Qwen);
        assert_eq!(opts.task, QwenTask::Table);
        assert_eq!(opts.min_conf, 0.7);
        assert_eq!(opts.alltext_type.as_deref(), Some("General"));
    }

    #[test]
    fn test_cli_parser_defaults() {
        let opts = Opts::try_parse_from([
            "ocr-compare",
            "--backend",
            "aliyun",
            "--image",
            "samples/sample.png",
        ])
        .unwrap();
        assert_eq!(opts.task, QwenTask::Document);
        assert_eq!(opts.min_conf, 0.0);
        assert_eq!(opts.outdir, None);
    }

    /// The full normalize pipeline for a qwen document response: the
    /// null-confidence line survives filtering, the low-confidence one
    /// doesn't, and the counts agree.
    #[test]
    fn test_normalize_pipeline_qwen_document() {
        let raw = json!({
            "output": {
                "lines": [
                    {"text": "first", "confidence": 0.9},
                    {"text": "second", "confidence": 0.3},
                    {"text": "third"},
                    {"text": "fourth", "confidence": 0.6},
                ]
            }
        });
        let raw_lines = adapt_qwen(&raw, QwenTask::Document).unwrap();
        let kept_lines = filter_lines(raw_lines.clone(), 0.5).unwrap();
        let result = assemble(
            Backend::Qwen,
            Some("document".to_owned()),
            Path::new("samples/sample.png"),
            &raw_lines,
            kept_lines,
        )
        .unwrap();

        assert_eq!(result.raw_line_count, 4);
        assert_eq!(result.kept_line_count, 3);
        let indices: Vec<_> = result.lines.iter().map(|line| line.line_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }
}

