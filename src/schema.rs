//! Canonical shapes for normalized OCR output.
//!
//! Both providers return structurally different responses. Everything past
//! the adapters speaks only in terms of the types defined here, and these
//! are exactly what gets serialized to stdout and to the output file.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use clap::ValueEnum;

use crate::{error::OcrError, prelude::*};

/// Which cloud OCR provider to call.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum Backend {
    /// Aliyun OCR API (`RecognizeAdvanced` or `RecognizeAllText`).
    Aliyun,
    /// DashScope Qwen OCR tasks.
    Qwen,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Aliyun => write!(f, "aliyun"),
            Backend::Qwen => write!(f, "qwen"),
        }
    }
}

/// Qwen recognition mode. This affects both which model we call and the
/// shape of the response we get back.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum QwenTask {
    /// Document recognition. Flat line list with coordinates.
    #[default]
    Document,
    /// Table recognition. Text is nested inside row/cell structures.
    Table,
    /// General-purpose recognition. Flat line list.
    General,
}

impl fmt::Display for QwenTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QwenTask::Document => write!(f, "document"),
            QwenTask::Table => write!(f, "table"),
            QwenTask::General => write!(f, "general"),
        }
    }
}

impl FromStr for QwenTask {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, OcrError> {
        match s {
            "document" => Ok(QwenTask::Document),
            "table" => Ok(QwenTask::Table),
            "general" => Ok(QwenTask::General),
            other => Err(OcrError::UnsupportedTask(other.to_owned())),
        }
    }
}

/// One recognized line of text, in provider-independent form.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TextLine {
    /// The recognized text.
    pub text: String,

    /// Provider-reported confidence, normalized into [0.0, 1.0]. `None` when
    /// the provider or mode doesn't report one. An absent confidence is not
    /// evidence of low quality, so the filter never drops these lines.
    pub confidence: Option<f64>,

    /// Four corner points delimiting the text region, in provider-native
    /// order. We pass point ordering through opaquely rather than trying to
    /// normalize it. `None` when the mode returns no coordinates.
    pub bounding_box: Option<Vec<(f64, f64)>>,

    /// Position in the original provider ordering. Preserved so output
    /// ordering stays stable across filtering.
    pub line_index: usize,
}

/// The final output document: filtered lines plus invocation metadata.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OcrResult {
    /// The backend that produced this result.
    pub backend: Backend,

    /// The Qwen task. `None` for the aliyun backend, where the recognition
    /// variant only shows up in the output filename.
    pub task: Option<String>,

    /// The input image path, as given on the command line.
    pub image_path: String,

    /// When this result was assembled (UTC, serialized as RFC 3339).
    pub timestamp: DateTime<Utc>,

    /// The recognized lines that survived the confidence filter, in original
    /// provider order.
    pub lines: Vec<TextLine>,

    /// How many lines the adapter produced before filtering.
    pub raw_line_count: usize,

    /// How many lines survived filtering. Always `lines.len()`.
    pub kept_line_count: usize,
}
