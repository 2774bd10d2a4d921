//! Error taxonomy for a single OCR invocation.
//!
//! Every failure here is terminal: we never retry, and we never write a
//! partial result file. The application boundary in `main.rs` uses
//! [`anyhow::Result`], so these errors thread through `?` and get printed
//! with their full context chain.

use thiserror::Error;

use crate::schema::Backend;

/// Everything that can go wrong between parsing arguments and writing the
/// result document.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The user gave us an argument or configuration we can't work with.
    /// Detected before any provider call is attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider call itself failed: transport, auth, or a remote error
    /// response. The message includes the provider's own code and message
    /// when we have them.
    #[error("{backend} OCR call failed: {message}")]
    ProviderCallFailed {
        backend: Backend,
        message: String,
    },

    /// The provider answered, but the response doesn't have the structure
    /// the adapter expects. No partial recovery is attempted.
    #[error("malformed {backend} response: {detail}")]
    MalformedResponse {
        backend: Backend,
        detail: String,
    },

    /// A Qwen task name we don't recognize.
    #[error("unsupported qwen task {0:?} (expected document, table or general)")]
    UnsupportedTask(String),

    /// The assembler was handed more kept lines than raw lines. Unreachable
    /// given correct upstream behavior; kept as a guard against logic bugs.
    #[error("internal error: assembled {kept} kept lines from {raw} raw lines")]
    AssemblyInvariantViolation {
        raw: usize,
        kept: usize,
    },
}
