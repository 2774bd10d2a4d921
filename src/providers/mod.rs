//! Cloud OCR provider clients.
//!
//! Each client owns authentication, request construction and transport for
//! one backend, and hands back the provider's raw JSON response untouched.
//! Interpreting that response is the adapters' job.

use async_trait::async_trait;

use crate::{
    config::AppConfig,
    error::OcrError,
    image_input::ImagePayload,
    prelude::*,
    schema::{Backend, QwenTask},
};

pub mod aliyun;
pub mod qwen;

/// A client for one cloud OCR backend.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Which backend this client talks to.
    fn backend(&self) -> Backend;

    /// Send one image and return the raw provider response.
    ///
    /// A transport failure, auth failure or remote error response becomes
    /// [`OcrError::ProviderCallFailed`]; no retries are attempted.
    async fn call(&self, image: &ImagePayload) -> Result<Value, OcrError>;
}

/// Build the client for the selected backend, failing early when its
/// credentials are missing from the environment.
pub fn provider_for_backend(
    backend: Backend,
    config: &AppConfig,
    task: QwenTask,
    alltext_type: Option<&str>,
) -> Result<Box<dyn OcrProvider>, OcrError> {
    match backend {
        Backend::Aliyun => Ok(Box::new(aliyun::AliyunOcrClient::new(
            config.aliyun()?.clone(),
            alltext_type.map(str::to_owned),
        ))),
        Backend::Qwen => Ok(Box::new(qwen::QwenOcrClient::new(
            config.dashscope()?.clone(),
            task,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_fail_early() {
        let config = AppConfig::default();
        let err = provider_for_backend(Backend::Aliyun, &config, QwenTask::Document, None)
            .err()
            .expect("should fail without credentials");
        assert!(matches!(err, OcrError::InvalidArgument(_)));
        let err = provider_for_backend(Backend::Qwen, &config, QwenTask::Document, None)
            .err()
            .expect("should fail without credentials");
        assert!(matches!(err, OcrError::InvalidArgument(_)));
    }
}
