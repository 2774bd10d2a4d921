//! DashScope Qwen OCR client.

use async_trait::async_trait;
use serde_json::json;

use crate::{
    config::DashScopeCredentials, error::OcrError, image_input::ImagePayload,
    prelude::*, schema::Backend, schema::QwenTask,
};

use super::OcrProvider;

/// Base URL for the DashScope REST API.
const API_BASE: &str = "https://dashscope.aliyuncs.com/api/v1";

/// Client for DashScope Qwen OCR tasks.
pub struct QwenOcrClient {
    credentials: DashScopeCredentials,
    task: QwenTask,
    http: reqwest::Client,
}

impl QwenOcrClient {
    /// Create a new client for the given task.
    pub fn new(credentials: DashScopeCredentials, task: QwenTask) -> Self {
        Self {
            credentials,
            task,
            http: reqwest::Client::new(),
        }
    }

    /// The model serving this task.
    pub fn model(&self) -> &'static str {
        match self.task {
            QwenTask::Document => "qwen-ocr-document",
            QwenTask::Table => "qwen-ocr-table",
            QwenTask::General => "qwen-ocr-general",
        }
    }

    /// Build a transport/auth error for this backend.
    fn call_failed(&self, message: String) -> OcrError {
        OcrError::ProviderCallFailed {
            backend: Backend::Qwen,
            message,
        }
    }
}

#[async_trait]
impl OcrProvider for QwenOcrClient {
    fn backend(&self) -> Backend {
        Backend::Qwen
    }

    #[instrument(level = "debug", skip_all, fields(task = %self.task))]
    async fn call(&self, image: &ImagePayload) -> Result<Value, OcrError> {
        let url = format!("{API_BASE}/services/ocr/{}", self.task);
        let request_body = json!({
            "model": self.model(),
            "input": {
                "image": [{
                    "data": image.base64,
                    "format": image.format,
                }],
            },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.credentials.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| self.call_failed(format!("request failed: {err}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|err| self.call_failed(format!("unreadable response: {err}")))?;

        // DashScope reports remote failures both through the HTTP status and
        // through `code`/`message` fields in the body. Surface them verbatim.
        let remote_code = body.get("code").and_then(Value::as_str).filter(|code| !code.is_empty());
        if !status.is_success() || remote_code.is_some() {
            let code = remote_code.unwrap_or("unknown");
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(self.call_failed(format!("{status}: {code}: {message}")));
        }
        trace!(?body, "DashScope response");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_model_mapping() {
        let credentials = DashScopeCredentials {
            api_key: "test".to_owned(),
        };
        let models: Vec<_> = [QwenTask::Document, QwenTask::Table, QwenTask::General]
            .into_iter()
            .map(|task| QwenOcrClient::new(credentials.clone(), task).model())
            .collect();
        assert_eq!(
            models,
            vec!["qwen-ocr-document", "qwen-ocr-table", "qwen-ocr-general"]
        );
    }
}
