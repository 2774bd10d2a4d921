//! Aliyun OCR client.
//!
//! Talks to the `ocr-api` endpoint using the ACS3-HMAC-SHA256 request
//! signature. Supports both `RecognizeAdvanced` and, when an all-text type
//! is given, `RecognizeAllText`.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac as _};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{
    config::AliyunCredentials, error::OcrError, image_input::ImagePayload, prelude::*,
    schema::Backend,
};

use super::OcrProvider;

type HmacSha256 = Hmac<Sha256>;

/// OCR API version.
const API_VERSION: &str = "2021-07-07";

/// Signature algorithm name, as it appears in the `Authorization` header.
const SIGNATURE_ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// Client for the Aliyun OCR API.
pub struct AliyunOcrClient {
    credentials: AliyunCredentials,

    /// The `RecognizeAllText` type, or `None` for `RecognizeAdvanced`.
    alltext_type: Option<String>,

    http: reqwest::Client,
}

impl AliyunOcrClient {
    /// Create a new client.
    pub fn new(credentials: AliyunCredentials, alltext_type: Option<String>) -> Self {
        Self {
            credentials,
            alltext_type,
            http: reqwest::Client::new(),
        }
    }

    /// The regional API host.
    fn host(&self) -> String {
        format!("ocr-api.{}.aliyuncs.com", self.credentials.region_id)
    }

    /// The API action and its query string.
    fn action_and_query(&self) -> (&str, String) {
        match &self.alltext_type {
            Some(alltext_type) => ("RecognizeAllText", format!("Type={alltext_type}")),
            None => ("RecognizeAdvanced", String::new()),
        }
    }

    /// Build the signed request headers for one call.
    ///
    /// Follows the ACS V3 scheme: hash the payload, build a canonical
    /// request over the `x-acs-*` headers, then HMAC the hashed canonical
    /// request with the access key secret.
    fn signed_headers(&self, action: &str, query: &str, body: &[u8]) -> Vec<(String, String)> {
        let payload_hash = hex::encode(Sha256::digest(body));
        let mut headers = vec![
            ("host".to_owned(), self.host()),
            ("x-acs-action".to_owned(), action.to_owned()),
            ("x-acs-content-sha256".to_owned(), payload_hash.clone()),
            (
                "x-acs-date".to_owned(),
                Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            (
                "x-acs-signature-nonce".to_owned(),
                Uuid::new_v4().to_string(),
            ),
            ("x-acs-version".to_owned(), API_VERSION.to_owned()),
        ];
        headers.sort();

        let canonical_headers: String = headers
            .iter()
            .map(|(key, value)| format!("{key}:{value}\n"))
            .collect();
        let signed_header_names = headers
            .iter()
            .map(|(key, _)| key.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let canonical_request = format!(
            "POST\n/\n{query}\n{canonical_headers}\n{signed_header_names}\n{payload_hash}"
        );
        let string_to_sign = format!(
            "{SIGNATURE_ALGORITHM}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let mut mac =
            HmacSha256::new_from_slice(self.credentials.access_key_secret.as_bytes())
                .expect("HMAC accepts any key length");
        mac.update(string_to_sign.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        headers.push((
            "authorization".to_owned(),
            format!(
                "{SIGNATURE_ALGORITHM} Credential={},SignedHeaders={},Signature={}",
                self.credentials.access_key_id, signed_header_names, signature
            ),
        ));
        headers
    }

    /// Build a transport/auth error for this backend.
    fn call_failed(&self, message: String) -> OcrError {
        OcrError::ProviderCallFailed {
            backend: Backend::Aliyun,
            message,
        }
    }
}

#[async_trait]
impl OcrProvider for AliyunOcrClient {
    fn backend(&self) -> Backend {
        Backend::Aliyun
    }

    #[instrument(level = "debug", skip_all, fields(action = self.action_and_query().0))]
    async fn call(&self, image: &ImagePayload) -> Result<Value, OcrError> {
        let (action, query) = self.action_and_query();
        let url = if query.is_empty() {
            format!("https://{}/", self.host())
        } else {
            format!("https://{}/?{}", self.host(), query)
        };

        let mut request = self
            .http
            .post(&url)
            .header("content-type", &image.mime_type)
            .body(image.bytes.clone());
        for (key, value) in self.signed_headers(action, &query, &image.bytes) {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.call_failed(format!("request failed: {err}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|err| self.call_failed(format!("unreadable response: {err}")))?;

        if !status.is_success() {
            let code = body.get("Code").and_then(Value::as_str).unwrap_or("unknown");
            let message = body
                .get("Message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(self.call_failed(format!("{status}: {code}: {message}")));
        }
        trace!(?body, "Aliyun response");

        // The API returns `Data` as a JSON-encoded string. Decode it here so
        // the adapter sees the nested structure, the same way the official
        // SDK response models present it.
        let mut body = body;
        if let Some(data) = body.get("Data").and_then(Value::as_str) {
            let decoded: Value = serde_json::from_str(data)
                .map_err(|err| self.call_failed(format!("undecodable Data payload: {err}")))?;
            body["Data"] = decoded;
        }
        Ok(serde_json::json!({ "body": body }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(alltext_type: Option<&str>) -> AliyunOcrClient {
        AliyunOcrClient::new(
            AliyunCredentials {
                access_key_id: "test-key".to_owned(),
                access_key_secret: "test-secret".to_owned(),
                region_id: "cn-hangzhou".to_owned(),
            },
            alltext_type.map(str::to_owned),
        )
    }

    #[test]
    fn test_action_selection() {
        assert_eq!(client(None).action_and_query(), ("RecognizeAdvanced", String::new()));
        assert_eq!(
            client(Some("General")).action_and_query(),
            ("RecognizeAllText", "Type=General".to_owned())
        );
    }

    #[test]
    fn test_signed_headers_cover_acs_fields() {
        let headers = client(None).signed_headers("RecognizeAdvanced", "", b"image");
        let auth = &headers.last().unwrap().1;
        assert!(auth.starts_with("ACS3-HMAC-SHA256 Credential=test-key,"));
        assert!(auth.contains("SignedHeaders=host;x-acs-action;x-acs-content-sha256"));
        let names: Vec<_> = headers.iter().map(|(key, _)| key.as_str()).collect();
        assert!(names.contains(&"x-acs-signature-nonce"));
        assert!(names.contains(&"x-acs-version"));
    }
}
