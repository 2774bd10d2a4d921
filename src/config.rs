//! Environment-based configuration.
//!
//! Credentials are read once at startup, after `dotenvy` has had a chance to
//! load a `.env` file. Nothing else in the crate touches the environment.

use std::env;

use crate::{error::OcrError, prelude::*};

/// Region used when `ALIBABA_CLOUD_REGION` is unset.
pub const DEFAULT_REGION: &str = "cn-hangzhou";

/// Aliyun access key pair plus region.
#[derive(Clone, Debug)]
pub struct AliyunCredentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub region_id: String,
}

/// DashScope API key.
#[derive(Clone, Debug)]
pub struct DashScopeCredentials {
    pub api_key: String,
}

/// Everything we load from the environment. Either credential set may be
/// absent; we only fail when the selected backend actually needs it.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub aliyun: Option<AliyunCredentials>,
    pub dashscope: Option<DashScopeCredentials>,

    /// Default output directory, overridable with `--outdir`.
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let aliyun = match (
            env::var("ALIBABA_CLOUD_ACCESS_KEY_ID"),
            env::var("ALIBABA_CLOUD_ACCESS_KEY_SECRET"),
        ) {
            (Ok(access_key_id), Ok(access_key_secret)) => Some(AliyunCredentials {
                access_key_id,
                access_key_secret,
                region_id: env::var("ALIBABA_CLOUD_REGION")
                    .unwrap_or_else(|_| DEFAULT_REGION.to_owned()),
            }),
            _ => None,
        };
        let dashscope = env::var("DASHSCOPE_API_KEY")
            .ok()
            .map(|api_key| DashScopeCredentials { api_key });
        let output_dir = env::var("OCR_OUTPUT_DIR").ok().map(PathBuf::from);
        Self {
            aliyun,
            dashscope,
            output_dir,
        }
    }

    /// Get the Aliyun credentials, or explain which variables are missing.
    pub fn aliyun(&self) -> Result<&AliyunCredentials, OcrError> {
        self.aliyun.as_ref().ok_or_else(|| {
            OcrError::InvalidArgument(
                "Aliyun credentials are not configured \
                 (set ALIBABA_CLOUD_ACCESS_KEY_ID and ALIBABA_CLOUD_ACCESS_KEY_SECRET)"
                    .to_owned(),
            )
        })
    }

    /// Get the DashScope credentials, or explain which variable is missing.
    pub fn dashscope(&self) -> Result<&DashScopeCredentials, OcrError> {
        self.dashscope.as_ref().ok_or_else(|| {
            OcrError::InvalidArgument(
                "DashScope API key is not configured (set DASHSCOPE_API_KEY)".to_owned(),
            )
        })
    }
}
