//! Reading and encoding the input image.

use base64::{Engine as _, prelude::BASE64_STANDARD};

use crate::prelude::*;

/// An image loaded from disk, ready to ship to a provider.
#[derive(Clone, Debug)]
pub struct ImagePayload {
    /// The raw image bytes.
    pub bytes: Vec<u8>,

    /// The bytes, Base64-encoded. Both providers want this form.
    pub base64: String,

    /// Short format name derived from the file extension ("png", "jpeg", …).
    pub format: String,

    /// The guessed MIME type.
    pub mime_type: String,
}

/// Validate that the given image path exists and points to a file.
///
/// Called before any provider work so a typo'd path fails with a clear
/// message instead of a confusing remote error.
pub fn ensure_image_path(image: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(image)
        .with_context(|| format!("image path not found: {}", image.display()))?;
    if !metadata.is_file() {
        return Err(anyhow::anyhow!(
            "image path is not a file: {}",
            image.display()
        ));
    }
    Ok(image.to_owned())
}

/// Read an image from disk and encode it for HTTP payloads.
pub async fn read_image_payload(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let base64 = BASE64_STANDARD.encode(&bytes);
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_owned());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned();
    Ok(ImagePayload {
        bytes,
        base64,
        format,
        mime_type,
    })
}
