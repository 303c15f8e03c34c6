//! Image decoding and format conversion
//!
//! Wraps the external codec behind a single capability: take raw image
//! bytes in any decodable format and re-encode them as a target format.

pub mod mime;
pub mod mock;
pub mod processor;

pub use mime::detect_image_mime;
pub use mock::MockImageCodec;
pub use processor::ImageProcessor;

use crate::models::{ConversionRequest, ConversionResult, TargetFormat};
use crate::{data_url, naming, Result};
use async_trait::async_trait;
use base64::Engine as _;

#[async_trait]
pub trait ImageCodec: Send + Sync {
    async fn encode(&self, image_data: &[u8], format: TargetFormat) -> Result<Vec<u8>>;
}

/// Run one conversion request end to end: decode the data URL, re-encode
/// it through `codec` and package the result with its derived name.
pub async fn convert_request(
    codec: &dyn ImageCodec,
    request: &ConversionRequest,
) -> Result<ConversionResult> {
    let image_data = data_url::decode(&request.image_src)?;
    let format: TargetFormat = request.format.parse()?;

    let encoded = codec.encode(&image_data, format).await?;

    Ok(ConversionResult {
        name: naming::converted_name(request.original_name.as_deref(), format),
        size: encoded.len(),
        data: base64::engine::general_purpose::STANDARD.encode(&encoded),
    })
}
