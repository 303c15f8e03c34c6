use super::ConvertService;
use crate::codec::{convert_request, ImageCodec};
use crate::models::{ConversionRequest, ConversionResult};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs conversions in-process through a codec, without an endpoint.
pub struct LocalConvertClient {
    codec: Arc<dyn ImageCodec>,
}

impl LocalConvertClient {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl ConvertService for LocalConvertClient {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        convert_request(self.codec.as_ref(), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MockImageCodec;
    use crate::data_url;
    use crate::models::TargetFormat;

    #[tokio::test]
    async fn test_local_client_uses_codec() {
        let codec = MockImageCodec::new();
        let client = LocalConvertClient::new(Arc::new(codec.clone()));

        let request =
            ConversionRequest::new(data_url::encode("image/png", b"px"), TargetFormat::Jpeg);
        let result = client.convert(&request).await.unwrap();

        assert_eq!(result.name, "converted.jpeg");
        assert_eq!(result.size, "jpegpx".len());
        assert_eq!(codec.get_encode_count(), 1);
    }

    #[tokio::test]
    async fn test_local_client_surfaces_decode_errors() {
        let codec = MockImageCodec::new();
        let client = LocalConvertClient::new(Arc::new(codec.clone()));

        let request = ConversionRequest::new("no comma here".to_string(), TargetFormat::Png);
        assert!(client.convert(&request).await.is_err());
        assert_eq!(codec.get_encode_count(), 0);
    }
}
