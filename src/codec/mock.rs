use super::ImageCodec;
use crate::models::TargetFormat;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockImageCodec {
    encode_count: Arc<Mutex<usize>>,
    formats: Arc<Mutex<Vec<TargetFormat>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageCodec {
    pub fn new() -> Self {
        Self {
            encode_count: Arc::new(Mutex::new(0)),
            formats: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_encode_count(&self) -> usize {
        *self.encode_count.lock().unwrap()
    }

    pub fn get_formats(&self) -> Vec<TargetFormat> {
        self.formats.lock().unwrap().clone()
    }
}

impl Default for MockImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCodec for MockImageCodec {
    async fn encode(&self, image_data: &[u8], format: TargetFormat) -> Result<Vec<u8>> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        *self.encode_count.lock().unwrap() += 1;
        self.formats.lock().unwrap().push(format);

        // Tag the input with the format so callers can tell outputs apart
        let mut encoded = format.extension().as_bytes().to_vec();
        encoded.extend_from_slice(image_data);
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_codec_tags_output() {
        let codec = MockImageCodec::new();

        let encoded = codec.encode(b"data", TargetFormat::Png).await.unwrap();

        assert_eq!(encoded, b"pngdata");
        assert_eq!(codec.get_encode_count(), 1);
        assert_eq!(codec.get_formats(), vec![TargetFormat::Png]);
    }

    #[tokio::test]
    async fn test_mock_codec_with_failure() {
        let codec = MockImageCodec::new().with_failure(true);

        let result = codec.encode(b"data", TargetFormat::Webp).await;
        assert!(result.is_err());
        assert_eq!(codec.get_encode_count(), 0);
    }
}
