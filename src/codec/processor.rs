use super::ImageCodec;
use crate::models::TargetFormat;
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;

const JPEG_QUALITY: u8 = 80;
const AVIF_QUALITY: u8 = 50;
const AVIF_SPEED: u8 = 6;

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn encode_sync(image_data: &[u8], format: TargetFormat) -> Result<Vec<u8>> {
        let image = image::load_from_memory(image_data)?;
        let mut bytes = Vec::new();

        match format {
            TargetFormat::Png => image.write_with_encoder(PngEncoder::new(&mut bytes))?,
            // JPEG has no alpha channel
            TargetFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?,
            TargetFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut bytes))?,
            TargetFormat::Avif => DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(
                AvifEncoder::new_with_speed_quality(&mut bytes, AVIF_SPEED, AVIF_QUALITY),
            )?,
        }

        Ok(bytes)
    }
}

#[async_trait]
impl ImageCodec for ImageProcessor {
    async fn encode(&self, image_data: &[u8], format: TargetFormat) -> Result<Vec<u8>> {
        let image_data = image_data.to_vec();
        tokio::task::spawn_blocking(move || Self::encode_sync(&image_data, format))
            .await
            .map_err(|e| Error::Invariant(format!("Image encoding task join error: {}", e)))?
    }
}
