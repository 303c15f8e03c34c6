//! Data models and structures
//!
//! Defines the selected-image records held by the controller, the wire
//! types exchanged with the conversion endpoint, and runtime configuration.

use crate::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use uuid::Uuid;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Webp,
    Avif,
    Jpeg,
    Png,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::Webp,
        TargetFormat::Avif,
        TargetFormat::Jpeg,
        TargetFormat::Png,
    ];

    /// File extension used for derived names, identical to the wire value.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Webp => "webp",
            TargetFormat::Avif => "avif",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Webp => "image/webp",
            TargetFormat::Avif => "image/avif",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TargetFormat::ALL
            .into_iter()
            .find(|format| format.extension() == s)
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

/// A file picked by the user, as held in controller memory.
///
/// `data` stays `None` until the asynchronous read of the file completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub data: Option<String>,
}

impl SelectedImage {
    pub fn pending(name: String, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            size,
            mime_type: String::new(),
            data: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

// Conversion endpoint request/response models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub image_src: String,
    /// Kept as the raw wire string; unknown formats are rejected when the
    /// request is converted, before the codec runs.
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl ConversionRequest {
    pub fn new(image_src: String, format: TargetFormat) -> Self {
        Self {
            image_src,
            format: format.to_string(),
            original_name: None,
        }
    }

    pub fn with_original_name(mut self, name: String) -> Self {
        self.original_name = Some(name);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionResult {
    pub name: String,
    pub size: usize,
    pub data: String,
}

impl ConversionResult {
    /// Decode the base64 payload back into the encoded image bytes.
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.data)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            endpoint: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("IMGCONV_BIND_ADDR") {
            Some(value) => value.parse().map_err(|_| {
                Error::Config(format!("IMGCONV_BIND_ADDR is not a socket address: {}", value))
            })?,
            None => defaults.bind_addr,
        };

        let max_body_bytes = match lookup("IMGCONV_MAX_BODY_BYTES") {
            Some(value) => value.parse().map_err(|_| {
                Error::Config(format!("IMGCONV_MAX_BODY_BYTES is not a number: {}", value))
            })?,
            None => defaults.max_body_bytes,
        };

        let endpoint = lookup("IMGCONV_ENDPOINT").filter(|value| !value.trim().is_empty());

        Ok(Self {
            bind_addr,
            max_body_bytes,
            endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_target_format_serialization() {
        let json = serde_json::to_string(&TargetFormat::Jpeg).unwrap();
        assert_eq!(json, "\"jpeg\"");

        let parsed: TargetFormat = serde_json::from_str("\"avif\"").unwrap();
        assert_eq!(parsed, TargetFormat::Avif);
    }

    #[test]
    fn test_target_format_from_str() {
        for format in TargetFormat::ALL {
            assert_eq!(format.extension().parse::<TargetFormat>().unwrap(), format);
        }

        let err = "tiff".parse::<TargetFormat>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref f) if f == "tiff"));
        assert!("WEBP".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn test_request_wire_shape() {
        let request =
            ConversionRequest::new("data:image/png;base64,AA==".to_string(), TargetFormat::Webp);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"imageSrc": "data:image/png;base64,AA==", "format": "webp"})
        );

        let named = request.with_original_name("photo.png".to_string());
        let json = serde_json::to_value(&named).unwrap();
        assert_eq!(json["originalName"], "photo.png");
    }

    #[test]
    fn test_request_without_original_name_deserializes() {
        let request: ConversionRequest =
            serde_json::from_str(r#"{"imageSrc":"data:,","format":"png"}"#).unwrap();
        assert_eq!(request.original_name, None);
    }

    #[test]
    fn test_result_decode_data() {
        let result = ConversionResult {
            name: "converted.png".to_string(),
            size: 3,
            data: "AQID".to_string(),
        };
        assert_eq!(result.decode_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_body_bytes, 50 * 1024 * 1024);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("IMGCONV_BIND_ADDR", "127.0.0.1:8080"),
            ("IMGCONV_MAX_BODY_BYTES", "1024"),
            ("IMGCONV_ENDPOINT", "http://localhost:8080"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = Config::from_lookup(|key| {
            (key == "IMGCONV_MAX_BODY_BYTES").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("IMGCONV_MAX_BODY_BYTES"));
    }
}
