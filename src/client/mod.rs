//! Conversion services used by the client controller
//!
//! A conversion is one request/response exchange; implementations either
//! talk to the HTTP endpoint or run the codec in-process.

pub mod http;
pub mod local;
pub mod mock;

pub use http::HttpConvertClient;
pub use local::LocalConvertClient;
pub use mock::MockConvertClient;

use crate::models::{ConversionRequest, ConversionResult};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ConvertService: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult>;
}
