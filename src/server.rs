//! HTTP conversion endpoint
//!
//! `POST /api/convert` accepts `{imageSrc, format, originalName?}` and answers
//! with `{name, size, data}`. Every failure, including a body that is not
//! valid JSON, is reported as a 500 with a generic message; the cause is
//! only logged.

use crate::codec::{convert_request, ImageCodec};
use crate::models::{Config, ConversionRequest, ConversionResult, ErrorResponse};
use crate::{Error, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub const CONVERT_ERROR_MESSAGE: &str = "Error converting image";

#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<dyn ImageCodec>,
}

impl AppState {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }
}

/// Failure of a single conversion request.
pub struct ConvertError(Error);

impl From<Error> for ConvertError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        error!("{}: {}", CONVERT_ERROR_MESSAGE, self.0);
        let body = ErrorResponse {
            error: CONVERT_ERROR_MESSAGE.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/convert", post(convert_image))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// The body is buffered and parsed by hand so oversized or malformed bodies
// take the same 500 path as every other conversion failure instead of
// axum's 4xx rejections.
async fn convert_image(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Json<ConversionResult>, ConvertError> {
    let body = body.map_err(|rejection| Error::Request(rejection.body_text()))?;
    let request: ConversionRequest = serde_json::from_slice(&body).map_err(Error::from)?;

    let result = convert_request(state.codec.as_ref(), &request).await?;
    info!(
        "Converted {} to {} (data URL of {} chars -> {} bytes)",
        request.original_name.as_deref().unwrap_or("image"),
        request.format,
        request.image_src.len(),
        result.size
    );

    Ok(Json(result))
}

/// Bind `config.bind_addr` and serve until the process is stopped.
pub async fn serve(config: &Config, codec: Arc<dyn ImageCodec>) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(codec), config.max_body_bytes)).await?;
    Ok(())
}
