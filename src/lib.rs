//! Image format converter
//!
//! An HTTP endpoint that re-encodes base64 data-URL images to WebP, AVIF,
//! JPEG or PNG, and the client-side controller that feeds it a batch of
//! files one request at a time and collects the results.

pub mod client;
pub mod codec;
pub mod controller;
pub mod data_url;
pub mod error;
pub mod models;
pub mod naming;
pub mod progress;
pub mod server;

pub use error::{Error, Result};
