//! Data URL helpers
//!
//! Images travel between the controller and the endpoint as
//! `data:<mime>;base64,<payload>` strings.

use crate::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

// Accepts payloads with or without trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Return the base64 segment following the first comma.
pub fn payload(src: &str) -> Result<&str> {
    let mut parts = src.split(',');
    parts.next();
    parts
        .next()
        .ok_or_else(|| Error::DataUrl("missing comma-separated payload".to_string()))
}

/// Decode the payload of a data URL into raw bytes.
pub fn decode(src: &str) -> Result<Vec<u8>> {
    let payload = payload(src)?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::DataUrl("empty payload".to_string()));
    }
    Ok(LENIENT.decode(compact)?)
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
