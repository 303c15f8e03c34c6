//! Output filename derivation for converted images.

use crate::models::TargetFormat;

/// Marker appended to the original stem of every named conversion.
pub const CONVERTED_SUFFIX: &str = "-cwd-conv";

const DEFAULT_STEM: &str = "converted";

/// Derive the name of a converted file.
///
/// With an original name the last extension is replaced:
/// `photo.png` -> `photo-cwd-conv.webp`. Without one (or an empty one) the
/// result is `converted.<ext>`.
pub fn converted_name(original: Option<&str>, format: TargetFormat) -> String {
    match original.filter(|name| !name.is_empty()) {
        Some(name) => format!(
            "{}{}.{}",
            strip_extension(name),
            CONVERTED_SUFFIX,
            format.extension()
        ),
        None => format!("{}.{}", DEFAULT_STEM, format.extension()),
    }
}

/// Name offered for the combined download of a whole run.
pub fn download_name(format: TargetFormat) -> String {
    format!("converted_images.{}", format.extension())
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
