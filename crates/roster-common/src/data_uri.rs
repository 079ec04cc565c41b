//! Inline `data:` URIs for binary column values
//!
//! Photos are stored as raw bytes. Clients receive them embedded in JSON as
//! `data:<mime>;base64,<payload>`, with the MIME type sniffed from a small
//! magic-number table. Unknown content is labelled JPEG.

use base64::{engine::general_purpose::STANDARD, Engine as _};

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8];
const GIF_MAGIC: &[u8] = b"GIF8";
const RIFF_MAGIC: &[u8] = b"RIFF";

/// MIME type assumed when no magic number matches.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Pick an image MIME type from the leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PNG_MAGIC) {
        "image/png"
    } else if bytes.starts_with(JPEG_MAGIC) {
        "image/jpeg"
    } else if bytes.starts_with(GIF_MAGIC) {
        "image/gif"
    } else if bytes.starts_with(RIFF_MAGIC) {
        "image/webp"
    } else {
        DEFAULT_IMAGE_MIME
    }
}

/// Encode bytes as a `data:` URI with a sniffed MIME type.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_image_mime(bytes), STANDARD.encode(bytes))
}
