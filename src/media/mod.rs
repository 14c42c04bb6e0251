pub mod detection;
pub mod types;

pub use detection::{PNG_SIGNATURE, has_png_signature, is_png_mime, sniff_png};
pub use types::{ImageFormat, ImagePayload};
