pub mod text;

pub use text::{fingerprint, sanitize_caption, truncate_with_ellipsis};
