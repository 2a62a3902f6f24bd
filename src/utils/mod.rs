pub mod constants;
pub mod text_cleaning;

pub use constants::*;
pub use text_cleaning::{
    canonicalize_url, collapse_html_whitespace, content_hash, is_invisible_char, sanitize_file_name,
    strip_invisible, url_extension,
};
