pub mod data_url;
pub mod image_hash;

pub use data_url::{image_data_url, sniff_mime_type};
pub use image_hash::image_cache_key;
