//! Upload handling stages that run before classification.
//!
//! - **validate**: content type, size and magic-byte checks
//! - **decode**: format detection and decoding on the blocking pool
//! - **hash**: BLAKE3 content hash of the raw upload

pub mod decode;
pub mod hash;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use hash::content_hash;
pub use validate::{is_image_content_type, Validator};
