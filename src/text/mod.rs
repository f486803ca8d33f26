//! Text preparation — sanitization, validation, and sentence-aware
//! segmentation ahead of the rewrite/synthesis pipeline.

pub mod sanitize;
pub mod segment;

pub use sanitize::{mask_key, sanitize, validate, ValidationError, MAX_CHARS};
pub use segment::{split, TextSegment};
