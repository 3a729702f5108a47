// ABOUTME: Field-level extraction: selection specs, element selection, postprocessing and dates.
// ABOUTME: The article assembler combines these with the readability fallback.

pub mod article;
pub mod datetime;
pub mod postprocess;
pub mod select;
pub mod spec;
