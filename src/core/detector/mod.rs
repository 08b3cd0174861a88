// Detector module - the profanity-detection seam.
// `profanity_filter.rs` declares the trait, `word_filter.rs` is the
// built-in word-list implementation.

pub mod profanity_filter;
pub mod word_filter;

mod default_words;

pub use profanity_filter::*;
pub use word_filter::*;
