/// How redacted text treats the placeholder glyph.
///
/// Bodies and comments render as markdown, where glyphs like `*` would be
/// interpreted as formatting; titles render as plain text and never need
/// escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactMode {
    Plain,
    Markdown,
}

/// Seam between the moderation engine and any concrete detection library.
///
/// Both functions must be pure: same text and configuration, same answer,
/// with no network or clock dependency.
pub trait ProfanityFilter: Send + Sync {
    /// Whether the text contains forbidden language.
    fn is_offending(&self, text: &str) -> bool;

    /// Rewrites every forbidden word, replacing each of its characters
    /// with the placeholder glyph. Clean text comes back unchanged, and
    /// redacted output is itself clean.
    fn redact(&self, text: &str, mode: RedactMode) -> String;
}
