// Word-list profanity filter.
//
// Matching is case-insensitive on word boundaries, so "assignment" never
// trips over a listed "ass". Redaction replaces each character of a
// matched word with the placeholder glyph, escaping it for markdown
// surfaces when the glyph itself carries formatting meaning.

use std::collections::BTreeSet;

use regex::{Captures, Regex};

use super::default_words::DEFAULT_WORDS;
use super::profanity_filter::{ProfanityFilter, RedactMode};

/// Placeholder glyphs that would be interpreted as formatting in rendered
/// markdown and therefore need a leading escape.
const MARKDOWN_GLYPHS: [char; 6] = ['!', '&', '@', '#', '*', '`'];

/// Built-in [`ProfanityFilter`] backed by a word list.
pub struct WordListFilter {
    // None when the effective word list is empty; nothing can match then.
    pattern: Option<Regex>,
    placeholder: char,
}

impl WordListFilter {
    /// Builds the filter from the built-in list plus `extra_words`, minus
    /// `exempt_words`, with the configured placeholder glyph.
    pub fn new(
        extra_words: &[String],
        exempt_words: &[String],
        placeholder: char,
    ) -> Result<Self, regex::Error> {
        let exempt: BTreeSet<String> = exempt_words
            .iter()
            .map(|word| word.trim().to_lowercase())
            .collect();

        let mut words: BTreeSet<String> = DEFAULT_WORDS
            .iter()
            .map(|word| (*word).to_string())
            .collect();
        words.extend(
            extra_words
                .iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty()),
        );

        let words: Vec<String> = words
            .into_iter()
            .filter(|word| !exempt.contains(word))
            .map(|word| regex::escape(&word))
            .collect();

        let pattern = if words.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|")))?)
        };

        Ok(Self { pattern, placeholder })
    }

    fn redacted_word(&self, word: &str, mode: RedactMode) -> String {
        let escape = mode == RedactMode::Markdown && MARKDOWN_GLYPHS.contains(&self.placeholder);
        let mut out = String::with_capacity(word.len() + 1);
        if escape {
            out.push('\\');
        }
        out.extend(std::iter::repeat(self.placeholder).take(word.chars().count()));
        out
    }
}

impl ProfanityFilter for WordListFilter {
    fn is_offending(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }

    fn redact(&self, text: &str, mode: RedactMode) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &Captures<'_>| {
                    self.redacted_word(&caps[0], mode)
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> WordListFilter {
        WordListFilter::new(&[], &[], '*').expect("default filter should build")
    }

    #[test]
    fn clean_text_is_not_offending_and_unchanged() {
        let filter = filter();
        let text = "A perfectly reasonable bug report about assignments.";
        assert!(!filter.is_offending(text));
        assert_eq!(filter.redact(text, RedactMode::Markdown), text);
    }

    #[test]
    fn detects_forbidden_words_case_insensitively() {
        let filter = filter();
        assert!(filter.is_offending("well FUCK"));
        assert!(filter.is_offending("Shit happens"));
    }

    #[test]
    fn matches_whole_words_only() {
        let filter = filter();
        // "ass" is listed but "assignment" and "class" must not match.
        assert!(!filter.is_offending("the class assignment"));
        assert!(filter.is_offending("what an ass"));
    }

    #[test]
    fn redacts_each_character_of_the_word() {
        let filter = filter();
        assert_eq!(filter.redact("fuck", RedactMode::Plain), "****");
        assert_eq!(
            filter.redact("well fuck that", RedactMode::Plain),
            "well **** that"
        );
    }

    #[test]
    fn markdown_mode_escapes_significant_placeholders() {
        let filter = filter();
        assert_eq!(filter.redact("fuck this", RedactMode::Markdown), "\\**** this");
        // Titles are plain text and never escaped.
        assert_eq!(filter.redact("fuck this", RedactMode::Plain), "**** this");
    }

    #[test]
    fn harmless_placeholders_are_never_escaped() {
        let filter = WordListFilter::new(&[], &[], 'x').expect("filter should build");
        assert_eq!(filter.redact("fuck", RedactMode::Markdown), "xxxx");
    }

    #[test]
    fn redacted_output_is_clean() {
        let filter = filter();
        let redacted = filter.redact("fuck this shit", RedactMode::Markdown);
        assert!(!filter.is_offending(&redacted));
    }

    #[test]
    fn redact_is_idempotent() {
        let filter = filter();
        let once = filter.redact("fuck this", RedactMode::Markdown);
        assert_eq!(filter.redact(&once, RedactMode::Markdown), once);
    }

    #[test]
    fn extra_words_extend_the_list() {
        let filter =
            WordListFilter::new(&["duck".to_string()], &[], '*').expect("filter should build");
        assert!(filter.is_offending("what the duck"));
        assert_eq!(filter.redact("what the Duck", RedactMode::Plain), "what the ****");
    }

    #[test]
    fn exempt_words_are_removed_from_the_list() {
        let filter =
            WordListFilter::new(&[], &["damn".to_string()], '*').expect("filter should build");
        assert!(!filter.is_offending("damn it"));
        // The rest of the list still applies.
        assert!(filter.is_offending("fuck it"));
    }
}
