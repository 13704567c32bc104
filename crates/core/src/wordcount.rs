//! Word counting for the editor's indicator tray.

use std::sync::LazyLock;

use regex::Regex;

/// Punctuation and currency symbols are dropped before counting.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{P}|\p{Sc}").expect("punctuation regex is valid"));

/// Count the words in `text`.
///
/// Punctuation and currency symbols are removed first, so a lone `—` or `$`
/// does not count as a word.
///
/// # Example
///
/// ```
/// use journal_core::word_count;
///
/// assert_eq!(word_count("Hello, world!"), 2);
/// assert_eq!(word_count("  ... "), 0);
/// ```
pub fn word_count(text: &str) -> usize {
    let stripped = PUNCTUATION_RE.replace_all(text, "");
    stripped.split_whitespace().count()
}

/// Daily word goal of a journal entry.
pub const DEFAULT_WORD_TARGET: usize = 750;

/// Whether an entry of `count` words reached `target`.
///
/// ```
/// use journal_core::wordcount::{DEFAULT_WORD_TARGET, is_word_target_met};
///
/// assert!(is_word_target_met(750, DEFAULT_WORD_TARGET));
/// assert!(!is_word_target_met(749, DEFAULT_WORD_TARGET));
/// ```
pub fn is_word_target_met(count: usize, target: usize) -> bool {
    count >= target
}

/// Render a word count the way the indicator shows it.
pub fn describe_word_count(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "1 word".to_string(),
        n => format!("{n} words"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plain_words() {
        assert_eq!(word_count("one two  three\nfour"), 4);
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count(" - , . $ € "), 0);
    }

    #[test]
    fn joined_by_punctuation_counts_once() {
        // "don't" loses its apostrophe and stays one word.
        assert_eq!(word_count("don't stop"), 2);
    }

    #[test]
    fn describes_counts() {
        assert_eq!(describe_word_count(0), "");
        assert_eq!(describe_word_count(1), "1 word");
        assert_eq!(describe_word_count(750), "750 words");
    }

    #[test]
    fn target_is_inclusive() {
        assert!(is_word_target_met(5, 5));
        assert!(!is_word_target_met(4, 5));
        assert!(is_word_target_met(0, 0));
    }
}
