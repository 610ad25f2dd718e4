use itertools::Itertools;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Character classes a race may require the typist to enter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterOptions {
    pub include_numbers: bool,
    pub include_punctuation: bool,
    pub include_capitals: bool,
    pub include_non_standard: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            include_numbers: true,
            include_punctuation: true,
            include_capitals: true,
            include_non_standard: true,
        }
    }
}

impl FilterOptions {
    /// Whether `c` survives class-based removal. Whitespace always survives
    /// here and is normalized afterwards; other control characters never do.
    pub fn allows(&self, c: char) -> bool {
        if c.is_whitespace() {
            return true;
        }
        if c.is_control() {
            return false;
        }
        if !self.include_non_standard && !is_standard(c) {
            return false;
        }
        if !self.include_numbers && c.is_numeric() {
            return false;
        }
        if !self.include_punctuation && is_punctuation(c) {
            return false;
        }
        true
    }
}

/// Printable ASCII, space through tilde
fn is_standard(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Anything visible that is neither a letter nor a digit counts as punctuation or a symbol
fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() && !is_mark(c)
}

/// Zero-width marks such as combining accents belong to the character before them
fn is_mark(c: char) -> bool {
    !c.is_control() && c.width() == Some(0)
}

/// Normalize raw source text into what a race will ask the typist to type.
///
/// Letters are folded to lowercase first (when capitals are disabled) so the
/// class checks run on the characters that will actually be emitted. Any run
/// of whitespace left behind collapses to a single space and the ends are
/// trimmed. A combining mark is kept only when the character it modifies was.
/// The result may be empty; callers treat that as no content.
pub fn apply_filters(raw: &str, options: &FilterOptions) -> String {
    let mut kept = String::with_capacity(raw.len());
    let mut base_kept = false;

    for c in raw.chars() {
        if is_mark(c) {
            if base_kept && options.allows(c) {
                kept.push(c);
            }
            continue;
        }

        let before = kept.len();
        if options.include_capitals {
            if options.allows(c) {
                kept.push(c);
            }
        } else {
            kept.extend(c.to_lowercase().filter(|lc| options.allows(*lc)));
        }
        base_kept = kept.len() > before && !c.is_whitespace();
    }

    kept.split_whitespace().join(" ")
}
