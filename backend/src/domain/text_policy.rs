//! Allowed-character policy for feedback text.
//!
//! Every character must be a Unicode letter or number (general categories
//! `L` and `N`), one of the ASCII whitespace characters, or one of a fixed
//! set of punctuation marks. Combining marks are rejected even where
//! `char::is_alphanumeric` would accept them.

use std::sync::OnceLock;

use regex::Regex;

const WHITESPACE: [char; 6] = [' ', '\t', '\n', '\u{0B}', '\u{0C}', '\r'];

const PUNCTUATION: [char; 32] = [
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '<', '>', '"', '\'', '/', '\\',
    '|', '@', '#', '$', '%', '^', '&', '*', '-', '_', '=', '+', '~', '`',
];

static PERMITTED_TEXT_RE: OnceLock<Regex> = OnceLock::new();

fn permitted_text_regex() -> &'static Regex {
    PERMITTED_TEXT_RE.get_or_init(|| {
        let mut class = String::from(r"\p{L}\p{N}");
        for c in WHITESPACE.iter().chain(PUNCTUATION.iter()) {
            class.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
        let pattern = format!("^[{class}]*$");
        Regex::new(&pattern)
            .unwrap_or_else(|error| panic!("text policy regex failed to compile: {error}"))
    })
}

/// Whether a single character is allowed in feedback text.
pub fn is_permitted_char(c: char) -> bool {
    is_permitted_text(c.encode_utf8(&mut [0; 4]))
}

/// Whether every character of `text` is allowed.
///
/// # Examples
/// ```
/// use feedback_backend::domain::is_permitted_text;
///
/// assert!(is_permitted_text("Great course! Ask (lots of) questions."));
/// assert!(is_permitted_text("Très bon cours, 10/10"));
/// assert!(!is_permitted_text("Loved it 🎉"));
/// ```
pub fn is_permitted_text(text: &str) -> bool {
    permitted_text_regex().is_match(text)
}
