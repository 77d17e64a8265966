//! Canonical forms of free-text test names.
//!
//! Both forms are comparison keys only: they are recomputed on demand and
//! never shown to the user or stored.

/// Word-canonical form: lower-cased, punctuation stripped, whitespace tokens
/// sorted and concatenated with no separator.
///
/// "Total Cholesterol" and "cholesterol, total" both become
/// `"cholesteroltotal"`.
pub fn word_canonical(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.concat()
}

/// Character-canonical form: lower-cased, every non-alphanumeric character
/// (whitespace included) removed, remaining characters sorted.
pub fn char_canonical(name: &str) -> String {
    let mut chars: Vec<char> = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Both canonical forms of one name, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub words: String,
    pub chars: String,
}

impl CanonicalName {
    pub fn of(name: &str) -> Self {
        Self {
            words: word_canonical(name),
            chars: char_canonical(name),
        }
    }
}
