//! Equivalence decision between two free-text test names.
//!
//! Word-level comparison first; a character-bag fallback only when the two
//! names have a similar number of distinctive characters. The length ratio is
//! the false-positive guard for short acronyms and must stay at 0.8 on the
//! character-canonical lengths.

use serde::Serialize;

use super::normalize::CanonicalName;

/// Minimum `shorter / longer` character-canonical length for the
/// character-level fallback to apply.
pub const SIMILARITY_LENGTH_RATIO: f64 = 0.8;

/// Which rule declared two names equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same words, any order, case and punctuation ignored.
    SameWords,
    /// Same multiset of letters and digits.
    SameCharacters,
    /// One sorted character string is a contiguous run of the other.
    ContainedCharacters,
}

/// Decide equivalence on precomputed canonical forms.
pub fn match_canonical(a: &CanonicalName, b: &CanonicalName) -> Option<MatchKind> {
    if a.words == b.words {
        return Some(MatchKind::SameWords);
    }

    let (shorter, longer) = if a.chars.len() <= b.chars.len() {
        (&a.chars, &b.chars)
    } else {
        (&b.chars, &a.chars)
    };

    // Empty names never match through the character branch.
    if shorter.is_empty() {
        return None;
    }

    let ratio = shorter.len() as f64 / longer.len() as f64;
    if ratio < SIMILARITY_LENGTH_RATIO {
        return None;
    }

    if shorter == longer {
        Some(MatchKind::SameCharacters)
    } else if longer.contains(shorter.as_str()) {
        Some(MatchKind::ContainedCharacters)
    } else {
        None
    }
}

/// Decide equivalence of two raw names, reporting the rule that matched.
pub fn match_names(a: &str, b: &str) -> Option<MatchKind> {
    match_canonical(&CanonicalName::of(a), &CanonicalName::of(b))
}

/// True when both names denote the same measurement.
pub fn are_equivalent(a: &str, b: &str) -> bool {
    match_names(a, b).is_some()
}

/// A target name with its canonical forms computed once, for matching many
/// candidates against it.
#[derive(Debug, Clone)]
pub struct TestNameMatcher {
    target: String,
    canonical: CanonicalName,
}

impl TestNameMatcher {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            canonical: CanonicalName::of(target),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn matches(&self, candidate: &str) -> Option<MatchKind> {
        let kind = match_canonical(&CanonicalName::of(candidate), &self.canonical);
        tracing::trace!(target_name = %self.target, candidate, ?kind, "Name match decision");
        kind
    }
}
