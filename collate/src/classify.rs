//! Pure text-comparison helpers used to score and label differences for the
//! reviewer. Deterministic: identical inputs always yield identical outputs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::difference::{Difference, DifferenceKind};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    FalsePositive,
    MissingText,
    ExtraText,
    Spelling,
    Character,
    PartialMatch,
    Punctuation,
    Transposition,
    WordSubstitution,
    Unknown,
}

impl ErrorCategory {
    /// Stable machine-readable identifier.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::FalsePositive => "false-positive",
            Self::MissingText => "missing-text",
            Self::ExtraText => "extra-text",
            Self::Spelling => "spelling",
            Self::Character => "character",
            Self::PartialMatch => "partial-match",
            Self::Punctuation => "punctuation",
            Self::Transposition => "transposition",
            Self::WordSubstitution => "word-substitution",
            Self::Unknown => "unknown",
        }
    }

    /// Reviewer-facing label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FalsePositive => "False positive (identical text)",
            Self::MissingText => "Missing text",
            Self::ExtraText => "Extra text",
            Self::Spelling => "Spelling error",
            Self::Character => "Character error",
            Self::PartialMatch => "Partial match",
            Self::Punctuation => "Punctuation error",
            Self::Transposition => "Letter transposition",
            Self::WordSubstitution => "Word substitution",
            Self::Unknown => "Unknown error",
        }
    }
}

/// How one difference should be presented to the reviewer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub category: ErrorCategory,
    pub similarity: f64,
    pub tier: ConfidenceTier,
}

/// Classic Levenshtein edit distance over characters, with unit cost for
/// insertion, deletion and substitution. O(|a|·|b|) time; only two DP rows
/// are kept, so space is O(min(|a|,|b|)).
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let (longer, shorter) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return longer.len();
    }

    let mut previous: Vec<usize> = (0..=shorter.len()).collect();
    for (row, long_char) in longer.iter().enumerate() {
        let mut current = Vec::with_capacity(shorter.len() + 1);
        current.push(row + 1);

        for (column, short_char) in shorter.iter().enumerate() {
            let substitution = previous[column] + usize::from(long_char != short_char);
            let deletion = previous[column + 1] + 1;
            let insertion = current[column] + 1;
            current.push(substitution.min(deletion).min(insertion));
        }

        previous = current;
    }

    previous[shorter.len()]
}

/// Character-level similarity in `[0, 1]`; `1.0` when both strings are
/// empty.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    (longest - edit_distance(a, b)) as f64 / longest as f64
}

#[must_use]
pub fn confidence_tier(similarity: f64) -> ConfidenceTier {
    if similarity > 0.9 {
        ConfidenceTier::High
    } else if similarity > 0.7 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Sort one difference into the error taxonomy. The checks run in a fixed
/// order; comparisons are made on trimmed, lowercased inputs so that pure
/// casing disagreements surface as false positives.
#[must_use]
pub fn categorize(original: &str, suggested: &str, kind: DifferenceKind) -> ErrorCategory {
    let original = original.trim().to_lowercase();
    let suggested = suggested.trim().to_lowercase();

    if original.is_empty() && suggested.is_empty() {
        return ErrorCategory::Unknown;
    }

    if original == suggested {
        return ErrorCategory::FalsePositive;
    }

    match kind {
        DifferenceKind::Insert => ErrorCategory::MissingText,
        DifferenceKind::Delete => ErrorCategory::ExtraText,
        DifferenceKind::Replace => categorize_replacement(&original, &suggested),
        DifferenceKind::Equal => ErrorCategory::Unknown,
    }
}

fn categorize_replacement(original: &str, suggested: &str) -> ErrorCategory {
    if similarity(original, suggested) > 0.8 {
        return ErrorCategory::Spelling;
    }

    if original.chars().count() == 1 && suggested.chars().count() == 1 {
        return ErrorCategory::Character;
    }

    if original.contains(suggested) || suggested.contains(original) {
        return ErrorCategory::PartialMatch;
    }

    if has_punctuation(original) || has_punctuation(suggested) {
        return ErrorCategory::Punctuation;
    }

    if sorted_characters(original) == sorted_characters(suggested) {
        return ErrorCategory::Transposition;
    }

    ErrorCategory::WordSubstitution
}

fn has_punctuation(text: &str) -> bool {
    text.chars()
        .any(|character| !character.is_alphanumeric() && !character.is_whitespace())
}

fn sorted_characters(text: &str) -> Vec<char> {
    let mut characters: Vec<char> = text.chars().collect();
    characters.sort_unstable();
    characters
}

/// Bundle everything the reviewer sees about one difference.
#[must_use]
pub fn assess(difference: &Difference) -> Assessment {
    let similarity = similarity(
        &difference.original_segment.to_lowercase(),
        &difference.suggested_segment.to_lowercase(),
    );

    Assessment {
        category: categorize(
            &difference.original_segment,
            &difference.suggested_segment,
            difference.kind,
        ),
        similarity,
        tier: confidence_tier(similarity),
    }
}
