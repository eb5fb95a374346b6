//! Applies or reverts one [`Difference`] against a text buffer.
//!
//! Two strategies are supported and the caller picks one. Offset-based
//! splicing is only correct while no other difference has mutated the buffer
//! relative to the pristine original text; to keep a stale offset from
//! silently corrupting the page, the slice at the recorded range is verified
//! against the expected segment first and a mismatch surfaces as
//! [`CollateError::PatchMiss`]. Content-based substring search stays correct
//! regardless of prior mutations, but is ambiguous when the segment occurs
//! more than once: the first occurrence wins. That limitation is accepted,
//! not worked around.
//!
//! All indices are character indices, never byte indices, so both strategies
//! are safe on multi-byte UTF-8 text.

use core::ops::Range;

use crate::{
    difference::{Difference, DifferenceKind},
    errors::CollateError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStrategy {
    /// Splice at the difference's recorded `[start_offset, end_offset)`
    /// range. Only correct against the pristine original text.
    Offset,

    /// Substitute the first literal occurrence of the segment to find.
    Content,
}

/// Patch `text` so that it reflects the difference's suggestion: insert or
/// substitute `suggested_segment`, or remove `original_segment`.
///
/// Insertions have no searchable segment (their `original_segment` is
/// empty), so under the content strategy they anchor on the recorded start
/// offset clamped into range.
///
/// # Errors
///
/// Returns [`CollateError::PatchMiss`] when the segment to find is absent
/// from `text`; the buffer is left untouched.
pub fn apply(text: &str, difference: &Difference, strategy: PatchStrategy) -> Result<String, CollateError> {
    match difference.kind {
        DifferenceKind::Equal => Ok(text.to_owned()),
        DifferenceKind::Insert => insert_at(
            text,
            difference.start_offset,
            &difference.suggested_segment,
            strategy,
        ),
        DifferenceKind::Delete => substitute(
            text,
            &difference.original_segment,
            "",
            difference.start_offset..difference.end_offset,
            difference.start_offset,
            strategy,
        ),
        DifferenceKind::Replace => substitute(
            text,
            &difference.original_segment,
            &difference.suggested_segment,
            difference.start_offset..difference.end_offset,
            difference.start_offset,
            strategy,
        ),
    }
}

/// Inverse of [`apply`]: restore `original_segment` where the suggestion was
/// applied. The content strategy searches for `suggested_segment` to locate
/// the patch; reverting a deletion has nothing to search for and anchors on
/// the recorded start offset.
///
/// # Errors
///
/// Returns [`CollateError::PatchMiss`] when the applied segment cannot be
/// located in `text`; the buffer is left untouched.
pub fn revert(text: &str, difference: &Difference, strategy: PatchStrategy) -> Result<String, CollateError> {
    let applied_range = difference.start_offset
        ..difference.start_offset + difference.suggested_segment.chars().count();

    match difference.kind {
        DifferenceKind::Equal => Ok(text.to_owned()),
        DifferenceKind::Insert => substitute(
            text,
            &difference.suggested_segment,
            "",
            applied_range,
            difference.start_offset,
            strategy,
        ),
        DifferenceKind::Delete => insert_at(
            text,
            difference.start_offset,
            &difference.original_segment,
            strategy,
        ),
        DifferenceKind::Replace => substitute(
            text,
            &difference.suggested_segment,
            &difference.original_segment,
            applied_range,
            difference.start_offset,
            strategy,
        ),
    }
}

/// Replace `needle` with `replacement`, locating it either at `offset_range`
/// or by substring search. An empty needle degenerates to an insertion at
/// `anchor`.
fn substitute(
    text: &str,
    needle: &str,
    replacement: &str,
    offset_range: Range<usize>,
    anchor: usize,
    strategy: PatchStrategy,
) -> Result<String, CollateError> {
    if needle.is_empty() {
        return insert_at(text, anchor, replacement, strategy);
    }

    let range = match strategy {
        PatchStrategy::Offset => {
            if char_slice(text, &offset_range).as_deref() != Some(needle) {
                return Err(CollateError::PatchMiss(needle.to_owned()));
            }
            offset_range
        }
        PatchStrategy::Content => {
            let start = find(text, needle)
                .ok_or_else(|| CollateError::PatchMiss(needle.to_owned()))?;
            start..start + needle.chars().count()
        }
    };

    Ok(splice(text, &range, replacement))
}

fn insert_at(
    text: &str,
    anchor: usize,
    segment: &str,
    strategy: PatchStrategy,
) -> Result<String, CollateError> {
    let length = text.chars().count();

    let at = match strategy {
        PatchStrategy::Offset if anchor > length => {
            return Err(CollateError::PatchMiss(segment.to_owned()));
        }
        PatchStrategy::Offset => anchor,
        PatchStrategy::Content => anchor.min(length),
    };

    Ok(splice(text, &(at..at), segment))
}

/// Character index of the first occurrence of `needle` in `text`.
fn find(text: &str, needle: &str) -> Option<usize> {
    text.find(needle)
        .map(|byte_index| text[..byte_index].chars().count())
}

/// The characters of `text` at `range`, or `None` when the range runs past
/// the end.
fn char_slice(text: &str, range: &Range<usize>) -> Option<String> {
    let slice: String = text
        .chars()
        .skip(range.start)
        .take(range.end.saturating_sub(range.start))
        .collect();

    (slice.chars().count() == range.end.saturating_sub(range.start)).then_some(slice)
}

fn splice(text: &str, range: &Range<usize>, replacement: &str) -> String {
    text.chars()
        .take(range.start)
        .chain(replacement.chars())
        .chain(text.chars().skip(range.end))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    fn replacement(original: &str, suggested: &str, start: usize, end: usize) -> Difference {
        Difference {
            index: 0,
            kind: DifferenceKind::Replace,
            original_segment: original.to_owned(),
            suggested_segment: suggested.to_owned(),
            start_offset: start,
            end_offset: end,
        }
    }

    #[test]
    fn test_offset_apply_splices_at_the_recorded_range() {
        let difference = replacement("Helllo", "Hello", 0, 6);

        assert_eq!(
            apply("Helllo wrold", &difference, PatchStrategy::Offset),
            Ok("Hello wrold".to_owned())
        );
    }

    #[test]
    fn test_offset_apply_rejects_a_stale_range() {
        // The buffer has shifted by one character relative to the original,
        // so the recorded range no longer covers the segment.
        let difference = replacement("wrold", "world", 7, 12);

        assert_eq!(
            apply("Helo wrold", &difference, PatchStrategy::Offset),
            Err(CollateError::PatchMiss("wrold".to_owned()))
        );
    }

    #[test]
    fn test_content_apply_finds_the_segment_wherever_it_is() {
        let difference = replacement("wrold", "world", 7, 12);

        assert_eq!(
            apply("Helo wrold", &difference, PatchStrategy::Content),
            Ok("Helo world".to_owned())
        );
    }

    #[test]
    fn test_content_apply_takes_the_first_occurrence() {
        let difference = replacement("aa", "bb", 0, 2);

        assert_eq!(
            apply("aa aa", &difference, PatchStrategy::Content),
            Ok("bb aa".to_owned())
        );
    }

    #[test]
    fn test_apply_is_a_no_op_when_the_segment_is_absent() {
        let difference = replacement("missing", "found", 0, 7);

        assert_eq!(
            apply("some text", &difference, PatchStrategy::Content),
            Err(CollateError::PatchMiss("missing".to_owned()))
        );
    }

    #[test]
    fn test_insert_apply_and_revert() {
        let difference = Difference {
            index: 3,
            kind: DifferenceKind::Insert,
            original_segment: String::new(),
            suggested_segment: "quick ".to_owned(),
            start_offset: 4,
            end_offset: 4,
        };

        let patched = apply("the brown fox", &difference, PatchStrategy::Content)
            .expect("insert must succeed");
        assert_eq!(patched, "the quick brown fox");

        let reverted =
            revert(&patched, &difference, PatchStrategy::Content).expect("revert must succeed");
        assert_eq!(reverted, "the brown fox");
    }

    #[test]
    fn test_delete_apply_and_revert() {
        let difference = Difference {
            index: 1,
            kind: DifferenceKind::Delete,
            original_segment: "very ".to_owned(),
            suggested_segment: String::new(),
            start_offset: 2,
            end_offset: 7,
        };

        let patched =
            apply("a very good day", &difference, PatchStrategy::Content).expect("delete");
        assert_eq!(patched, "a good day");

        let reverted = revert(&patched, &difference, PatchStrategy::Content).expect("revert");
        assert_eq!(reverted, "a very good day");
    }

    #[test_case("Helllo wrold", "Helllo", "Hello", 0, 6)]
    #[test_case("the griy cat", "griy", "grey", 4, 8)]
    #[test_case("naïve café", "café", "cafe", 6, 10; "multibyte segments")]
    fn test_revert_after_apply_restores_the_text(
        text: &str,
        original: &str,
        suggested: &str,
        start: usize,
        end: usize,
    ) {
        let difference = replacement(original, suggested, start, end);

        let patched = apply(text, &difference, PatchStrategy::Content).expect("apply");
        let reverted = revert(&patched, &difference, PatchStrategy::Content).expect("revert");

        assert_eq!(reverted, text);
    }

    #[test]
    fn test_offset_insert_past_the_end_is_a_miss() {
        let difference = Difference {
            index: 0,
            kind: DifferenceKind::Insert,
            original_segment: String::new(),
            suggested_segment: "tail".to_owned(),
            start_offset: 99,
            end_offset: 99,
        };

        assert_eq!(
            apply("short", &difference, PatchStrategy::Offset),
            Err(CollateError::PatchMiss("tail".to_owned()))
        );
    }

    #[test]
    fn test_equal_differences_are_never_patched() {
        let difference = Difference {
            index: 0,
            kind: DifferenceKind::Equal,
            original_segment: "same".to_owned(),
            suggested_segment: "same".to_owned(),
            start_offset: 0,
            end_offset: 4,
        };

        assert_eq!(
            apply("same text", &difference, PatchStrategy::Content),
            Ok("same text".to_owned())
        );
    }
}
