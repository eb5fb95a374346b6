use collate::{
    BulkMode, Difference, DifferenceIndex, DifferenceKind, DifferenceStatus, PageComparisonSnapshot,
    PageReconciliation,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;

/// One reconciliation scenario loaded from a YAML fixture: a page snapshot,
/// a series of reviewer actions and the state the page must end up in.
#[derive(Debug, Deserialize)]
pub struct ScenarioPage {
    pub name: String,
    original: String,
    reference: String,
    differences: Vec<FixtureDifference>,
    steps: Vec<Step>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct FixtureDifference {
    index: DifferenceIndex,
    kind: FixtureKind,
    #[serde(default)]
    original_segment: String,
    #[serde(default)]
    suggested_segment: String,
    #[serde(default)]
    start_offset: usize,
    #[serde(default)]
    end_offset: usize,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum FixtureKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Apply(DifferenceIndex),
    Ignore(DifferenceIndex),
    Revert(DifferenceIndex),
    ApplyAll,
    IgnoreAll,
    ReplaceAll,
    Reset,
    SetText(String),
}

#[derive(Debug, Deserialize)]
struct Expected {
    text: String,
    bulk_mode: FixtureBulkMode,
    #[serde(default)]
    applied: Vec<DifferenceIndex>,
    #[serde(default)]
    ignored: Vec<DifferenceIndex>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum FixtureBulkMode {
    None,
    Custom,
    ReplacedAll,
    IgnoredAll,
}

impl ScenarioPage {
    pub fn run(self) {
        let snapshot = PageComparisonSnapshot {
            original_text: self.original,
            reference_text: self.reference,
            differences: self.differences.into_iter().map(Into::into).collect(),
        };

        let mut page = PageReconciliation::new(snapshot);

        for step in &self.steps {
            match step {
                Step::Apply(index) => page
                    .apply_difference(*index)
                    .unwrap_or_else(|error| panic!("apply {index} failed in `{}`: {error}", self.name)),
                Step::Ignore(index) => page
                    .ignore_difference(*index)
                    .unwrap_or_else(|error| panic!("ignore {index} failed in `{}`: {error}", self.name)),
                Step::Revert(index) => page
                    .revert_difference(*index)
                    .unwrap_or_else(|error| panic!("revert {index} failed in `{}`: {error}", self.name)),
                Step::ApplyAll => {
                    page.apply_all()
                        .unwrap_or_else(|error| panic!("apply all failed in `{}`: {error}", self.name));
                }
                Step::IgnoreAll => page.ignore_all(),
                Step::ReplaceAll => page.replace_all(),
                Step::Reset => page.reset_to_original(),
                Step::SetText(text) => page.set_text(text.clone()),
            }
        }

        assert_eq!(page.editable_text(), self.expected.text, "text in `{}`", self.name);
        assert_eq!(
            page.bulk_mode(),
            self.expected.bulk_mode.into(),
            "bulk mode in `{}`",
            self.name
        );
        assert_eq!(
            page.indices_with_status(DifferenceStatus::Applied),
            self.expected.applied,
            "applied set in `{}`",
            self.name
        );
        assert_eq!(
            page.indices_with_status(DifferenceStatus::Ignored),
            self.expected.ignored,
            "ignored set in `{}`",
            self.name
        );
    }
}

impl From<FixtureDifference> for Difference {
    fn from(fixture: FixtureDifference) -> Self {
        Self {
            index: fixture.index,
            kind: match fixture.kind {
                FixtureKind::Equal => DifferenceKind::Equal,
                FixtureKind::Insert => DifferenceKind::Insert,
                FixtureKind::Delete => DifferenceKind::Delete,
                FixtureKind::Replace => DifferenceKind::Replace,
            },
            original_segment: fixture.original_segment,
            suggested_segment: fixture.suggested_segment,
            start_offset: fixture.start_offset,
            end_offset: fixture.end_offset,
        }
    }
}

impl From<FixtureBulkMode> for BulkMode {
    fn from(fixture: FixtureBulkMode) -> Self {
        match fixture {
            FixtureBulkMode::None => Self::None,
            FixtureBulkMode::Custom => Self::Custom,
            FixtureBulkMode::ReplacedAll => Self::ReplacedAll,
            FixtureBulkMode::IgnoredAll => Self::IgnoredAll,
        }
    }
}
