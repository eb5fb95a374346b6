use collate::{
    Difference, DifferenceIndex, DifferenceKind,
    content::{BlockAlignment, TextBlock, TextContent},
};
use schemars::JsonSchema;
use serde::{self, Deserialize, Serialize};

/// A precomputed comparison snapshot for one page. Text fields accept either
/// a plain string or a list of layout blocks — the shape is resolved here,
/// once, and only the flattened text is stored.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestPageComparison {
    pub original: TextContentUpload,
    pub reference: TextContentUpload,
    pub differences: Vec<DifferenceUpload>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TextContentUpload {
    Plain(String),
    Formatted { blocks: Vec<TextBlockUpload> },
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextBlockUpload {
    pub text: String,

    #[serde(default)]
    pub alignment: BlockAlignmentUpload,

    #[serde(default)]
    pub is_bold: bool,

    #[serde(default)]
    pub is_italic: bool,
}

#[derive(Debug, Deserialize, JsonSchema, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockAlignmentUpload {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceUpload {
    pub index: DifferenceIndex,

    #[serde(rename = "type")]
    pub kind: DifferenceKindUpload,

    #[serde(default)]
    pub original_segment: String,

    #[serde(default)]
    pub suggested_segment: String,

    #[serde(default)]
    pub start_offset: usize,

    #[serde(default)]
    pub end_offset: usize,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKindUpload {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// The reviewer's corrected text for one page, together with the decision
/// bookkeeping so a session can resume exactly.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePageCorrection {
    pub text: String,

    #[serde(default)]
    pub applied_indices: Vec<DifferenceIndex>,

    #[serde(default)]
    pub ignored_indices: Vec<DifferenceIndex>,
}

impl From<TextContentUpload> for TextContent {
    fn from(upload: TextContentUpload) -> Self {
        match upload {
            TextContentUpload::Plain(text) => Self::PlainText(text),
            TextContentUpload::Formatted { blocks } => {
                Self::Blocks(blocks.into_iter().map(Into::into).collect())
            }
        }
    }
}

impl From<TextBlockUpload> for TextBlock {
    fn from(upload: TextBlockUpload) -> Self {
        Self {
            text: upload.text,
            alignment: match upload.alignment {
                BlockAlignmentUpload::Left => BlockAlignment::Left,
                BlockAlignmentUpload::Center => BlockAlignment::Center,
                BlockAlignmentUpload::Right => BlockAlignment::Right,
            },
            is_bold: upload.is_bold,
            is_italic: upload.is_italic,
        }
    }
}

impl From<DifferenceUpload> for Difference {
    fn from(upload: DifferenceUpload) -> Self {
        Self {
            index: upload.index,
            kind: upload.kind.into(),
            original_segment: upload.original_segment,
            suggested_segment: upload.suggested_segment,
            start_offset: upload.start_offset,
            end_offset: upload.end_offset,
        }
    }
}

impl From<DifferenceKindUpload> for DifferenceKind {
    fn from(upload: DifferenceKindUpload) -> Self {
        match upload {
            DifferenceKindUpload::Equal => Self::Equal,
            DifferenceKindUpload::Insert => Self::Insert,
            DifferenceKindUpload::Delete => Self::Delete,
            DifferenceKindUpload::Replace => Self::Replace,
        }
    }
}

impl From<DifferenceKind> for DifferenceKindUpload {
    fn from(kind: DifferenceKind) -> Self {
        match kind {
            DifferenceKind::Equal => Self::Equal,
            DifferenceKind::Insert => Self::Insert,
            DifferenceKind::Delete => Self::Delete,
            DifferenceKind::Replace => Self::Replace,
        }
    }
}
