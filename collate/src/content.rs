#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Page text as delivered by the extraction pipeline: either a plain string
/// or a list of layout blocks. The shape is sniffed exactly once, at the
/// ingestion boundary, by calling [`TextContent::resolve`]; everything
/// downstream works on the resolved plain string.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    PlainText(String),
    Blocks(Vec<TextBlock>),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub alignment: BlockAlignment,

    #[cfg_attr(feature = "serde", serde(default))]
    pub is_bold: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub is_italic: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl TextContent {
    /// Flatten to the plain text the reconciliation engine works on.
    /// Emphasis and alignment are presentation-only and do not survive.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
