//! Value types shared by the client and the MCP tool layer.

use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::VaultError;

/// How patched content is combined with the target section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Append,
    Prepend,
    Replace,
}

impl PatchOperation {
    pub const ALL: [PatchOperation; 3] = [Self::Append, Self::Prepend, Self::Replace];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Replace => "replace",
        }
    }
}

/// The kind of anchor a patch is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Heading,
    Block,
    Frontmatter,
}

impl TargetType {
    pub const ALL: [TargetType; 3] = [Self::Heading, Self::Block, Self::Frontmatter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Block => "block",
            Self::Frontmatter => "frontmatter",
        }
    }
}

/// Calendar period of a periodic note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// Where content is added relative to a heading's section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeadingPosition {
    Start,
    #[default]
    End,
}

impl HeadingPosition {
    pub fn operation(self) -> PatchOperation {
        match self {
            Self::Start => PatchOperation::Prepend,
            Self::End => PatchOperation::Append,
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = VaultError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| {
                        let valid = <$ty>::ALL.map(|value| value.as_str()).join(", ");
                        VaultError::invalid_argument(format!(
                            "{} must be one of: {}",
                            $label, valid
                        ))
                    })
            }
        }
    };
}

impl_str_enum!(PatchOperation, "Operation");
impl_str_enum!(TargetType, "Target type");
impl_str_enum!(Period, "Period");

/// Optional behaviors of a patch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Create the target when it does not exist yet.
    pub create_if_missing: bool,
    /// Ignore surrounding whitespace when matching the target.
    pub trim_whitespace: bool,
}

/// One document returned by the simple text search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub filename: String,
    pub score: f64,
    pub matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchMatch {
    #[serde(rename = "match")]
    pub span: MatchSpan,
    pub context: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchSpan {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListing {
    pub files: Vec<String>,
}
