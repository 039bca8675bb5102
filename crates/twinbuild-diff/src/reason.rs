//! Reason codes attached to a differing file.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a file present in both images was reported as different.
///
/// Parsing never fails: codes this crate does not know are kept verbatim
/// as [`ReasonCode::Other`] so they still show up in violation messages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReasonCode {
    /// Modification time differs. Expected between independent builds.
    Time,
    /// File content differs.
    Content,
    /// File size differs.
    Size,
    /// Mode bits differ.
    Permissions,
    /// Owning user or group differs.
    Owner,
    /// File type differs (e.g. regular file vs. symlink).
    Type,
    /// Any other code emitted by the diff tool.
    Other(String),
}

impl ReasonCode {
    /// Returns the wire spelling of this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Time => "time",
            Self::Content => "content",
            Self::Size => "size",
            Self::Permissions => "permissions",
            Self::Owner => "owner",
            Self::Type => "type",
            Self::Other(code) => code,
        }
    }
}

impl FromStr for ReasonCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "time" => Self::Time,
            "content" => Self::Content,
            "size" => Self::Size,
            "permissions" => Self::Permissions,
            "owner" => Self::Owner,
            "type" => Self::Type,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for ReasonCode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl From<ReasonCode> for String {
    fn from(value: ReasonCode) -> Self {
        match value {
            ReasonCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders a reason set as `a, b, c`, or `unspecified` when empty.
#[must_use]
pub fn describe(reasons: &BTreeSet<ReasonCode>) -> String {
    if reasons.is_empty() {
        return "unspecified".to_string();
    }
    reasons
        .iter()
        .map(ReasonCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
