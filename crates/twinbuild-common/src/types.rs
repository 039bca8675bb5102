//! Domain primitive types used across the twinbuild workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name and tag of a container image, e.g. `test/hello:dockerapi`.
///
/// The diff tool keys its per-image sections by exactly this string, so the
/// value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates an image reference from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds `<repo>/<case>:<tag>`.
    #[must_use]
    pub fn for_case(repo: &str, case: &str, tag: &str) -> Self {
        Self(format!("{repo}/{case}:{tag}"))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which side of a comparison an image was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildSide {
    /// Built through the container daemon API.
    Reference,
    /// Built by the alternative builder under test.
    Candidate,
}

impl fmt::Display for BuildSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Candidate => write!(f, "candidate"),
        }
    }
}
