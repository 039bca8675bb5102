//! Outcome of an equivalence evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};
use twinbuild_common::types::ImageRef;

use crate::reason::describe;
use crate::report::FileDifference;

/// One reason two images are not equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Files present in both images differ beyond their timestamps.
    ContentDiffers {
        /// Every retained difference, in report order.
        files: Vec<FileDifference>,
    },
    /// Image A contains files image B lacks.
    UniqueToA {
        /// Image A.
        image: ImageRef,
        /// The unique paths, sorted.
        paths: Vec<String>,
    },
    /// Image B contains files image A lacks.
    UniqueToB {
        /// Image B.
        image: ImageRef,
        /// The unique paths, sorted.
        paths: Vec<String>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentDiffers { files } => {
                let listed: Vec<String> = files
                    .iter()
                    .map(|d| format!("{} ({})", d.path, describe(&d.reasons)))
                    .collect();
                write!(f, "content difference: {}", listed.join("; "))
            }
            Self::UniqueToA { image, paths } => {
                write!(f, "files unique to {image} (image A): {}", paths.join(", "))
            }
            Self::UniqueToB { image, paths } => {
                write!(f, "files unique to {image} (image B): {}", paths.join(", "))
            }
        }
    }
}

/// Result of comparing two images.
///
/// Each evaluation produces a fresh verdict owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// True iff `violations` is empty.
    pub equivalent: bool,
    /// Every violation found, in check order.
    pub violations: Vec<Violation>,
}

impl Verdict {
    /// Builds a verdict; equivalence follows from the absence of violations.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            equivalent: violations.is_empty(),
            violations,
        }
    }

    /// Human-readable violation messages, one per violation.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.equivalent {
            return write!(f, "images are equivalent");
        }
        write!(f, "images differ: {}", self.messages().join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::ReasonCode;

    #[test]
    fn empty_verdict_is_equivalent() {
        let verdict = Verdict::from_violations(Vec::new());
        assert!(verdict.equivalent);
        assert_eq!(verdict.to_string(), "images are equivalent");
    }

    #[test]
    fn content_violation_lists_every_file() {
        let violation = Violation::ContentDiffers {
            files: vec![
                FileDifference::new("/a", [ReasonCode::Content]),
                FileDifference::new("/b", [ReasonCode::Owner, ReasonCode::Time]),
                FileDifference::new("/c", std::iter::empty()),
            ],
        };
        assert_eq!(
            violation.to_string(),
            "content difference: /a (content); /b (time, owner); /c (unspecified)"
        );
    }

    #[test]
    fn unique_violation_names_image() {
        let violation = Violation::UniqueToB {
            image: ImageRef::new("test/x:ocexdockerbuild"),
            paths: vec!["/one".into(), "/two".into()],
        };
        assert_eq!(
            violation.to_string(),
            "files unique to test/x:ocexdockerbuild (image B): /one, /two"
        );
    }

    #[test]
    fn verdict_serializes_with_kind_tags() {
        let verdict = Verdict::from_violations(vec![Violation::UniqueToA {
            image: ImageRef::new("a"),
            paths: vec!["/p".into()],
        }]);
        let json = serde_json::to_value(&verdict).expect("serialize");
        assert_eq!(json["equivalent"], false);
        assert_eq!(json["violations"][0]["kind"], "unique_to_a");
        assert_eq!(json["violations"][0]["image"], "a");
    }
}
