//! Structural diff between two image filesystems.
//!
//! The diff tool reports JSON of the form
//!
//! ```json
//! {
//!   "files_differ": [ { "name": "/etc/motd", "reasons": ["time"] } ],
//!   "test/app:dockerapi":       { "unique_files": ["/tmp/leftover"] },
//!   "test/app:ocexdockerbuild": { "unique_files": [] }
//! }
//! ```
//!
//! where the per-image keys are the image references that were compared.
//! Missing sections are rejected rather than read as empty, so a broken
//! diff run can never pass as "equivalent".

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use twinbuild_common::constants::{FILES_DIFFER_KEY, UNIQUE_FILES_KEY};
use twinbuild_common::error::{Result, TwinbuildError};
use twinbuild_common::types::ImageRef;

use crate::reason::ReasonCode;

/// Keys a `files_differ` entry may use for the file path.
const PATH_KEYS: [&str; 2] = ["name", "path"];

/// A file present in both images whose content or metadata differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDifference {
    /// Absolute path inside the image.
    pub path: String,
    /// Causes reported for the difference. Empty means unspecified.
    pub reasons: BTreeSet<ReasonCode>,
}

impl FileDifference {
    /// Creates a difference entry; duplicate reasons collapse.
    pub fn new(path: impl Into<String>, reasons: impl IntoIterator<Item = ReasonCode>) -> Self {
        Self {
            path: path.into(),
            reasons: reasons.into_iter().collect(),
        }
    }

    /// True when the only recorded cause is a timestamp mismatch.
    ///
    /// This is set equality with `{time}`: an empty reason set or one that
    /// also contains another cause is not time-only.
    #[must_use]
    pub fn is_time_only(&self) -> bool {
        self.reasons.len() == 1 && self.reasons.contains(&ReasonCode::Time)
    }
}

/// Parsed result of comparing image A against image B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralDiff {
    /// First compared image.
    pub image_a: ImageRef,
    /// Second compared image.
    pub image_b: ImageRef,
    /// Files in both images that differ, in the diff tool's order.
    pub files_differ: Vec<FileDifference>,
    /// Paths only image A contains.
    pub unique_to_a: BTreeSet<String>,
    /// Paths only image B contains.
    pub unique_to_b: BTreeSet<String>,
}

impl StructuralDiff {
    /// Creates an empty diff, i.e. one describing identical images.
    #[must_use]
    pub fn new(image_a: ImageRef, image_b: ImageRef) -> Self {
        Self {
            image_a,
            image_b,
            files_differ: Vec::new(),
            unique_to_a: BTreeSet::new(),
            unique_to_b: BTreeSet::new(),
        }
    }

    /// Appends a differing file.
    #[must_use]
    pub fn with_difference(mut self, difference: FileDifference) -> Self {
        self.files_differ.push(difference);
        self
    }

    /// Adds a path only image A contains.
    #[must_use]
    pub fn with_unique_to_a(mut self, path: impl Into<String>) -> Self {
        let _ = self.unique_to_a.insert(path.into());
        self
    }

    /// Adds a path only image B contains.
    #[must_use]
    pub fn with_unique_to_b(mut self, path: impl Into<String>) -> Self {
        let _ = self.unique_to_b.insert(path.into());
        self
    }

    /// Parses diff tool output text.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the text is not JSON, otherwise whatever
    /// [`StructuralDiff::from_report`] returns.
    pub fn from_json_str(text: &str, image_a: &ImageRef, image_b: &ImageRef) -> Result<Self> {
        let report: Value = serde_json::from_str(text)?;
        Self::from_report(&report, image_a, image_b)
    }

    /// Builds a diff from the diff tool's JSON report.
    ///
    /// # Errors
    ///
    /// - `Config` if both identifiers are the same image.
    /// - `MalformedInput` if `files_differ` or either image's `unique_files`
    ///   is missing, null, or not a list of the expected shape, or if a path
    ///   is classified in more than one collection.
    pub fn from_report(report: &Value, image_a: &ImageRef, image_b: &ImageRef) -> Result<Self> {
        if image_a == image_b {
            return Err(TwinbuildError::Config {
                message: format!("cannot compare image {image_a} with itself"),
            });
        }
        let root = report
            .as_object()
            .ok_or_else(|| TwinbuildError::malformed("$", "expected a JSON object"))?;

        let diff = Self {
            image_a: image_a.clone(),
            image_b: image_b.clone(),
            files_differ: parse_files_differ(root)?,
            unique_to_a: parse_unique_files(root, image_a)?,
            unique_to_b: parse_unique_files(root, image_b)?,
        };
        diff.check_exclusive()?;

        tracing::debug!(
            image_a = %image_a,
            image_b = %image_b,
            files_differ = diff.files_differ.len(),
            unique_to_a = diff.unique_to_a.len(),
            unique_to_b = diff.unique_to_b.len(),
            "parsed structural diff"
        );
        Ok(diff)
    }

    fn check_exclusive(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let classified = self
            .files_differ
            .iter()
            .map(|d| (d.path.as_str(), FILES_DIFFER_KEY))
            .chain(self.unique_to_a.iter().map(|p| (p.as_str(), self.image_a.as_str())))
            .chain(self.unique_to_b.iter().map(|p| (p.as_str(), self.image_b.as_str())));
        for (path, section) in classified {
            match seen.insert(path, section) {
                Some(previous) if previous != section => {
                    return Err(TwinbuildError::malformed(
                        section,
                        format!("path {path} is also listed under {previous}"),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_files_differ(root: &Map<String, Value>) -> Result<Vec<FileDifference>> {
    let entries = required_array(root.get(FILES_DIFFER_KEY), FILES_DIFFER_KEY)?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_difference(index, entry))
        .collect()
}

fn parse_difference(index: usize, entry: &Value) -> Result<FileDifference> {
    let field = format!("{FILES_DIFFER_KEY}[{index}]");
    let object = entry
        .as_object()
        .ok_or_else(|| TwinbuildError::malformed(&field, "expected an object"))?;

    let path = PATH_KEYS
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(Value::as_str)
        .ok_or_else(|| TwinbuildError::malformed(&field, "missing file name"))?;

    let reasons = match object.get("reasons") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(|code| ReasonCode::from(code.to_string()))
                    .ok_or_else(|| {
                        TwinbuildError::malformed(format!("{field}.reasons[{i}]"), "expected a string")
                    })
            })
            .collect::<Result<_>>()?,
        Some(_) => {
            return Err(TwinbuildError::malformed(
                format!("{field}.reasons"),
                "expected a list",
            ));
        }
    };

    Ok(FileDifference {
        path: path.to_string(),
        reasons,
    })
}

fn parse_unique_files(root: &Map<String, Value>, image: &ImageRef) -> Result<BTreeSet<String>> {
    let section = root
        .get(image.as_str())
        .ok_or_else(|| TwinbuildError::malformed(image.as_str(), "missing section for image"))?;
    let field = format!("{image}.{UNIQUE_FILES_KEY}");
    let listed = required_array(section.get(UNIQUE_FILES_KEY), &field)?;
    listed
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| TwinbuildError::malformed(format!("{field}[{i}]"), "expected a string"))
        })
        .collect()
}

fn required_array<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Ok(items),
        None => Err(TwinbuildError::malformed(field, "missing")),
        Some(Value::Null) => Err(TwinbuildError::malformed(field, "is null")),
        Some(_) => Err(TwinbuildError::malformed(field, "expected a list")),
    }
}
