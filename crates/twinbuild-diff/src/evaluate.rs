//! Equivalence rules for two independently built images.
//!
//! Two builds of the same context never agree on modification times, so a
//! file whose only difference is `time` is ignored. Everything else the diff
//! reports counts against equivalence, and every violation is collected
//! before the verdict is returned.

use crate::report::{FileDifference, StructuralDiff};
use crate::verdict::{Verdict, Violation};

/// Returns the differences that survive the time-only filter, in order.
#[must_use]
pub fn significant_differences(files_differ: &[FileDifference]) -> Vec<&FileDifference> {
    files_differ.iter().filter(|d| !d.is_time_only()).collect()
}

/// Evaluates whether the two images described by `diff` are equivalent.
///
/// Checks run in a fixed order: retained content differences, then files
/// unique to image A, then files unique to image B.
#[must_use]
pub fn evaluate(diff: &StructuralDiff) -> Verdict {
    let mut violations = Vec::new();

    let retained = significant_differences(&diff.files_differ);
    let ignored = diff.files_differ.len() - retained.len();
    if ignored > 0 {
        tracing::debug!(ignored, "ignoring time-only differences");
    }
    if !retained.is_empty() {
        violations.push(Violation::ContentDiffers {
            files: retained.into_iter().cloned().collect(),
        });
    }

    if !diff.unique_to_a.is_empty() {
        violations.push(Violation::UniqueToA {
            image: diff.image_a.clone(),
            paths: diff.unique_to_a.iter().cloned().collect(),
        });
    }
    if !diff.unique_to_b.is_empty() {
        violations.push(Violation::UniqueToB {
            image: diff.image_b.clone(),
            paths: diff.unique_to_b.iter().cloned().collect(),
        });
    }

    let verdict = Verdict::from_violations(violations);
    tracing::info!(
        image_a = %diff.image_a,
        image_b = %diff.image_b,
        equivalent = verdict.equivalent,
        violations = verdict.violations.len(),
        "evaluated image equivalence"
    );
    verdict
}
