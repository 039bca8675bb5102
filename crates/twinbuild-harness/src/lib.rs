//! Image build equivalence harness.
//!
//! For each build context under the tests directory the [`engine::Engine`]
//! builds a reference and a candidate image, asks the structural diff tool
//! for their differences, evaluates equivalence, and smoke-runs the images.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod container;
pub mod difftool;
pub mod discovery;
pub mod engine;
pub mod process;
pub mod report;
