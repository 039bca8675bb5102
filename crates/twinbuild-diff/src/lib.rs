//! # twinbuild-diff
//!
//! Decides whether two container images built by different tools are
//! equivalent, given the structural diff a filesystem comparison tool
//! produced for them.
//!
//! - **Reasons**: why a file differs ([`reason::ReasonCode`]).
//! - **Report**: the parsed diff ([`report::StructuralDiff`]).
//! - **Evaluate**: the equivalence rules ([`evaluate::evaluate`]).
//! - **Verdict**: the outcome and its violations.
//!
//! Evaluation is a pure function over its input and performs no I/O.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod evaluate;
pub mod reason;
pub mod report;
pub mod verdict;

pub use evaluate::{evaluate, significant_differences};
pub use reason::ReasonCode;
pub use report::{FileDifference, StructuralDiff};
pub use verdict::{Verdict, Violation};
