//! Formatted output helpers for CLI commands.
//!
//! Verdicts and suite summaries go to stdout; tracing logs go to stderr.

use twinbuild_diff::Verdict;
use twinbuild_harness::report::{CaseOutcome, SuiteReport};

const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Prints a verdict, either as text lines or as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_verdict(verdict: &Verdict, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(verdict)?);
        return Ok(());
    }
    if verdict.equivalent {
        println!("{GREEN}equivalent{RESET}");
    } else {
        println!("{RED}not equivalent{RESET}");
        for message in verdict.messages() {
            println!("  - {message}");
        }
    }
    Ok(())
}

/// Prints one line per case followed by totals.
pub fn print_summary(report: &SuiteReport) {
    println!();
    for result in &report.results {
        let took = format_duration(result.duration_ms);
        match &result.outcome {
            CaseOutcome::Passed => {
                println!("  {GREEN}PASS{RESET} {BOLD}{}{RESET} ({took})", result.case);
            }
            CaseOutcome::Failed {
                stage,
                reason,
                details,
            } => {
                println!(
                    "  {RED}FAIL{RESET} {BOLD}{}{RESET} ({took}) at {stage}: {reason}",
                    result.case
                );
                for detail in details {
                    println!("       - {detail}");
                }
            }
        }
    }

    let failed = report.failed_cases().len();
    println!();
    println!(
        "  {} passed, {} failed{}",
        report.passed(),
        failed,
        if report.interrupted {
            format!(", {YELLOW}interrupted{RESET}")
        } else {
            String::new()
        }
    );
}

/// Formats milliseconds as a short human-readable duration (e.g. "2.5s").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_duration(ms: u64) -> String {
    const SECOND: u64 = 1000;
    const MINUTE: u64 = SECOND * 60;

    if ms >= MINUTE {
        format!("{}m{:02}s", ms / MINUTE, (ms % MINUTE) / SECOND)
    } else if ms >= SECOND {
        format!("{:.1}s", ms as f64 / SECOND as f64)
    } else {
        format!("{ms}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_displays_millis() {
        assert_eq!(format_duration(512), "512ms");
    }

    #[test]
    fn format_duration_displays_seconds() {
        assert_eq!(format_duration(2500), "2.5s");
    }

    #[test]
    fn format_duration_displays_minutes() {
        assert_eq!(format_duration(125_000), "2m05s");
    }
}
