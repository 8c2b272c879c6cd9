//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines for text mode.

use crate::model::{Outcome, RunResult, TraceEvent};
use std::time::Duration;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Longest sequence printed in full; longer ones are elided in the middle.
const MAX_LISTED: usize = 24;

fn format_sequence(values: &[u32]) -> String {
    if values.len() <= MAX_LISTED {
        return format!("{values:?}");
    }
    let half = MAX_LISTED / 2;
    let head: Vec<String> = values[..half].iter().map(u32::to_string).collect();
    let tail: Vec<String> = values[values.len() - half..]
        .iter()
        .map(u32::to_string)
        .collect();
    format!(
        "[{}, … ({} more) …, {}]",
        head.join(", "),
        values.len() - MAX_LISTED,
        tail.join(", ")
    )
}

/// One line per trace event, for `--trace`.
pub(crate) fn format_trace_event(ev: &TraceEvent) -> String {
    match ev {
        TraceEvent::Compare(i, j) if i == j => format!("tally    [{i}]"),
        TraceEvent::Compare(i, j) => format!("compare  [{i}] [{j}]"),
        TraceEvent::Swap(i, j) => format!("swap     [{i}] [{j}]"),
        TraceEvent::Overwrite(i, v) => format!("write    [{i}] = {v}"),
        TraceEvent::Inspect(i) => format!("inspect  [{i}]"),
        TraceEvent::RegionSorted(i) => format!("sorted   [{i}]"),
    }
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(result: &RunResult) -> TextSummary {
    let d = result.algorithm.descriptor();
    let mut lines = vec![
        format!("Algorithm: {}", d.name),
        format!(
            "Complexity: best {} / average {} / worst {} / space {}",
            d.best, d.average, d.worst, d.space
        ),
        format!("Size: {}", result.size),
        format!("Initial: {}", format_sequence(&result.initial)),
        format!("Sorted:  {}", format_sequence(&result.sorted)),
        format!("Comparisons: {}", result.stats.comparisons),
        format!("Swaps: {}", result.stats.swaps),
        format!(
            "Time: {}",
            humantime::format_duration(Duration::from_millis(result.stats.elapsed_ms))
        ),
    ];
    if !result.algorithm.is_comparison_based() {
        lines.push("Comparisons count key tallies; no two elements are compared.".into());
    }
    if result.outcome == Outcome::Cancelled {
        lines.push("Run did not complete.".into());
    }
    TextSummary { lines }
}
