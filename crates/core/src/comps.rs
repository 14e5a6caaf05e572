//! Comparable-property helpers shared by the results page and the report.

use crate::types::{Comp, Timestamp};

/// Maximum number of comps printed in the PDF report.
pub const MAX_REPORT_COMPS: usize = 5;

/// Milliseconds per day (86,400,000).
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The leading comps, in service order, that fit in the report table.
pub fn select_report_comps(comps: &[Comp]) -> &[Comp] {
    &comps[..comps.len().min(MAX_REPORT_COMPS)]
}

/// Whole days elapsed since `date`, rounded to the nearest day and never
/// negative (dates in the future count as 0).
pub fn days_ago(date: Timestamp, now: Timestamp) -> i64 {
    let elapsed_ms = (now - date).num_milliseconds() as f64;
    let days = (elapsed_ms / MILLIS_PER_DAY).round();
    if days > 0.0 {
        days as i64
    } else {
        0
    }
}
