//! Priority-based greedy allocation of diff output under two
//! simultaneous budgets: a global total and a per-item ceiling.

use std::cmp::Ordering;

use tracing::debug;

use crate::diff::{estimate_change_magnitude, generate_stacked_diff};
use crate::types::{DiffBudget, DiffRequest, StackedDiff};

/// Floor below which a truncated diff is not worth emitting.
pub const MIN_USEFUL_DIFF_SIZE: usize = 200;

/// Default budgets for [`truncate_diffs_to_token_budget`], in characters.
pub const DEFAULT_TOTAL_BUDGET: usize = 16_000;
pub const DEFAULT_PER_PAGE_BUDGET: usize = 4_000;

/// Tag appended to diff text that was cut short of the full diff.
pub const TRUNCATION_MARKER: &str = "\n... [diff truncated]";

/// Derive the diff budgets from a total output window (e.g. the share of
/// an LLM prompt reserved for diffs): 40% total, 10% per item, and a
/// fixed usefulness floor. Scales linearly with the input.
pub fn calculate_diff_budget(total_output_budget: usize) -> DiffBudget {
    DiffBudget {
        total: total_output_budget * 40 / 100,
        per_item: total_output_budget * 10 / 100,
        min_useful: MIN_USEFUL_DIFF_SIZE,
    }
}

/// Per-item outcome of an allocation run.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffAllocation {
    /// Included with its full diff text.
    Full(StackedDiff),
    /// Included with truncated text; stats remain those of the full diff.
    Truncated(StackedDiff),
    /// Not emitted: the budget ran out before this request's turn.
    /// A defined policy outcome, never an error.
    Dropped { page_id: String },
}

/// Generate diffs for `requests` in priority order, respecting both the
/// global and per-item budgets.
///
/// Priority is the request's explicit value when supplied, else the
/// estimated change magnitude. The descending sort is stable, so ties
/// preserve relative input order. Requests whose content pair produces
/// no diff are skipped silently and consume no budget.
pub fn allocate_diffs_within_budget(
    requests: Vec<DiffRequest>,
    budget: &DiffBudget,
) -> Vec<DiffAllocation> {
    let mut ranked: Vec<(f64, DiffRequest)> = requests
        .into_iter()
        .map(|request| {
            let priority = request.priority.unwrap_or_else(|| {
                estimate_change_magnitude(
                    request.before_content.as_deref(),
                    request.after_content.as_deref(),
                )
            });
            (priority, request)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut allocations = Vec::new();
    let mut remaining = budget.total;
    let mut exhausted = false;

    for (_, request) in ranked {
        if exhausted {
            allocations.push(DiffAllocation::Dropped {
                page_id: request.page_id,
            });
            continue;
        }

        let mut diff = match generate_stacked_diff(
            request.before_content.as_deref(),
            request.after_content.as_deref(),
            &request.group,
        ) {
            Some(d) => d,
            None => continue,
        };

        let mut truncated = false;
        if diff.unified_diff.len() > budget.per_item {
            truncate_in_place(&mut diff, budget.per_item);
            truncated = true;
        }

        let size = diff.unified_diff.len();
        if size <= remaining {
            remaining -= size;
            allocations.push(if truncated {
                DiffAllocation::Truncated(diff)
            } else {
                DiffAllocation::Full(diff)
            });
        } else if remaining >= budget.min_useful {
            // One last partial fit sized to the exact remaining budget,
            // then stop.
            truncate_in_place(&mut diff, remaining);
            remaining = 0;
            allocations.push(DiffAllocation::Truncated(diff));
            exhausted = true;
        } else {
            debug!(
                page = %request.page_id,
                remaining, "budget below useful floor, dropping remaining requests"
            );
            allocations.push(DiffAllocation::Dropped {
                page_id: request.page_id,
            });
            exhausted = true;
        }
    }

    allocations
}

/// [`allocate_diffs_within_budget`] flattened to the emitted diffs.
pub fn generate_diffs_within_budget(
    requests: Vec<DiffRequest>,
    budget: &DiffBudget,
) -> Vec<StackedDiff> {
    allocate_diffs_within_budget(requests, budget)
        .into_iter()
        .filter_map(|allocation| match allocation {
            DiffAllocation::Full(diff) | DiffAllocation::Truncated(diff) => Some(diff),
            DiffAllocation::Dropped { .. } => None,
        })
        .collect()
}

/// Re-fit already-generated diffs to a (possibly different) budget.
///
/// Each diff is first independently capped to `per_page_budget`, then
/// diffs are ranked by churn (`additions + deletions`, descending,
/// stable) and greedily accepted while the cumulative size stays within
/// `total_budget`. One partial fit is truncated to the exact remainder;
/// diffs with no budget left are dropped.
pub fn truncate_diffs_to_token_budget(
    diffs: Vec<StackedDiff>,
    total_budget: Option<usize>,
    per_page_budget: Option<usize>,
) -> Vec<StackedDiff> {
    let total = total_budget.unwrap_or(DEFAULT_TOTAL_BUDGET);
    let per_page = per_page_budget.unwrap_or(DEFAULT_PER_PAGE_BUDGET);

    let mut capped: Vec<StackedDiff> = diffs
        .into_iter()
        .map(|mut diff| {
            if diff.unified_diff.len() > per_page {
                truncate_in_place(&mut diff, per_page);
            }
            diff
        })
        .collect();
    capped.sort_by(|a, b| b.stats.change_weight().cmp(&a.stats.change_weight()));

    let mut accepted = Vec::new();
    let mut remaining = total;
    for mut diff in capped {
        let size = diff.unified_diff.len();
        if size <= remaining {
            remaining -= size;
            accepted.push(diff);
        } else if remaining > 0 {
            truncate_in_place(&mut diff, remaining);
            remaining = 0;
            accepted.push(diff);
        } else {
            debug!(page = %diff.page_id, "diff dropped: no budget remains");
        }
    }

    accepted
}

/// Cut a diff's text to `limit` characters, marker included, and tag it.
fn truncate_in_place(diff: &mut StackedDiff, limit: usize) {
    diff.unified_diff = truncate_with_marker(&diff.unified_diff, limit);
    diff.truncated = true;
}

/// Truncate `text` so the result, including [`TRUNCATION_MARKER`], never
/// exceeds `limit`. Cuts are kept on `char` boundaries.
fn truncate_with_marker(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    if limit <= TRUNCATION_MARKER.len() {
        return TRUNCATION_MARKER[..limit.min(TRUNCATION_MARKER.len())].to_string();
    }

    let keep = floor_char_boundary(text, limit - TRUNCATION_MARKER.len());
    format!("{}{TRUNCATION_MARKER}", &text[..keep])
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_derivation_is_linear() {
        let budget = calculate_diff_budget(10_000);
        assert_eq!(budget.total, 4_000);
        assert_eq!(budget.per_item, 1_000);
        assert_eq!(budget.min_useful, 200);

        let doubled = calculate_diff_budget(20_000);
        assert_eq!(doubled.total, 8_000);
        assert_eq!(doubled.per_item, 2_000);
    }

    #[test]
    fn truncation_respects_limit_and_boundaries() {
        let text = "é".repeat(500);
        let cut = truncate_with_marker(&text, 101);
        assert!(cut.len() <= 101);
        assert!(cut.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncation_is_noop_within_limit() {
        assert_eq!(truncate_with_marker("short", 100), "short");
    }
}
