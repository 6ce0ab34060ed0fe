pub mod allocation;

pub use allocation::{
    allocate_diffs_within_budget, calculate_diff_budget, generate_diffs_within_budget,
    truncate_diffs_to_token_budget, DiffAllocation, DEFAULT_PER_PAGE_BUDGET, DEFAULT_TOTAL_BUDGET,
    MIN_USEFUL_DIFF_SIZE, TRUNCATION_MARKER,
};
