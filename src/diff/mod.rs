pub mod magnitude;
pub mod unified;

pub use magnitude::estimate_change_magnitude;
pub use unified::{generate_stacked_diff, generate_stacked_diff_with, DiffLimits};
