pub mod grouping;

pub use grouping::group_activities_for_diff;
