pub mod activity;
pub mod diff_bundle;
pub mod identifiers;
pub mod version_record;

pub use activity::{ActivityDiffGroup, ActivityForDiff};
pub use diff_bundle::{DiffBudget, DiffRequest, DiffStats, StackedDiff, TimeRange};
pub use identifiers::{ContentRef, RefParseError, StateHash};
pub use version_record::{PageVersion, COMPRESSION_METADATA_KEY};
