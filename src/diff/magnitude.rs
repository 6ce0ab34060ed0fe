//! Change-magnitude estimation used for prioritization only; it never
//! affects the diff text itself.

/// Estimate how large a change is, in rough byte units.
///
/// Creation and deletion score as the length of the non-null side. For a
/// modification, the linear length delta dominates genuinely large
/// changes while the square-root term keeps structurally small edits to
/// very large documents from scoring zero.
pub fn estimate_change_magnitude(before: Option<&str>, after: Option<&str>) -> f64 {
    let before = before.unwrap_or("");
    let after = after.unwrap_or("");

    match (before.is_empty(), after.is_empty()) {
        (true, true) => 0.0,
        (true, false) => after.len() as f64,
        (false, true) => before.len() as f64,
        (false, false) => {
            let before_len = before.len() as f64;
            let after_len = after.len() as f64;
            (after_len - before_len).abs() + ((before_len + after_len) / 2.0).sqrt()
        }
    }
}
