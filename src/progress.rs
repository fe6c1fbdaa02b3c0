/*!
 * Translation progress, measured by how far the probable source position
 * has advanced through the source subtree.
 */

/// Percentage of `content_start..content_end` lying before `position`.
///
/// Not clamped: a position before the content start gives a negative value,
/// which points at a tracker bug rather than something to hide. An empty
/// extent counts as complete.
pub fn progress_percentage(position: usize, content_start: usize, content_end: usize) -> f64 {
    if content_end <= content_start {
        return 100.0;
    }
    let done = position as f64 - content_start as f64;
    let total = (content_end - content_start) as f64;
    done / total * 100.0
}
