/// Result of judging a frozen indicator position against a target window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

/// Decide hit or miss for a frozen indicator position. The window is a closed
/// interval on both ends; landing exactly on a boundary counts as a hit.
///
/// `position` and `target_center` must be projected into the same coordinate
/// space by the caller.
pub fn judge(position: f64, target_center: f64, window_half_width: f64) -> Outcome {
    if position >= target_center - window_half_width
        && position <= target_center + window_half_width
    {
        Outcome::Hit
    } else {
        Outcome::Miss
    }
}
