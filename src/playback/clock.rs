/// Sample index for an elapsed playback time: `floor(elapsed * sample_rate)`.
///
/// Recomputed from the engine's reported offset every frame rather than
/// accumulated locally, so pauses and end-of-track resets are picked up
/// immediately. Negative times clamp to 0.
pub fn current_sample_index(elapsed_secs: f64, sample_rate: u32) -> usize {
    (elapsed_secs * sample_rate as f64).floor() as usize
}

/// `M:SS` with whole seconds truncated, e.g. 65.4 -> "1:05".
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let total = elapsed_secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
