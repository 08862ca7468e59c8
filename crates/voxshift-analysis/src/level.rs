//! Block level measurement.

use voxshift_core::linear_to_db;

/// Root-mean-square of a block. An empty block has RMS 0.
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let energy: f32 = block.iter().map(|s| s * s).sum();
    (energy / block.len() as f32).sqrt()
}

/// Level of a block in dBFS, `20 * log10(rms)`.
///
/// Silence is floored at `1e-10` so the result is always finite (-200 dB).
///
/// # Example
///
/// ```rust
/// use voxshift_analysis::block_level_db;
///
/// let block = vec![0.5f32; 1024];
/// assert!((block_level_db(&block) + 6.02).abs() < 0.01);
/// assert!(block_level_db(&[0.0; 16]).is_finite());
/// ```
pub fn block_level_db(block: &[f32]) -> f32 {
    linear_to_db(rms(block))
}
