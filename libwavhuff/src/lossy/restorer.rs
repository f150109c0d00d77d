use super::{CompressionParams, QuantizationParams};
use crate::core::Sample;

/// Expand a reduced sequence back to exactly `original_len` samples
///
/// Each representative is rescaled by 2^(16-bits) and repeated
/// `window_size` times. A short result is zero-padded, a long one truncated.
pub fn restore(
    reduced: &[Sample],
    original_len: usize,
    quantization: &QuantizationParams,
    compression: &CompressionParams,
) -> Vec<Sample> {
    let step = quantization.step();
    let window = compression.window_size();

    let mut restored: Vec<Sample> = reduced
        .iter()
        .flat_map(|&v| std::iter::repeat(v.saturating_mul(step)).take(window))
        .take(original_len)
        .collect();

    restored.resize(original_len, 0);
    restored
}
