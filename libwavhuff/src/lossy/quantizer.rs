use super::QuantizationParams;
use crate::core::Sample;

/// Rescale 16-bit samples to `params.bits()` bits
///
/// Floor division by 2^(16-bits), then clamp into [min_val, max_val].
/// Length and order are preserved.
pub fn quantize(samples: &[Sample], params: &QuantizationParams) -> Vec<Sample> {
    let step = params.step();
    let (min, max) = (params.min_val(), params.max_val());

    samples
        .iter()
        .map(|&s| s.div_euclid(step).clamp(min, max))
        .collect()
}
