use crate::core::{encode_samples, PcmResult, Sample, I16_MAX, I16_MIN};

/// Clip every sample into [-32768, 32767]
pub fn clamp_samples(samples: &[Sample]) -> Vec<Sample> {
    samples.iter().map(|&s| s.clamp(I16_MIN, I16_MAX)).collect()
}

/// Clip, then pack through the range-checked 16-bit encoder
pub fn clamp_and_pack(samples: &[Sample]) -> PcmResult<Vec<u8>> {
    encode_samples(&clamp_samples(samples))
}
