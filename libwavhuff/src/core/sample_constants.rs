use super::types::Sample;

/// Maximum value for 16-bit signed integer (2^15 - 1)
pub const I16_MAX: Sample = i16::MAX as Sample;

/// Minimum value for 16-bit signed integer (-2^15)
pub const I16_MIN: Sample = i16::MIN as Sample;

/// Bit depth of the sample domain the quantizer rescales from
pub const SOURCE_BITS: u8 = 16;

/// Offset removed from unsigned 8-bit samples
pub const U8_BIAS: Sample = 128;

/// Scale step between the 16-bit domain and a `bits`-wide domain (2^(16-bits))
///
/// `bits` must be in 1..=16.
#[inline]
pub fn scale_step(bits: u8) -> Sample {
    1 << (SOURCE_BITS - bits)
}

/// Symmetric signed range for a bit depth: [-(2^(b-1)), 2^(b-1) - 1]
#[inline]
pub fn signed_range(bits: u8) -> (Sample, Sample) {
    let half: Sample = 1 << (bits - 1);
    (-half, half - 1)
}
