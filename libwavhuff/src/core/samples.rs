//! Raw frame bytes <-> sample sequences

use super::sample_constants::{I16_MAX, I16_MIN, U8_BIAS};
use super::types::{PcmError, PcmResult, Sample};

/// Unpack interleaved frame bytes into samples
///
/// Width 1 is unsigned and recentred by subtracting 128, width 2 is
/// little-endian signed. Any other width is rejected before any work.
pub fn decode_samples(raw: &[u8], sample_width: u16) -> PcmResult<Vec<Sample>> {
    match sample_width {
        1 => Ok(raw.iter().map(|&b| b as Sample - U8_BIAS).collect()),
        2 => Ok(raw
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as Sample)
            .collect()),
        other => Err(PcmError::UnsupportedSampleWidth(other)),
    }
}

/// Pack samples as little-endian 16-bit, rejecting anything out of range
pub fn encode_samples(samples: &[Sample]) -> PcmResult<Vec<u8>> {
    let narrowed = samples
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if (I16_MIN..=I16_MAX).contains(&value) {
                Ok(value as i16)
            } else {
                Err(PcmError::PackError { index, value })
            }
        })
        .collect::<PcmResult<Vec<i16>>>()?;

    Ok(pack_i16(&narrowed))
}

/// Little-endian packing shared by the checked encoder and the clamper
pub fn pack_i16(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}
