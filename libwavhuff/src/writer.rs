use crate::core::{
    PcmError, PcmParams, PcmResult, FORMAT_PCM, RIFF_MAGIC, WAVE_MAGIC, WAV_HEADER_SIZE,
};

/// Binary writer for canonical 44-byte-header PCM WAV files
#[derive(Debug, Default)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// Create a new writer
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// Write a complete WAV file
    ///
    /// Channel count, sample rate and sample width come from `params`
    /// verbatim; the frame count is implied by `frames.len()`. Fails with
    /// [`PcmError::InvalidFormat`] when a header field does not fit its
    /// on-disk width.
    pub fn write(mut self, params: &PcmParams, frames: &[u8]) -> PcmResult<Vec<u8>> {
        let block_align = u16::try_from(params.block_align())
            .map_err(|_| too_large("block align", params))?;
        let byte_rate = params
            .sample_rate
            .checked_mul(u32::from(block_align))
            .ok_or_else(|| too_large("byte rate", params))?;
        let bits_per_sample = u16::try_from(params.bit_depth())
            .map_err(|_| too_large("bits per sample", params))?;

        let pad = frames.len() % 2;
        let data_size = u32::try_from(frames.len())
            .map_err(|_| too_large("data chunk size", params))?;
        let riff_size = data_size
            .checked_add((WAV_HEADER_SIZE - 8 + pad) as u32)
            .ok_or_else(|| too_large("RIFF size", params))?;

        self.buffer.reserve(WAV_HEADER_SIZE + frames.len() + pad);

        // RIFF header
        self.buffer.extend_from_slice(&RIFF_MAGIC);
        self.write_u32(riff_size);
        self.buffer.extend_from_slice(&WAVE_MAGIC);

        // fmt chunk
        self.buffer.extend_from_slice(b"fmt ");
        self.write_u32(16);
        self.write_u16(FORMAT_PCM);
        self.write_u16(params.channels);
        self.write_u32(params.sample_rate);
        self.write_u32(byte_rate);
        self.write_u16(block_align);
        self.write_u16(bits_per_sample);

        // data chunk
        self.buffer.extend_from_slice(b"data");
        self.write_u32(data_size);
        self.buffer.extend_from_slice(frames);
        if pad == 1 {
            self.buffer.push(0);
        }

        Ok(self.buffer)
    }

    fn write_u16(&mut self, v: u16) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }
}

fn too_large(field: &str, params: &PcmParams) -> PcmError {
    PcmError::InvalidFormat(format!(
        "{} overflows the WAV header ({} channels, {} Hz, {}-byte samples)",
        field, params.channels, params.sample_rate, params.sample_width
    ))
}
