//! Common types for the wavhuff core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// constants

/// "RIFF" chunk id
pub const RIFF_MAGIC: [u8; 4] = *b"RIFF";

/// "WAVE" form type
pub const WAVE_MAGIC: [u8; 4] = *b"WAVE";

/// Canonical header size written by [`crate::Writer`]
pub const WAV_HEADER_SIZE: usize = 44;

/// WAVE_FORMAT_PCM
pub const FORMAT_PCM: u16 = 0x0001;

/// WAVE_FORMAT_EXTENSIBLE, accepted when the sub-format is PCM
pub const FORMAT_EXTENSIBLE: u16 = 0xfffe;

// types

/// One signed amplitude value; wide enough for 16-bit input and rescaled output
pub type Sample = i32;

/// Container parameters read from the input and reused when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmParams {
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bytes per sample (1 or 2 are decodable)
    pub sample_width: u16,
    /// Frames in the data chunk (one sample per channel each)
    pub frame_count: u64,
}

impl PcmParams {
    /// Bytes per interleaved frame
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }

    /// Bits per sample as stored in the header
    pub fn bit_depth(&self) -> u32 {
        u32::from(self.sample_width) * 8
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Same params with the frame count recomputed for `data_len` bytes
    pub fn with_data_len(self, data_len: usize) -> Self {
        let block = self.block_align().max(1);
        PcmParams {
            frame_count: (data_len / block) as u64,
            ..self
        }
    }
}

/// Errors raised by the container codec and sample packers
#[derive(Debug, Error)]
pub enum PcmError {
    /// Input path does not exist
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Not a RIFF/WAVE PCM container
    #[error("invalid WAV container: {0}")]
    InvalidFormat(String),

    /// Sample width other than 1 or 2 bytes
    #[error("unsupported sample width: {0} bytes")]
    UnsupportedSampleWidth(u16),

    /// Data chunk holds no frames
    #[error("WAV file contains no audio frames")]
    EmptyAudio,

    /// A sample escaped the 16-bit range before packing
    #[error("sample {value} at index {index} is outside the 16-bit range")]
    PackError { index: usize, value: Sample },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for the container codec
pub type PcmResult<T> = Result<T, PcmError>;
