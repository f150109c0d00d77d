//! Lossy sample transforms for wavhuff
//!
//! Quantize 16-bit samples to a narrower signed domain, keep one
//! frequency-weighted representative per window, then expand back to the
//! original length and 16-bit scale. Every stage is a pure function.

pub mod clamp;
pub mod quantizer;
pub mod reducer;
pub mod restorer;

pub use clamp::{clamp_and_pack, clamp_samples};
pub use quantizer::quantize;
pub use reducer::reduce;
pub use restorer::restore;

use crate::core::{scale_step, signed_range, Sample, SOURCE_BITS};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default quantization depth in bits
pub const DEFAULT_QUANTIZATION_BITS: u8 = 8;

/// Default window size of the reducer
pub const DEFAULT_COMPRESSION_FACTOR: usize = 3;

const DEFAULT_WINDOW: NonZeroUsize = match NonZeroUsize::new(DEFAULT_COMPRESSION_FACTOR) {
    Some(window) => window,
    None => panic!("default window must be non-zero"),
};

/// Target bit depth and its derived symmetric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct QuantizationParams {
    bits: u8,
}

impl QuantizationParams {
    /// `None` unless 1 <= bits <= 16
    pub fn new(bits: u8) -> Option<Self> {
        (1..=SOURCE_BITS)
            .contains(&bits)
            .then_some(QuantizationParams { bits })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// -(2^(bits-1))
    pub fn min_val(&self) -> Sample {
        signed_range(self.bits).0
    }

    /// 2^(bits-1) - 1
    pub fn max_val(&self) -> Sample {
        signed_range(self.bits).1
    }

    /// Divisor between the 16-bit domain and this one
    pub fn step(&self) -> Sample {
        scale_step(self.bits)
    }
}

impl Default for QuantizationParams {
    fn default() -> Self {
        QuantizationParams {
            bits: DEFAULT_QUANTIZATION_BITS,
        }
    }
}

impl TryFrom<u8> for QuantizationParams {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits).ok_or_else(|| format!("quantization bits must be 1-16, got {}", bits))
    }
}

impl From<QuantizationParams> for u8 {
    fn from(p: QuantizationParams) -> u8 {
        p.bits
    }
}

/// Window size of the frequency-weighted reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct CompressionParams {
    window_size: NonZeroUsize,
}

impl CompressionParams {
    /// `None` for a zero window
    pub fn new(window_size: usize) -> Option<Self> {
        NonZeroUsize::new(window_size).map(|window_size| CompressionParams { window_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size.get()
    }

    /// Reduced length for `len` input samples: ceil(len / window)
    pub fn reduced_len(&self, len: usize) -> usize {
        len.div_ceil(self.window_size())
    }
}

impl Default for CompressionParams {
    fn default() -> Self {
        CompressionParams {
            window_size: DEFAULT_WINDOW,
        }
    }
}

impl TryFrom<usize> for CompressionParams {
    type Error = String;

    fn try_from(window_size: usize) -> Result<Self, Self::Error> {
        Self::new(window_size).ok_or_else(|| "compression factor must be at least 1".to_string())
    }
}

impl From<CompressionParams> for usize {
    fn from(p: CompressionParams) -> usize {
        p.window_size()
    }
}
