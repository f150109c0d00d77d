//! Compression options shared by the pipeline, config and CLI

use crate::error::{PipelineError, PipelineResult};
use libwavhuff::{CompressionParams, QuantizationParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// MP3 encoder quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    /// LAME VBR level passed as `-q:a` (0 is best, 9 smallest)
    pub fn vbr_level(self) -> u8 {
        match self {
            Quality::Low => 9,
            Quality::Medium => 4,
            Quality::High => 0,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        })
    }
}

impl FromStr for Quality {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" | "med" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            _ => Err(PipelineError::InvalidParameter(format!(
                "invalid quality level: {}. Use: low, medium, high",
                s
            ))),
        }
    }
}

/// Default MP3 bitrate
pub const DEFAULT_BITRATE: &str = "128k";

/// Check a bitrate string such as "128k"
pub fn validate_bitrate(bitrate: &str) -> PipelineResult<()> {
    let digits = bitrate
        .strip_suffix('k')
        .or_else(|| bitrate.strip_suffix('K'))
        .unwrap_or("");
    match digits.parse::<u32>() {
        Ok(kbps) if kbps > 0 && digits.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        _ => Err(PipelineError::InvalidParameter(format!(
            "invalid bitrate: {}. Use a value like 128k",
            bitrate
        ))),
    }
}

/// Options for one compression run
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Encoder bitrate, e.g. "128k"
    pub bitrate: String,
    pub quality: Quality,
    pub quantization: QuantizationParams,
    pub compression: CompressionParams,
    /// Where the intermediate WAV is written
    pub temp_dir: PathBuf,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BITRATE.to_string(),
            quality: Quality::default(),
            quantization: QuantizationParams::default(),
            compression: CompressionParams::default(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl CompressOptions {
    /// Set the bitrate, validated
    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> PipelineResult<Self> {
        let bitrate = bitrate.into();
        validate_bitrate(&bitrate)?;
        self.bitrate = bitrate;
        Ok(self)
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the quantization depth (1-16 bits)
    pub fn with_quantization_bits(mut self, bits: u8) -> PipelineResult<Self> {
        self.quantization = QuantizationParams::new(bits).ok_or_else(|| {
            PipelineError::InvalidParameter(format!("quantization bits must be 1-16, got {}", bits))
        })?;
        Ok(self)
    }

    /// Set the reducer window size (at least 1)
    pub fn with_compression_factor(mut self, factor: usize) -> PipelineResult<Self> {
        self.compression = CompressionParams::new(factor).ok_or_else(|| {
            PipelineError::InvalidParameter("compression factor must be at least 1".to_string())
        })?;
        Ok(self)
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }
}
