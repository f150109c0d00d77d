//! Layered settings: defaults, optional TOML file, WAVHUFF_* environment

use crate::error::{PipelineError, PipelineResult};
use crate::options::{validate_bitrate, CompressOptions, Quality, DEFAULT_BITRATE};
use config::{Config, Environment, File};
use libwavhuff::{DEFAULT_COMPRESSION_FACTOR, DEFAULT_QUANTIZATION_BITS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_NAME: &str = "wavhuff";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WAVHUFF";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bitrate: String,
    pub quality: Quality,
    pub quantization_bits: u8,
    pub compression_factor: usize,
    pub encoder: EncoderSettings,
    /// Intermediate WAV location, OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// MP3 encoder executable
    pub program: String,
    /// Kill the encoder after this many seconds
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BITRATE.to_string(),
            quality: Quality::default(),
            quantization_bits: DEFAULT_QUANTIZATION_BITS,
            compression_factor: DEFAULT_COMPRESSION_FACTOR,
            encoder: EncoderSettings::default(),
            temp_dir: None,
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Settings {
    /// Load settings; an explicit `path` must exist, the default file may not
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        validate_bitrate(&self.bitrate)?;
        if !(1..=16).contains(&self.quantization_bits) {
            return Err(PipelineError::InvalidParameter(format!(
                "quantization_bits must be 1-16, got {}",
                self.quantization_bits
            )));
        }
        if self.compression_factor == 0 {
            return Err(PipelineError::InvalidParameter(
                "compression_factor must be at least 1".to_string(),
            ));
        }
        if self.encoder.timeout_secs == 0 {
            return Err(PipelineError::InvalidParameter(
                "encoder.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn encoder_timeout(&self) -> Duration {
        Duration::from_secs(self.encoder.timeout_secs)
    }

    /// Options for a compression run built from these settings
    pub fn compress_options(&self) -> PipelineResult<CompressOptions> {
        let options = CompressOptions::default()
            .with_bitrate(self.bitrate.clone())?
            .with_quality(self.quality)
            .with_quantization_bits(self.quantization_bits)?
            .with_compression_factor(self.compression_factor)?;

        Ok(match &self.temp_dir {
            Some(dir) => options.with_temp_dir(dir),
            None => options,
        })
    }
}
