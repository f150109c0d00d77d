//! wavhuff - WAV to MP3 compressor library
//!
//! Wraps the libwavhuff pre-processing core in a pipeline that writes an
//! intermediate WAV, hands it to an external MP3 encoder and probes the
//! result. Also converts MP3 back to WAV and reports WAV container info.
//!

pub mod audio;
pub mod encoder;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod settings;

pub use audio::{AudioDecoder, DecodedAudio, SymphoniaDecoder};
pub use encoder::{AudioEncoder, FfmpegEncoder};
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use options::{validate_bitrate, CompressOptions, Quality};
pub use pipeline::{
    default_compressed_path, default_decompressed_path, BatchFailure, BatchReport,
    CompressionReport, ConversionReport, Pipeline, Stage,
};
pub use settings::Settings;

/// Re-export the core crate
pub use libwavhuff;

use libwavhuff::{pcm, PcmParams};
use std::fs;
use std::path::{Path, PathBuf};

/// Pipeline wired to ffmpeg and symphonia
pub type DefaultPipeline = Pipeline<FfmpegEncoder, SymphoniaDecoder>;

impl DefaultPipeline {
    /// Build the default pipeline from loaded settings
    pub fn from_settings(settings: &Settings) -> PipelineResult<Self> {
        let encoder = FfmpegEncoder::new(&settings.encoder.program, settings.encoder_timeout());
        Ok(Pipeline::new(
            encoder,
            SymphoniaDecoder,
            settings.compress_options()?,
        ))
    }
}

/// Information about a WAV file
#[derive(Debug, Clone, serde::Serialize)]
pub struct WavInfo {
    pub path: PathBuf,
    pub channels: u16,
    pub sample_rate: u32,
    pub bit_depth: u32,
    pub frame_count: u64,
    pub duration_secs: f64,
    /// Raw frame bytes in the data chunk
    pub data_size: usize,
    pub file_size: u64,
}

impl WavInfo {
    fn new(path: &Path, params: &PcmParams, data_size: usize, file_size: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            channels: params.channels,
            sample_rate: params.sample_rate,
            bit_depth: params.bit_depth(),
            frame_count: params.frame_count,
            duration_secs: params.duration_secs(),
            data_size,
            file_size,
        }
    }
}

/// Get information about a WAV file
pub fn wav_info(path: &Path) -> PipelineResult<WavInfo> {
    let (params, frames) = pcm::read(path)?;
    let file_size = fs::metadata(path)?.len();
    Ok(WavInfo::new(path, &params, frames.len(), file_size))
}
