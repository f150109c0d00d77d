//! Compression pipeline orchestrator
//!
//! Runs Reading -> Decoding -> Quantizing -> Reducing -> Restoring ->
//! Clamping -> WritingIntermediate -> Encoding -> Validating -> Done,
//! dropping to Failed from any stage before Validating.

use crate::audio::AudioDecoder;
use crate::encoder::AudioEncoder;
use crate::error::{PipelineError, PipelineResult};
use crate::options::{CompressOptions, Quality};
use chrono::{DateTime, Utc};
use libwavhuff::{
    analyze, build_code_table, clamp_and_pack, pcm, quantize, reduce, restore, PcmError,
    PcmParams, Sample,
};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Reading,
    Decoding,
    Quantizing,
    Reducing,
    Restoring,
    Clamping,
    WritingIntermediate,
    Encoding,
    Validating,
    Done,
    Failed,
}

impl Stage {
    /// The stages a successful run passes through, in order
    pub const SEQUENCE: [Stage; 10] = [
        Stage::Reading,
        Stage::Decoding,
        Stage::Quantizing,
        Stage::Reducing,
        Stage::Restoring,
        Stage::Clamping,
        Stage::WritingIntermediate,
        Stage::Encoding,
        Stage::Validating,
        Stage::Done,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            Stage::Reading => "Reading WAV container",
            Stage::Decoding => "Decoding samples",
            Stage::Quantizing => "Quantizing and building prefix codes",
            Stage::Reducing => "Reducing by symbol frequency",
            Stage::Restoring => "Restoring original length",
            Stage::Clamping => "Clamping to 16-bit range",
            Stage::WritingIntermediate => "Writing intermediate WAV",
            Stage::Encoding => "Encoding to MP3",
            Stage::Validating => "Validating MP3 output",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of one compression run
#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub params: PcmParams,
    pub bitrate: String,
    pub quality: Quality,
    pub quantization_bits: u8,
    pub compression_factor: usize,
    pub original_samples: usize,
    pub reduced_samples: usize,
    pub restored_samples: usize,
    /// Distinct quantized values (prefix code table size)
    pub unique_symbols: usize,
    pub value_range: Option<(Sample, Sample)>,
    /// Frequency-weighted bits per symbol of the derived codes, diagnostic only
    pub average_code_length: f64,
    pub max_code_length: usize,
    pub window_reduction_percent: f64,
    /// Raw frame bytes of the input
    pub original_data_size: u64,
    pub intermediate_size: u64,
    pub intermediate_reduction_percent: f64,
    pub final_size: u64,
    pub total_reduction_percent: f64,
    pub validated_duration_secs: Option<f64>,
    pub warning: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of a convert-back run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub params: PcmParams,
    pub output_size: u64,
}

/// Outcome of a folder run
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub total: usize,
    pub reports: Vec<CompressionReport>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn successful(&self) -> usize {
        self.reports.len()
    }
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Intermediate WAV, deleted when dropped
struct IntermediateFile {
    path: PathBuf,
}

impl IntermediateFile {
    fn create(dir: &Path, params: &PcmParams, frames: &[u8]) -> PipelineResult<Self> {
        let file = IntermediateFile {
            path: dir.join(format!("wavhuff-{}.wav", Uuid::new_v4())),
        };
        // on error the guard drops here and removes any partial file
        pcm::write(&file.path, params, frames)?;
        Ok(file)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> PipelineResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }
}

impl Drop for IntermediateFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed intermediate"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove intermediate"),
        }
    }
}

/// `<stem>_huffman.mp3` next to the input
pub fn default_compressed_path(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "_huffman.mp3")
}

/// `<stem>_from_mp3.wav` next to the input
pub fn default_decompressed_path(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "_from_mp3.wav")
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, suffix))
}

fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

fn reduction_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (1.0 - after as f64 / before as f64) * 100.0
}

fn ensure_exists(path: &Path) -> PipelineResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PcmError::NotFound(path.to_path_buf()).into())
    }
}

/// Orchestrates one compression per call; holds no per-run state
pub struct Pipeline<E, D> {
    encoder: E,
    decoder: D,
    options: CompressOptions,
}

impl<E: AudioEncoder, D: AudioDecoder> Pipeline<E, D> {
    pub fn new(encoder: E, decoder: D, options: CompressOptions) -> Self {
        Self {
            encoder,
            decoder,
            options,
        }
    }

    pub fn options(&self) -> &CompressOptions {
        &self.options
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Compress `input` to MP3 without progress reporting
    pub fn compress(&self, input: &Path, output: Option<&Path>) -> PipelineResult<CompressionReport> {
        self.compress_with_progress(input, output, |_| {})
    }

    /// Compress `input` to MP3, calling `progress` on entry to every stage
    ///
    /// `output` defaults to [`default_compressed_path`]. On any error the
    /// intermediate WAV is gone and `progress` has seen [`Stage::Failed`].
    pub fn compress_with_progress(
        &self,
        input: &Path,
        output: Option<&Path>,
        mut progress: impl FnMut(Stage),
    ) -> PipelineResult<CompressionReport> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_compressed_path(input));

        info!(input = %input.display(), output = %output.display(), "compression started");
        let result = self.run(input, &output, &mut progress);

        match &result {
            Ok(report) => info!(
                output = %report.output.display(),
                total_reduction = report.total_reduction_percent,
                "compression finished"
            ),
            Err(e) => {
                warn!(input = %input.display(), kind = %e.kind(), error = %e, "compression failed");
                progress(Stage::Failed);
            }
        }
        result
    }

    fn run(
        &self,
        input: &Path,
        output: &Path,
        progress: &mut impl FnMut(Stage),
    ) -> PipelineResult<CompressionReport> {
        let q = self.options.quantization;
        let c = self.options.compression;

        progress(Stage::Reading);
        ensure_exists(input)?;
        if !has_wav_extension(input) {
            return Err(PipelineError::InvalidFormat(input.display().to_string()));
        }
        let (params, frames) = pcm::read(input)?;

        progress(Stage::Decoding);
        let samples = pcm::decode_samples(&frames, params.sample_width)?;
        debug!(samples = samples.len(), "decoded samples");

        progress(Stage::Quantizing);
        let quantized = quantize(&samples, &q);
        let table = analyze(&quantized);
        let codes = build_code_table(&table);
        debug!(
            unique_symbols = codes.len(),
            min = q.min_val(),
            max = q.max_val(),
            "quantized"
        );

        progress(Stage::Reducing);
        let reduced = reduce(&quantized, &c);
        debug!(original = quantized.len(), reduced = reduced.len(), "reduced");

        progress(Stage::Restoring);
        let restored = restore(&reduced, samples.len(), &q, &c);

        progress(Stage::Clamping);
        let packed = clamp_and_pack(&restored)?;

        progress(Stage::WritingIntermediate);
        let intermediate = IntermediateFile::create(&self.options.temp_dir, &params, &packed)?;
        let intermediate_size = intermediate.size()?;

        progress(Stage::Encoding);
        if let Err(e) = self.encode(intermediate.path(), output) {
            remove_partial(output);
            return Err(e);
        }

        progress(Stage::Validating);
        let (validated_duration_secs, warning) = match self.decoder.probe(output) {
            Ok(duration) => (Some(duration), None),
            Err(e) => {
                let warning = PipelineError::ValidationWarning(e.to_string());
                warn!(output = %output.display(), "{}", warning);
                (None, Some(warning.to_string()))
            }
        };
        drop(intermediate);

        let original_data_size = frames.len() as u64;
        let final_size = fs::metadata(output)?.len();

        progress(Stage::Done);
        Ok(CompressionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            params,
            bitrate: self.options.bitrate.clone(),
            quality: self.options.quality,
            quantization_bits: q.bits(),
            compression_factor: c.window_size(),
            original_samples: samples.len(),
            reduced_samples: reduced.len(),
            restored_samples: restored.len(),
            unique_symbols: codes.len(),
            value_range: table.value_range(),
            average_code_length: codes.average_code_length(&table),
            max_code_length: codes.max_code_length(),
            window_reduction_percent: reduction_percent(
                quantized.len() as u64,
                reduced.len() as u64,
            ),
            original_data_size,
            intermediate_size,
            intermediate_reduction_percent: reduction_percent(
                original_data_size,
                intermediate_size,
            ),
            final_size,
            total_reduction_percent: reduction_percent(original_data_size, final_size),
            validated_duration_secs,
            warning,
            completed_at: Utc::now(),
        })
    }

    fn encode(&self, intermediate: &Path, output: &Path) -> PipelineResult<()> {
        self.encoder
            .encode(
                intermediate,
                output,
                &self.options.bitrate,
                self.options.quality,
            )
            .and_then(|()| {
                if output.is_file() {
                    Ok(())
                } else {
                    Err(PipelineError::ExternalEncoderFailure(format!(
                        "encoder reported success but wrote no file at {}",
                        output.display()
                    )))
                }
            })
    }

    /// Decode an encoded artifact back to a plain WAV
    ///
    /// `output` defaults to [`default_decompressed_path`].
    pub fn convert_back(&self, input: &Path, output: Option<&Path>) -> PipelineResult<ConversionReport> {
        ensure_exists(input)?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_decompressed_path(input));

        info!(input = %input.display(), output = %output.display(), "converting back to WAV");
        let params = match self.decoder.decode_to_wav(input, &output) {
            Ok(params) => params,
            Err(e) => {
                remove_partial(&output);
                return Err(e);
            }
        };

        Ok(ConversionReport {
            input: input.to_path_buf(),
            output_size: fs::metadata(&output)?.len(),
            output,
            params,
        })
    }

    /// Compress every `.wav` file in `folder` into `folder/compressed/`
    ///
    /// `progress` sees `(index, total, path)` before each file, 1-based.
    /// A failing file is recorded and the batch continues.
    pub fn compress_folder(
        &self,
        folder: &Path,
        mut progress: impl FnMut(usize, usize, &Path),
    ) -> PipelineResult<BatchReport> {
        if !folder.is_dir() {
            return Err(PcmError::NotFound(folder.to_path_buf()).into());
        }

        let mut inputs: Vec<PathBuf> = fs::read_dir(folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_wav_extension(p))
            .collect();
        inputs.sort();

        let output_dir = folder.join("compressed");
        let mut batch = BatchReport {
            output_dir: output_dir.clone(),
            total: inputs.len(),
            ..Default::default()
        };
        if inputs.is_empty() {
            return Ok(batch);
        }
        fs::create_dir_all(&output_dir)?;

        for (i, input) in inputs.iter().enumerate() {
            progress(i + 1, inputs.len(), input);
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let output = output_dir.join(format!("{}.mp3", stem));
            match self.compress(input, Some(&output)) {
                Ok(report) => batch.reports.push(report),
                Err(e) => batch.failures.push(BatchFailure {
                    input: input.clone(),
                    error: e.to_string(),
                }),
            }
        }

        Ok(batch)
    }
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let input = Path::new("/music/take1.wav");
        assert_eq!(
            default_compressed_path(input),
            PathBuf::from("/music/take1_huffman.mp3")
        );
        assert_eq!(
            default_decompressed_path(Path::new("/music/take1.mp3")),
            PathBuf::from("/music/take1_from_mp3.wav")
        );
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert!(has_wav_extension(Path::new("a.WAV")));
        assert!(has_wav_extension(Path::new("a.wav")));
        assert!(!has_wav_extension(Path::new("a.mp3")));
        assert!(!has_wav_extension(Path::new("wav")));
    }

    #[test]
    fn test_reduction_percent() {
        assert_eq!(reduction_percent(0, 10), 0.0);
        assert!((reduction_percent(200, 50) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_stage_sequence_ends_in_done() {
        assert_eq!(Stage::SEQUENCE.first(), Some(&Stage::Reading));
        assert_eq!(Stage::SEQUENCE.last(), Some(&Stage::Done));
        assert!(!Stage::SEQUENCE.contains(&Stage::Failed));
    }
}
