use crate::error::{PipelineError, PipelineResult};
use anyhow::{Context, Result};
use libwavhuff::{pcm, PcmParams};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Interleaved 16-bit audio decoded from an encoded artifact
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Container params for writing these samples as 16-bit PCM
    pub fn pcm_params(&self) -> PcmParams {
        PcmParams {
            channels: self.channels as u16,
            sample_rate: self.sample_rate,
            sample_width: 2,
            frame_count: self.frames() as u64,
        }
    }
}

/// Decoder collaborator: encoded artifact -> PCM
pub trait AudioDecoder {
    fn decode(&self, input: &Path) -> PipelineResult<DecodedAudio>;

    /// Sanity probe used after encoding; returns the playable duration
    fn probe(&self, input: &Path) -> PipelineResult<f64> {
        let audio = self.decode(input)?;
        if audio.samples.is_empty() {
            return Err(PipelineError::ExternalDecoderFailure(
                "no audio frames decoded".to_string(),
            ));
        }
        Ok(audio.duration_secs())
    }

    /// Decode `input` and write it as a 16-bit WAV at `output`
    fn decode_to_wav(&self, input: &Path, output: &Path) -> PipelineResult<PcmParams> {
        let audio = self.decode(input)?;
        let params = audio.pcm_params();
        let frames = libwavhuff::core::pack_i16(&audio.samples);
        pcm::write(output, &params, &frames)?;
        Ok(params)
    }
}

/// In-process decoder for MP3 and WAV built on symphonia
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, input: &Path) -> PipelineResult<DecodedAudio> {
        read_audio_file(input)
            .map_err(|e| PipelineError::ExternalDecoderFailure(format!("{:#}", e)))
    }
}

/// Read an audio file into interleaved i16 samples
pub fn read_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

fn read_from_source(mss: MediaSourceStream, extension: Option<&str>) -> Result<DecodedAudio> {
    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<i16>> = None;

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        // mp3 streams only report their layout once the first frame is decoded
        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let needed = decoded.capacity() * spec.channels.count();
        if buffer.as_ref().map_or(true, |b| b.capacity() < needed) {
            buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = buffer.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: sample_rate.context("Unknown sample rate")?,
        channels: channels.context("Unknown channel count")?,
    })
}
