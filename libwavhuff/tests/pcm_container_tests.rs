//! WAV container codec tests
use libwavhuff::pcm;
use libwavhuff::{decode_samples, encode_samples, PcmError, PcmParams, Reader, Writer};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("libwavhuff-{}-{}", uuid::Uuid::new_v4(), name))
}

fn mono16(sample_rate: u32) -> PcmParams {
    PcmParams {
        channels: 1,
        sample_rate,
        sample_width: 2,
        frame_count: 0,
    }
}

// ============================================================================
// Sample packing
// ============================================================================

#[test]
fn test_decode_16bit_little_endian() {
    let raw = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0xff, 0x7f];
    let samples = decode_samples(&raw, 2).unwrap();
    assert_eq!(samples, vec![1, -1, -32768, 32767]);
}

#[test]
fn test_decode_8bit_recentres_unsigned() {
    let samples = decode_samples(&[0, 128, 255], 1).unwrap();
    assert_eq!(samples, vec![-128, 0, 127]);
}

#[test]
fn test_decode_rejects_three_byte_width() {
    let err = decode_samples(&[0; 6], 3).unwrap_err();
    assert!(matches!(err, PcmError::UnsupportedSampleWidth(3)));
}

#[test]
fn test_encode_rejects_out_of_range() {
    let err = encode_samples(&[0, 40000]).unwrap_err();
    match err {
        PcmError::PackError { index, value } => {
            assert_eq!(index, 1);
            assert_eq!(value, 40000);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sample_round_trip_is_lossless() {
    let samples: Vec<i32> = (-32768..=32767).step_by(97).collect();
    let raw = encode_samples(&samples).unwrap();
    assert_eq!(raw.len(), samples.len() * 2);
    assert_eq!(decode_samples(&raw, 2).unwrap(), samples);
}

// ============================================================================
// Container layout
// ============================================================================

#[test]
fn test_writer_emits_canonical_header() {
    let params = PcmParams {
        channels: 2,
        sample_rate: 44100,
        sample_width: 2,
        frame_count: 0,
    };
    let wav = Writer::new().write(&params, &[0u8; 8]).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 8);
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(&wav[12..16], b"fmt ");
    assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
    assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 44100);
    assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 44100 * 4);
    assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
    assert_eq!(&wav[36..40], b"data");
    assert_eq!(wav.len(), 44 + 8);
}

#[test]
fn test_container_round_trip_keeps_params() {
    let frames = encode_samples(&[100, -100, 3000, -3000, 0, 1]).unwrap();
    let wav = pcm::to_bytes(&mono16(22050), &frames).unwrap();
    let (params, raw) = pcm::from_bytes(&wav).unwrap();

    assert_eq!(params.channels, 1);
    assert_eq!(params.sample_rate, 22050);
    assert_eq!(params.sample_width, 2);
    assert_eq!(params.frame_count, 6);
    assert_eq!(raw, frames);
}

#[test]
fn test_reader_skips_unknown_chunks() {
    let frames = encode_samples(&[5, 6, 7]).unwrap();
    let wav = pcm::to_bytes(&mono16(8000), &frames).unwrap();

    // splice an odd-sized LIST chunk between fmt and data
    let mut spliced = wav[..36].to_vec();
    spliced.extend_from_slice(b"LIST");
    spliced.extend_from_slice(&3u32.to_le_bytes());
    spliced.extend_from_slice(&[1, 2, 3, 0]);
    spliced.extend_from_slice(&wav[36..]);

    let (params, raw) = Reader::new().read(&spliced).unwrap();
    assert_eq!(params.frame_count, 3);
    assert_eq!(raw, frames);
}

#[test]
fn test_reader_drops_partial_trailing_frame() {
    let params = PcmParams {
        channels: 2,
        ..mono16(8000)
    };
    let wav = pcm::to_bytes(&params, &[1, 0, 2, 0, 3, 0]).unwrap();
    let (params, raw) = pcm::from_bytes(&wav).unwrap();
    assert_eq!(params.frame_count, 1);
    assert_eq!(raw, vec![1, 0, 2, 0]);
}

#[test]
fn test_reader_rejects_non_riff() {
    let err = pcm::from_bytes(b"ID3\x03 not a wav file at all").unwrap_err();
    assert!(matches!(err, PcmError::InvalidFormat(_)));
}

#[test]
fn test_reader_rejects_float_format() {
    let mut wav = pcm::to_bytes(&mono16(8000), &[0, 0]).unwrap();
    wav[20] = 3; // IEEE float tag
    let err = pcm::from_bytes(&wav).unwrap_err();
    assert!(matches!(err, PcmError::InvalidFormat(_)));
}

#[test]
fn test_reader_reports_empty_audio() {
    let wav = pcm::to_bytes(&mono16(8000), &[]).unwrap();
    let err = pcm::from_bytes(&wav).unwrap_err();
    assert!(matches!(err, PcmError::EmptyAudio));
}

#[test]
fn test_reader_accepts_24bit_container() {
    let params = PcmParams {
        sample_width: 3,
        ..mono16(48000)
    };
    let wav = pcm::to_bytes(&params, &[0; 9]).unwrap();
    let (params, raw) = pcm::from_bytes(&wav).unwrap();
    assert_eq!(params.sample_width, 3);
    assert_eq!(params.frame_count, 3);
    assert!(matches!(
        decode_samples(&raw, params.sample_width),
        Err(PcmError::UnsupportedSampleWidth(3))
    ));
}

/// Minimal PCM header with arbitrary fmt fields, as another tool might write it
fn raw_wav(channels: u16, sample_rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    // byte rate and block align are not trusted by the reader
    wav.extend_from_slice(&0u32.to_le_bytes());
    wav.extend_from_slice(&0u16.to_le_bytes());
    wav.extend_from_slice(&bits.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data.len() as u32).to_le_bytes());
    wav.extend_from_slice(data);
    wav
}

#[test]
fn test_writer_rejects_block_align_overflow() {
    // 40000 channels x 2 bytes does not fit the u16 block align field
    let wav = raw_wav(40000, 8000, 16, &vec![0u8; 80000]);
    let (params, frames) = pcm::from_bytes(&wav).unwrap();
    assert_eq!(params.channels, 40000);
    assert_eq!(params.frame_count, 1);

    let err = Writer::new().write(&params, &frames).unwrap_err();
    assert!(matches!(err, PcmError::InvalidFormat(_)), "{:?}", err);
}

#[test]
fn test_writer_rejects_byte_rate_overflow() {
    let params = PcmParams {
        channels: 8,
        sample_rate: u32::MAX / 4,
        ..mono16(0)
    };
    assert!(matches!(
        pcm::to_bytes(&params, &[0; 16]),
        Err(PcmError::InvalidFormat(_))
    ));
}

#[test]
fn test_writer_rejects_oversized_bit_depth() {
    // 65535 bits rounds up to 8192-byte samples, 65536 bits on rewrite
    let wav = raw_wav(1, 8000, u16::MAX, &vec![0u8; 8192]);
    let (params, frames) = pcm::from_bytes(&wav).unwrap();
    assert_eq!(params.sample_width, 8192);
    assert_eq!(params.bit_depth(), 65536);
    assert!(matches!(
        pcm::to_bytes(&params, &frames),
        Err(PcmError::InvalidFormat(_))
    ));
}

// ============================================================================
// File I/O
// ============================================================================

#[test]
fn test_read_missing_file_is_not_found() {
    let path = temp_path("missing.wav");
    let err = pcm::read(&path).unwrap_err();
    assert!(matches!(err, PcmError::NotFound(p) if p == path));
}

#[test]
fn test_write_then_read_file() {
    let path = temp_path("roundtrip.wav");
    let frames = encode_samples(&[1, 2, 3, 4]).unwrap();
    pcm::write(&path, &mono16(16000), &frames).unwrap();

    let (params, raw) = pcm::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(params.sample_rate, 16000);
    assert_eq!(params.frame_count, 4);
    assert_eq!(raw, frames);
}

#[test]
fn test_params_serialize_as_plain_fields() {
    let params = PcmParams {
        frame_count: 4,
        ..mono16(8000)
    };
    let json = serde_json::to_value(params).unwrap();
    assert_eq!(json["channels"], 1);
    assert_eq!(json["sample_rate"], 8000);
    assert_eq!(json["sample_width"], 2);
    assert_eq!(json["frame_count"], 4);
    let back: PcmParams = serde_json::from_value(json).unwrap();
    assert_eq!(back, params);
}
