//! FfmpegEncoder process handling, driven by stand-in shell scripts
#![cfg(unix)]

use libwavhuff::{encode_samples, pcm, PcmParams};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use wavhuff::{
    AudioEncoder, CompressOptions, ErrorKind, FfmpegEncoder, Pipeline, Quality, Stage,
    SymphoniaDecoder,
};

const COPY_SCRIPT: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then exit 0; fi
for a; do last=$a; done
printf '%s\n' "$@" > "$last.args"
cp "$6" "$last"
"#;

const HANG_SCRIPT: &str = "#!/bin/sh\nexec sleep 30\n";

const PARTIAL_HANG_SCRIPT: &str = r#"#!/bin/sh
for a; do last=$a; done
echo partial > "$last"
exec sleep 30
"#;

const FAIL_SCRIPT: &str = "#!/bin/sh\necho 'unknown encoder libmp3lame' >&2\nexit 3\n";

/// Stand-in encoder executables
struct Scripts {
    copy: PathBuf,
    hang: PathBuf,
    partial_hang: PathBuf,
    fail: PathBuf,
}

/// Every script is written before any test spawns a process, so no
/// child can inherit a file still open for writing
fn scripts() -> &'static Scripts {
    static SCRIPTS: OnceLock<Scripts> = OnceLock::new();
    SCRIPTS.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("wavhuff-scripts-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let install = |name: &str, body: &str| {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        };
        Scripts {
            copy: install("copy.sh", COPY_SCRIPT),
            hang: install("hang.sh", HANG_SCRIPT),
            partial_hang: install("partial_hang.sh", PARTIAL_HANG_SCRIPT),
            fail: install("fail.sh", FAIL_SCRIPT),
        }
    })
}

struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("wavhuff-enc-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(root.join("tmp")).unwrap();
        Scratch { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn tmp(&self) -> PathBuf {
        self.root.join("tmp")
    }

    fn tmp_is_empty(&self) -> bool {
        fs::read_dir(self.tmp()).unwrap().next().is_none()
    }

    fn write_wav(&self, name: &str, samples: &[i32]) -> PathBuf {
        let path = self.path(name);
        let params = PcmParams {
            channels: 1,
            sample_rate: 8000,
            sample_width: 2,
            frame_count: 0,
        };
        pcm::write(&path, &params, &encode_samples(samples).unwrap()).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn encoder(program: &Path, timeout_ms: u64) -> FfmpegEncoder {
    FfmpegEncoder::new(program, Duration::from_millis(timeout_ms))
}

#[test]
fn test_command_line_and_success() {
    let scratch = Scratch::new();
    let input = scratch.write_wav("in.wav", &[1, 2, 3, 4]);
    let output = scratch.path("out.mp3");

    encoder(&scripts().copy, 10_000)
        .encode(&input, &output, "192k", Quality::High)
        .unwrap();

    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
    let args = fs::read_to_string(scratch.path("out.mp3.args")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    let input = input.to_string_lossy();
    let output = output.to_string_lossy();
    assert_eq!(
        args,
        vec![
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            &*input,
            "-vn",
            "-codec:a",
            "libmp3lame",
            "-b:a",
            "192k",
            "-q:a",
            "0",
            &*output,
        ]
    );
}

#[test]
fn test_quality_maps_to_vbr_level() {
    let scratch = Scratch::new();
    let input = scratch.write_wav("in.wav", &[0; 8]);

    for (quality, level) in [(Quality::Low, "9"), (Quality::Medium, "4"), (Quality::High, "0")] {
        let output = scratch.path(&format!("{}.mp3", quality));
        encoder(&scripts().copy, 10_000)
            .encode(&input, &output, "64k", quality)
            .unwrap();
        let args = fs::read_to_string(scratch.path(&format!("{}.mp3.args", quality))).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(args[args.len() - 2], level);
    }
}

#[test]
fn test_nonzero_exit_reports_stderr() {
    let scratch = Scratch::new();
    let input = scratch.write_wav("in.wav", &[0; 8]);

    let err = encoder(&scripts().fail, 10_000)
        .encode(&input, &scratch.path("out.mp3"), "128k", Quality::Medium)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalEncoderFailure);
    let message = err.to_string();
    assert!(message.contains("unknown encoder libmp3lame"), "{}", message);
}

#[test]
fn test_hung_encoder_is_killed_at_timeout() {
    let scratch = Scratch::new();
    let input = scratch.write_wav("in.wav", &[0; 8]);

    let started = Instant::now();
    let err = encoder(&scripts().hang, 500)
        .encode(&input, &scratch.path("out.mp3"), "128k", Quality::Medium)
        .unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::ExternalEncoderFailure);
    assert!(err.to_string().contains("timed out"), "{}", err);
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
}

#[test]
fn test_missing_program_fails_to_start() {
    let scratch = Scratch::new();
    let input = scratch.write_wav("in.wav", &[0; 8]);
    let missing = scratch.path("no-such-encoder");

    let err = encoder(&missing, 1_000)
        .encode(&input, &scratch.path("out.mp3"), "128k", Quality::Medium)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalEncoderFailure);
    assert!(!encoder(&missing, 1_000).is_available());
    assert!(encoder(&scripts().copy, 1_000).is_available());
}

#[test]
fn test_timeout_in_pipeline_removes_partial_output() {
    let scratch = Scratch::new();
    let samples: Vec<i32> = (0..600).map(|i| (i % 50) * 100).collect();
    let input = scratch.write_wav("tone.wav", &samples);
    let output = scratch.path("tone.mp3");
    let options = CompressOptions::default().with_temp_dir(scratch.tmp());
    let pipeline = Pipeline::new(
        encoder(&scripts().partial_hang, 500),
        SymphoniaDecoder,
        options,
    );

    let mut stages = Vec::new();
    let err = pipeline
        .compress_with_progress(&input, Some(&output), |s| stages.push(s))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalEncoderFailure);
    assert_eq!(stages.last(), Some(&Stage::Failed));
    assert!(stages.contains(&Stage::Encoding));
    assert!(!output.exists(), "partial output must be removed");
    assert!(scratch.tmp_is_empty(), "intermediate must be removed");
}

#[test]
fn test_pipeline_with_process_encoder() {
    let scratch = Scratch::new();
    let samples: Vec<i32> = (0..900).map(|i| (i % 30) * 200).collect();
    let input = scratch.write_wav("tone.wav", &samples);
    let output = scratch.path("tone.out.wav");
    let options = CompressOptions::default().with_temp_dir(scratch.tmp());
    let pipeline = Pipeline::new(encoder(&scripts().copy, 10_000), SymphoniaDecoder, options);

    let report = pipeline.compress(&input, Some(&output)).unwrap();
    assert_eq!(report.intermediate_size, report.final_size);
    assert!(report.warning.is_none());
    assert!(scratch.tmp_is_empty());
}
