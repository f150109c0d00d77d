//! File-level entry points of the PCM container codec

use crate::core::{PcmError, PcmParams, PcmResult};
use crate::{Reader, Writer};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

pub use crate::core::{decode_samples, encode_samples};

/// Read a WAV file into its container params and raw frame bytes
///
/// Fails with [`PcmError::NotFound`] when `path` does not exist and with
/// [`PcmError::EmptyAudio`] when the data chunk holds no frames.
pub fn read(path: &Path) -> PcmResult<(PcmParams, Vec<u8>)> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PcmError::NotFound(path.to_path_buf()),
        _ => PcmError::Io(e),
    })?;

    let (params, frames) = Reader::new().read(&bytes)?;
    debug!(
        path = %path.display(),
        channels = params.channels,
        sample_rate = params.sample_rate,
        sample_width = params.sample_width,
        frames = params.frame_count,
        "read WAV container"
    );
    Ok((params, frames))
}

/// Write `frames` under the given container params
pub fn write(path: &Path, params: &PcmParams, frames: &[u8]) -> PcmResult<()> {
    let bytes = Writer::new().write(params, frames)?;
    fs::write(path, bytes)?;
    debug!(path = %path.display(), bytes = frames.len(), "wrote WAV container");
    Ok(())
}

/// In-memory variant of [`read`]
pub fn from_bytes(bytes: &[u8]) -> PcmResult<(PcmParams, Vec<u8>)> {
    Reader::new().read(bytes)
}

/// In-memory variant of [`write`]
pub fn to_bytes(params: &PcmParams, frames: &[u8]) -> PcmResult<Vec<u8>> {
    Writer::new().write(params, frames)
}
