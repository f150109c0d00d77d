//! Error types for the compression pipeline

use libwavhuff::PcmError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure class of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    UnsupportedSampleWidth,
    EmptyAudio,
    PackError,
    InvalidParameter,
    ExternalEncoderFailure,
    ExternalDecoderFailure,
    ValidationWarning,
    Config,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Pcm(#[from] PcmError),

    /// Input is not a `.wav` file
    #[error("input must be a .wav file: {0}")]
    InvalidFormat(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("external encoder failed: {0}")]
    ExternalEncoderFailure(String),

    #[error("external decoder failed: {0}")]
    ExternalDecoderFailure(String),

    /// Decode probe of the encoded output failed; reported, never fatal
    #[error("encoded output did not decode cleanly: {0}")]
    ValidationWarning(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Pcm(e) => match e {
                PcmError::NotFound(_) => ErrorKind::NotFound,
                PcmError::InvalidFormat(_) => ErrorKind::InvalidFormat,
                PcmError::UnsupportedSampleWidth(_) => ErrorKind::UnsupportedSampleWidth,
                PcmError::EmptyAudio => ErrorKind::EmptyAudio,
                PcmError::PackError { .. } => ErrorKind::PackError,
                PcmError::Io(_) => ErrorKind::Io,
            },
            PipelineError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            PipelineError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            PipelineError::ExternalEncoderFailure(_) => ErrorKind::ExternalEncoderFailure,
            PipelineError::ExternalDecoderFailure(_) => ErrorKind::ExternalDecoderFailure,
            PipelineError::ValidationWarning(_) => ErrorKind::ValidationWarning,
            PipelineError::Config(_) => ErrorKind::Config,
            PipelineError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
