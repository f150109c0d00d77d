//! libwavhuff - PCM pre-processing core
//!
//! Parses and writes WAV containers, analyses symbol frequencies, derives
//! prefix-free code tables, and runs the quantize / reduce / restore / clamp
//! chain that shapes audio before it is handed to an MP3 encoder.
//!
//! All transforms are pure functions over sample slices. Tables are built
//! fresh on every call, so concurrent runs never share state.

pub mod core;
pub mod lossy;
pub mod pcm;
pub mod prefix;

mod reader;
mod writer;

pub use core::{
    analyze, decode_samples, encode_samples, FrequencyTable, PcmError, PcmParams, PcmResult,
    Sample, I16_MAX, I16_MIN,
};
pub use lossy::{
    clamp_and_pack, clamp_samples, quantize, reduce, restore, CompressionParams,
    QuantizationParams, DEFAULT_COMPRESSION_FACTOR, DEFAULT_QUANTIZATION_BITS,
};
pub use prefix::{build_code_table, build_tree, derive_codes, CodeTable, PrefixNode};
pub use reader::Reader;
pub use writer::Writer;
