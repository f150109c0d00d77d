pub mod frequency;
pub mod sample_constants;
pub mod samples;
pub mod types;

pub use frequency::{analyze, FrequencyTable};
pub use sample_constants::*;
pub use samples::{decode_samples, encode_samples, pack_i16};
pub use types::*;
