//! Prefix-code statistics for wavhuff
//!
//! Builds a Huffman-style tree over the quantized symbol distribution and
//! derives a prefix-free code table from it. The table describes the
//! distribution only; no sample data is ever bit-packed with it.

pub mod codes;
pub mod tree;

pub use codes::{build_code_table, derive_codes, CodeTable};
pub use tree::{build_tree, PrefixNode};
