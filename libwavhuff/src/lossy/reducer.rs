use super::CompressionParams;
use crate::core::{analyze, Sample};

/// Keep one representative per window of `params.window_size()` samples
///
/// The representative is the window value with the highest count over the
/// whole sequence; on a tie the value found first in the window wins.
/// The last window may be short. Output length is ceil(len / window).
pub fn reduce(quantized: &[Sample], params: &CompressionParams) -> Vec<Sample> {
    let global = analyze(quantized);

    quantized
        .chunks(params.window_size())
        .filter_map(|window| {
            window
                .iter()
                .fold(None, |best: Option<(Sample, usize)>, &s| {
                    let count = global.count(s);
                    match best {
                        Some((_, best_count)) if best_count >= count => best,
                        _ => Some((s, count)),
                    }
                })
                .map(|(s, _)| s)
        })
        .collect()
}
