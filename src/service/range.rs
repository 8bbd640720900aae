//! Expansion of a reserved counter value into concrete identifiers.
//!
//! The counter service only hands back the value *after* adding
//! `batch_size`. That value names the last identifier of the batch; the
//! earlier ones are the `batch_size - 1` values preceding it, walking the
//! configured range backwards and wrapping from `range_start` to
//! `range_end`.

use crate::domain::TypeConfig;

/// Identifier at offset `k` from the end of a batch reserved at `counter`.
///
/// Computes `range_start + ((counter - 1 - k) mod span)` with a
/// non-negative modulus, so offsets that step below the start of the range
/// wrap around to its end.
#[must_use]
pub fn nth_from_end(counter: u64, k: u64, config: &TypeConfig) -> u64 {
    let span = i128::from(config.span());
    let offset = (i128::from(counter) - 1 - i128::from(k)).rem_euclid(span);

    // offset < span, so range_start + offset <= range_end
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let offset = offset as u64;
    config.range_start + offset
}

/// Expand a post-increment counter value into a full batch.
///
/// The returned vector holds `batch_size` identifiers; its last element is
/// the one derived directly from `counter`. Values are pairwise distinct
/// because registration guarantees `batch_size <= span`.
#[must_use]
pub fn expand(counter: u64, config: &TypeConfig) -> Vec<u64> {
    let batch = u64::from(config.batch_size);
    (0..batch)
        .rev()
        .map(|k| nth_from_end(counter, k, config))
        .collect()
}
