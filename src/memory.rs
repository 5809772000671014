//! Pre-flight memory estimation for a build, sized around this engine's
//! scratch structures (edge table, cross-reference indices, sequence
//! membership arrays) rather than actually allocating anything. The core
//! never consults this itself; it exists for callers that want to reject an
//! oversized build before committing to it.

/// Approximate per-entry overhead of a `HashMap<u32, u32>`-shaped index,
/// accounting for the open-addressing load factor and control bytes.
const HASH_INDEX_ENTRY_BYTES: u64 = 24;

/// Approximate size, in bytes, of one dense edge slot (`parent`, `child`,
/// `symbol`: `u32` each, `weight`: `f32`, `active`: `bool`, padded).
const EDGE_SLOT_BYTES: u64 = 24;

/// Estimates the peak resident bytes a build is likely to use while
/// `window_levels` levels are simultaneously resident in the chain, for
/// `n_sequences` sequences and an `expected_max_arity` root alphabet size.
///
/// This is a coarse upper bound, not an exact accounting: actual usage
/// depends on how much merging collapses the per-level structures below
/// their worst-case, one-edge-per-sequence size.
#[must_use]
pub fn estimate_peak_bytes(n_sequences: usize, window_levels: u32, expected_max_arity: u32) -> u64 {
    let n = n_sequences as u64;
    let per_level = n * EDGE_SLOT_BYTES
        + n * HASH_INDEX_ENTRY_BYTES * 2 // out_edge_by_symbol, first_in_edge
        + n * HASH_INDEX_ENTRY_BYTES // first_seq
        + n * 4 // next_in_edge: Vec<u32>
        + n * 8 // next_seq: Vec<usize>
        + u64::from(expected_max_arity) * EDGE_SLOT_BYTES;
    per_level.saturating_mul(u64::from(window_levels).saturating_add(2))
}

/// Formats a byte count using binary (KiB/MiB/...) units for log lines and
/// diagnostics.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_byte_counts_without_fraction() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn formats_large_byte_counts_with_unit() {
        assert_eq!(format_bytes(1024 * 1024 * 3), "3.00 MiB");
    }

    #[test]
    fn peak_estimate_grows_with_window() {
        let small = estimate_peak_bytes(1_000, 2, 4);
        let large = estimate_peak_bytes(1_000, 8, 4);
        assert!(large > small);
    }
}
