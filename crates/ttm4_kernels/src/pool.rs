//! The private-per-thread-workspace parallel reduction shared by every
//! driver in the `ttm4` engine.
//!
//! Each worker owns one workspace (typically a handful of accumulator
//! buffers bundled in a small struct) for the whole duration of a parallel
//! region; no locks or atomics guard the hot kernel loop. After the region
//! ends, the driver folds every worker's workspace into the shared arrays
//! on a single thread. With the `multicore` feature off, the fold runs
//! sequentially on the calling thread, so the crate stays usable (and
//! deterministic) without a thread pool.

use alloc::vec::Vec;
use core::ops::Range;

/// The number of workers a parallel region should divide its work across.
pub fn num_threads() -> usize {
    #[cfg(feature = "multicore")]
    {
        maybe_rayon::current_num_threads()
    }
    #[cfg(not(feature = "multicore"))]
    {
        1
    }
}

/// Splits `0..n` into `num_threads()` (or fewer, for small `n`) contiguous,
/// non-overlapping chunks.
pub fn chunk_ranges(n: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let nthreads = num_threads().max(1);
    let chunk = n.div_ceil(nthreads).max(1);
    (0..n).step_by(chunk).map(|s| s..(s + chunk).min(n)).collect()
}

/// Runs `body(range, workspace)` once per entry of `pool`/`ranges` (which
/// must be the same length, one element per worker), in parallel when the
/// `multicore` feature is enabled. Each worker's `&mut T` is exclusive to
/// it for the call's duration; the caller reduces `pool` into shared state
/// afterward.
pub fn par_for_each_worker<T: Send>(
    pool: &mut [T],
    ranges: &[Range<usize>],
    body: impl Fn(Range<usize>, &mut T) + Sync,
) {
    debug_assert_eq!(pool.len(), ranges.len());

    #[cfg(feature = "multicore")]
    {
        use maybe_rayon::prelude::*;
        pool.par_iter_mut()
            .zip(ranges.par_iter().cloned())
            .for_each(|(workspace, range)| body(range, workspace));
    }
    #[cfg(not(feature = "multicore"))]
    {
        for (workspace, range) in pool.iter_mut().zip(ranges.iter().cloned()) {
            body(range, workspace);
        }
    }
}

/// Sums a per-worker scalar field (extracted by `field`) into `out`, after
/// a [`par_for_each_worker`] region has joined.
pub fn reduce_into<T>(pool: &[T], field: impl Fn(&T) -> &[f64], out: &mut [f64]) {
    for workspace in pool {
        for (o, b) in out.iter_mut().zip(field(workspace).iter()) {
            *o += *b;
        }
    }
}
