//! Always-Stable Predictor-Corrector state: the tabulated `(b, omega)`
//! coefficients for predictor order `k in 0..=4`, and the history ring of
//! converged induced-dipole vectors the predictor extrapolates from.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// The predictor coefficients and corrector mixing weight for one ASPC
/// order, tabulated rather than derived (the values are fixed by the
/// predictor's stability analysis, not computed from `k` at runtime).
pub struct AspcCoefficients {
    pub b: &'static [f64],
    pub omega: f64,
}

/// Looks up the tabulated coefficients for predictor order `k`.
///
/// `k` is assumed already validated to `0..=4` by [`ttm4_core::AspcOrder`];
/// this function never runs with anything else.
pub fn coefficients(k: usize) -> AspcCoefficients {
    match k {
        0 => AspcCoefficients {
            b: &[2.0, -1.0],
            omega: 2.0 / 3.0,
        },
        1 => AspcCoefficients {
            b: &[2.5, -2.0, 0.5],
            omega: 0.6,
        },
        2 => AspcCoefficients {
            b: &[2.8, -2.8, 1.2, -0.2],
            omega: 4.0 / 7.0,
        },
        3 => AspcCoefficients {
            b: &[3.0, -24.0 / 7.0, 27.0 / 14.0, -4.0 / 7.0, 1.0 / 14.0],
            omega: 5.0 / 9.0,
        },
        4 => AspcCoefficients {
            b: &[
                22.0 / 7.0,
                -55.0 / 14.0,
                55.0 / 21.0,
                -22.0 / 21.0,
                5.0 / 21.0,
                -1.0 / 42.0,
            ],
            omega: 6.0 / 11.0,
        },
        _ => unreachable!("AspcOrder::new rejects k outside 0..=4"),
    }
}

/// A ring of the last `k + 2` converged induced-dipole vectors (core
/// layout), persistent across `get_electrostatics` calls for the
/// predictor's warm-up.
#[derive(Clone, Debug, Default)]
pub struct AspcHistory {
    capacity: usize,
    ring: VecDeque<Vec<f64>>,
}

impl AspcHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ring: VecDeque::with_capacity(capacity),
        }
    }

    /// Resizes the ring for a new predictor order, discarding any history
    /// accumulated under the old order (a history entry's meaning is tied
    /// to the order it was predicted/corrected under).
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn is_full(&self) -> bool {
        self.ring.len() >= self.capacity
    }

    pub fn push(&mut self, mu: &[f64]) {
        if self.ring.len() == self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(mu.to_vec());
    }

    /// Iterates the history newest-first, i.e. index `i` yields
    /// `mu_hist[newest - i]` as used by the predictor sum in §4.5.
    pub fn newest_first(&self) -> impl Iterator<Item = &Vec<f64>> {
        self.ring.iter().rev()
    }
}
