use crate::error::{Error, Result};

/// Selects which induced-dipole solver `get_electrostatics` dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DipoleMethod {
    /// Damped fixed-point iteration (mixing factor 0.8).
    Iterative,
    /// Preconditioned conjugate gradient on the matrix-free polarization
    /// operator. The default.
    ConjugateGradient,
    /// Always-Stable Predictor-Corrector, for use across a trajectory of
    /// consecutive geometries.
    Aspc,
}

impl Default for DipoleMethod {
    fn default() -> Self {
        DipoleMethod::ConjugateGradient
    }
}

/// The order `k` of the ASPC predictor, validated to lie in `0..=4` at
/// construction time since only that range has tabulated coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspcOrder(u8);

impl AspcOrder {
    pub const MAX: u8 = 4;

    pub fn new(k: usize) -> Result<Self> {
        if k > Self::MAX as usize {
            return Err(Error::InvalidAspcOrder(k));
        }
        Ok(AspcOrder(k as u8))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// History ring length `k + 2` required before the predictor can run;
    /// below this the solver falls back to conjugate gradient.
    pub fn history_len(self) -> usize {
        self.get() + 2
    }
}

impl Default for AspcOrder {
    fn default() -> Self {
        AspcOrder(4)
    }
}

/// Convergence controls shared by all three dipole solvers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub maxit: usize,
    pub method: DipoleMethod,
}

impl SolverConfig {
    pub fn new(tolerance: f64, maxit: usize, method: DipoleMethod) -> Self {
        Self {
            tolerance,
            maxit,
            method,
        }
    }
}
