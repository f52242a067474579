use thiserror::Error;

/// Crate-wide result alias, used by every fallible function in the `ttm4`
/// workspace.
pub type Result<T> = core::result::Result<T, Error>;

/// The dipole solver that produced a [`Error::NonConvergent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DipoleSolver {
    Iterative,
    ConjugateGradient,
    Aspc,
}

impl core::fmt::Display for DipoleSolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DipoleSolver::Iterative => "iterative",
            DipoleSolver::ConjugateGradient => "conjugate gradient",
            DipoleSolver::Aspc => "aspc",
        };
        f.write_str(name)
    }
}

/// Errors that can arise while configuring or driving the electrostatics
/// engine.
///
/// There is no panic path for solver non-convergence or bad configuration;
/// both are reported here instead of aborting the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("dipole method {0:?} is not supported")]
    UnsupportedDipoleMethod(crate::config::DipoleMethod),

    #[error("aspc order must be between 0 and 4, got {0}")]
    InvalidAspcOrder(usize),

    #[error("{solver} failed to converge after {iter} iterations (last residual {last_residual:e})")]
    NonConvergent {
        solver: DipoleSolver,
        iter: usize,
        last_residual: f64,
    },

    #[error("site array length mismatch: expected {expected}, got {got}")]
    SiteArrayLengthMismatch { expected: usize, got: usize },
}
