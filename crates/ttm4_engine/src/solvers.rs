//! The three induced-dipole solvers: conjugate gradient (default), damped
//! fixed-point iteration, and the ASPC predictor-corrector.
//!
//! All three ultimately bottom out in [`crate::dipole_field`]'s all-pairs
//! traversal, either directly (fixed point, the ASPC corrector) or through
//! [`crate::dipole_field::apply_operator`] (CG).

use alloc::vec::Vec;

use ttm4_core::{DipoleSolver, Error, Exclusions, Result, SolverConfig, SystemLayout, Topology};

use crate::aspc::{self, AspcHistory};
use crate::dipole_field;

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Conjugate gradient on the matrix-free polarization operator (§4.5). On
/// success, `mu` holds the converged induced dipoles (core layout).
#[allow(clippy::too_many_arguments)]
pub fn solve_cg<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    config: &SolverConfig,
    xyz: &[f64],
    polfac: &[f64],
    pol_sqrt: &[f64],
    efq: &[f64],
    mu: &mut [f64],
) -> Result<()> {
    let n = efq.len();

    let mut b = alloc::vec![0.0f64; n];
    let mut x = alloc::vec![0.0f64; n];
    for i in 0..n {
        // mu0 = pol * efq = pol_sqrt^2 * efq; x0 = D^-1 mu0 = pol_sqrt * efq.
        b[i] = pol_sqrt[i] * efq[i];
        x[i] = pol_sqrt[i] * efq[i];
    }

    let mut ap = alloc::vec![0.0f64; n];
    let mut scratch_mu = alloc::vec![0.0f64; n];
    let mut scratch_efd = alloc::vec![0.0f64; n];
    dipole_field::apply_operator(
        layout,
        exclusions,
        topology,
        xyz,
        polfac,
        pol_sqrt,
        &x,
        &mut scratch_mu,
        &mut scratch_efd,
        &mut ap,
    );

    let mut r = alloc::vec![0.0f64; n];
    let mut r_new = alloc::vec![0.0f64; n];
    let mut p = alloc::vec![0.0f64; n];
    for i in 0..n {
        r[i] = b[i] - ap[i];
        p[i] = r[i];
    }
    let mut rr = dot(&r, &r);

    if rr < config.tolerance {
        // Already at the fixed point (e.g. every site is non-polarizable, so
        // b = 0 and mu = 0 trivially satisfies the system): stop before the
        // first Ap, since p = r = 0 would make alpha = 0/0 below.
        tracing::debug!(iter = 0, residual = rr, "conjugate gradient converged");
        for i in 0..n {
            mu[i] = pol_sqrt[i] * x[i];
        }
        return Ok(());
    }

    for iter in 0..config.maxit {
        dipole_field::apply_operator(
            layout,
            exclusions,
            topology,
            xyz,
            polfac,
            pol_sqrt,
            &p,
            &mut scratch_mu,
            &mut scratch_efd,
            &mut ap,
        );
        let pap = dot(&p, &ap);
        let alpha = rr / pap;

        for i in 0..n {
            x[i] += alpha * p[i];
            r_new[i] = r[i] - alpha * ap[i];
        }
        let rr_new = dot(&r_new, &r_new);

        if rr_new < config.tolerance {
            tracing::debug!(iter = iter + 1, residual = rr_new, "conjugate gradient converged");
            for i in 0..n {
                mu[i] = pol_sqrt[i] * x[i];
            }
            return Ok(());
        }

        let beta = rr_new / rr;
        for i in 0..n {
            p[i] = r_new[i] + beta * p[i];
        }
        core::mem::swap(&mut r, &mut r_new);
        rr = rr_new;

        if iter == config.maxit - 1 {
            tracing::warn!(iter = iter + 1, residual = rr, "conjugate gradient did not converge");
            return Err(Error::NonConvergent {
                solver: DipoleSolver::ConjugateGradient,
                iter: iter + 1,
                last_residual: rr,
            });
        }
    }

    tracing::warn!(iter = config.maxit, residual = rr, "conjugate gradient did not converge");
    Err(Error::NonConvergent {
        solver: DipoleSolver::ConjugateGradient,
        iter: config.maxit,
        last_residual: rr,
    })
}

/// Damped fixed-point iteration (§4.5): `mu <- alpha * pol * (E_q + E_fd) +
/// (1 - alpha) * mu_old`, mixing factor `alpha = 0.8`.
#[allow(clippy::too_many_arguments)]
pub fn solve_iterative<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    config: &SolverConfig,
    xyz: &[f64],
    polfac: &[f64],
    pol: &[f64],
    efq: &[f64],
    mu: &mut [f64],
) -> Result<()> {
    const ALPHA: f64 = 0.8;
    let n = efq.len();

    let mut mu_old = mu.to_vec();
    let mut efd = alloc::vec![0.0f64; n];
    let mut max_eps_prev = f64::INFINITY;

    for iter in 0..config.maxit {
        efd.iter_mut().for_each(|v| *v = 0.0);
        dipole_field::compute(layout, exclusions, topology, xyz, polfac, &mu_old, &mut efd);

        let mut max_eps = 0.0f64;
        for i in 0..n {
            let updated = ALPHA * pol[i] * (efq[i] + efd[i]) + (1.0 - ALPHA) * mu_old[i];
            let delta = updated - mu_old[i];
            max_eps = max_eps.max(delta * delta);
            mu[i] = updated;
        }

        if max_eps < config.tolerance {
            tracing::debug!(iter = iter + 1, residual = max_eps, "fixed-point iteration converged");
            return Ok(());
        }
        if max_eps > max_eps_prev && iter > 10 {
            tracing::warn!(iter, residual = max_eps, "fixed-point iteration diverging");
            return Err(Error::NonConvergent {
                solver: DipoleSolver::Iterative,
                iter,
                last_residual: max_eps,
            });
        }

        max_eps_prev = max_eps;
        mu_old.copy_from_slice(mu);
    }

    tracing::warn!(iter = config.maxit, residual = max_eps_prev, "fixed-point iteration did not converge");
    Err(Error::NonConvergent {
        solver: DipoleSolver::Iterative,
        iter: config.maxit,
        last_residual: max_eps_prev,
    })
}

/// ASPC predictor-corrector (§4.5). Falls back to [`solve_cg`] (and feeds
/// its result into `history`) until the history ring holds `k + 2` prior
/// solutions; from then on predicts, corrects once, and blends.
#[allow(clippy::too_many_arguments)]
pub fn solve_aspc<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    config: &SolverConfig,
    xyz: &[f64],
    polfac: &[f64],
    pol: &[f64],
    pol_sqrt: &[f64],
    order: usize,
    history: &mut AspcHistory,
    efq: &[f64],
    mu: &mut [f64],
) -> Result<()> {
    if !history.is_full() {
        solve_cg(layout, exclusions, topology, config, xyz, polfac, pol_sqrt, efq, mu)?;
        history.push(mu);
        return Ok(());
    }

    let coeffs = aspc::coefficients(order);
    let n = efq.len();

    let mut mu_pred: Vec<f64> = alloc::vec![0.0; n];
    for (b_i, hist_mu) in coeffs.b.iter().zip(history.newest_first()) {
        for (pred, h) in mu_pred.iter_mut().zip(hist_mu.iter()) {
            *pred += b_i * h;
        }
    }

    let mut efd = alloc::vec![0.0f64; n];
    dipole_field::compute(layout, exclusions, topology, xyz, polfac, &mu_pred, &mut efd);

    for i in 0..n {
        let mu_corr = pol[i] * (efq[i] + efd[i]);
        mu[i] = coeffs.omega * mu_corr + (1.0 - coeffs.omega) * mu_pred[i];
    }

    history.push(mu);
    Ok(())
}
