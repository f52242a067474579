//! Evaluation of the dipole field `Efd` from an arbitrary dipole vector.
//!
//! This is the same all-pairs traversal as [`crate::permanent`], with the
//! dipole-field kernels in place of the permanent-field ones and no
//! exclusion-driven skipping: per §4.6, intramonomer pairs still interact,
//! using the topology-specific `a_DD` from [`Topology::get_add`] (which may
//! itself return a small or zero coefficient to encode an exclusion), while
//! intermonomer pairs use the fixed intermolecular `A_DD`. [`apply_operator`]
//! reuses this to build the matrix-free CG operator.

use alloc::vec::Vec;

use ttm4_core::{Exclusions, SystemLayout, Topology, A_DD};
use ttm4_kernels::{kernels::dipole, pool};

use crate::common::thole_a_sqsq;

struct Workspace {
    efd1: Vec<f64>,
    efd2: Vec<f64>,
}

impl Workspace {
    fn new(n1: usize, n2: usize) -> Self {
        Self {
            efd1: alloc::vec![0.0; 3 * n1],
            efd2: alloc::vec![0.0; 3 * n2],
        }
    }
}

/// Recomputes `efd` (core layout, zeroed by the caller beforehand) from
/// `mu` (core layout) and the current geometry.
#[allow(clippy::too_many_arguments)]
pub fn compute<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    polfac: &[f64],
    mu: &[f64],
    efd: &mut [f64],
) {
    intramonomer(layout, exclusions, topology, xyz, polfac, mu, efd);
    intermonomer(layout, xyz, polfac, mu, efd);
}

/// `y := (I - D T D) x`, the symmetric matrix-free operator the CG solver
/// applies on the "scaled" dipole `x = D^{-1} mu`, `D = diag(sqrt(pol))`.
///
/// Builds the effective dipole `D x`, evaluates `Efd` from it exactly as
/// [`compute`] does, then folds `x - D * Efd` into `y`.
#[allow(clippy::too_many_arguments)]
pub fn apply_operator<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    polfac: &[f64],
    pol_sqrt: &[f64],
    x: &[f64],
    scratch_mu: &mut [f64],
    scratch_efd: &mut [f64],
    y: &mut [f64],
) {
    for i in 0..x.len() {
        scratch_mu[i] = pol_sqrt[i] * x[i];
    }
    scratch_efd.iter_mut().for_each(|v| *v = 0.0);
    compute(layout, exclusions, topology, xyz, polfac, scratch_mu, scratch_efd);

    for i in 0..x.len() {
        y[i] = x[i] - pol_sqrt[i] * scratch_efd[i];
    }
}

fn intramonomer<T: Topology>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    polfac: &[f64],
    mu: &[f64],
    efd: &mut [f64],
) {
    for block in layout.blocks() {
        let ty = &layout.types()[block.type_index];
        let exc = &exclusions[block.type_index];
        let nmon = block.nmon;
        let vec_off = 3 * block.core_site_offset;
        let scalar_off = block.core_site_offset;
        let vec_len = 3 * block.nsites * nmon;
        let scalar_len = block.nsites * nmon;

        let xyz_blk = &xyz[vec_off..vec_off + vec_len];
        let mu_blk = &mu[vec_off..vec_off + vec_len];
        let polfac_blk = &polfac[scalar_off..scalar_off + scalar_len];

        let mut efd_blk = alloc::vec![0.0f64; vec_len];

        for site_i in 0..block.nsites {
            for site_j in (site_i + 1)..block.nsites {
                let (is12, is13, is14) = exc.classify(site_i, site_j);
                let a_dd = topology.get_add(is12, is13, is14, &ty.mon_id);

                let polfac_i = polfac_blk[site_i * nmon];
                let polfac_j = polfac_blk[site_j * nmon];

                for m in 0..nmon {
                    let efd1 = if let Some(a_sqsq) = thole_a_sqsq(polfac_i, polfac_j) {
                        dipole::damped(
                            xyz_blk, xyz_blk, mu_blk, mu_blk, m, m..(m + 1), nmon, nmon, site_i,
                            site_j, a_dd, a_sqsq, &mut efd_blk,
                        )
                    } else {
                        dipole::undamped(
                            xyz_blk, xyz_blk, mu_blk, mu_blk, m, m..(m + 1), nmon, nmon, site_i,
                            site_j, &mut efd_blk,
                        )
                    };

                    let off_i = site_i * 3 * nmon;
                    efd_blk[off_i + m] += efd1[0];
                    efd_blk[off_i + nmon + m] += efd1[1];
                    efd_blk[off_i + 2 * nmon + m] += efd1[2];
                }
            }
        }

        for (o, v) in efd[vec_off..vec_off + vec_len].iter_mut().zip(efd_blk) {
            *o += v;
        }
    }
}

fn intermonomer(layout: &SystemLayout, xyz: &[f64], polfac: &[f64], mu: &[f64], efd: &mut [f64]) {
    let blocks = layout.blocks();
    for (t1, b1) in blocks.iter().enumerate() {
        for b2 in &blocks[t1..] {
            let same_type = core::ptr::eq(b1, b2);
            let (voff1, soff1, n1) = (3 * b1.core_site_offset, b1.core_site_offset, b1.nmon);
            let (voff2, soff2, n2) = (3 * b2.core_site_offset, b2.core_site_offset, b2.nmon);
            let len1 = 3 * b1.nsites * n1;
            let len2 = 3 * b2.nsites * n2;
            let slen1 = b1.nsites * n1;
            let slen2 = b2.nsites * n2;

            let xyz1 = &xyz[voff1..voff1 + len1];
            let mu1 = &mu[voff1..voff1 + len1];
            let polfac1 = &polfac[soff1..soff1 + slen1];
            let xyz2 = &xyz[voff2..voff2 + len2];
            let mu2 = &mu[voff2..voff2 + len2];
            let polfac2 = &polfac[soff2..soff2 + slen2];

            let ranges = pool::chunk_ranges(n1);
            let mut workers: Vec<Workspace> =
                ranges.iter().map(|_| Workspace::new(slen1, slen2)).collect();

            pool::par_for_each_worker(&mut workers, &ranges, |m1_range, ws| {
                for m1 in m1_range {
                    let m2_start = if same_type { m1 + 1 } else { 0 };
                    if same_type && m2_start >= n2 {
                        continue;
                    }

                    for site_i in 0..b1.nsites {
                        // Distinct monomers carry distinct sites even when
                        // same-typed; the m2_start restriction above already
                        // avoids double-counting monomer pairs, so every
                        // (site_i, site_j) combination is still needed here.
                        for site_j in 0..b2.nsites {
                            let polfac_i = polfac1[site_i * n1];
                            let polfac_j = polfac2[site_j * n2];

                            let efd1 = if let Some(a_sqsq) = thole_a_sqsq(polfac_i, polfac_j) {
                                dipole::damped(
                                    xyz1, xyz2, mu1, mu2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, A_DD, a_sqsq, &mut ws.efd2,
                                )
                            } else {
                                dipole::undamped(
                                    xyz1, xyz2, mu1, mu2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, &mut ws.efd2,
                                )
                            };

                            let off_i = site_i * 3 * n1;
                            ws.efd1[off_i + m1] += efd1[0];
                            ws.efd1[off_i + n1 + m1] += efd1[1];
                            ws.efd1[off_i + 2 * n1 + m1] += efd1[2];
                        }
                    }
                }
            });

            pool::reduce_into(&workers, |w| &w.efd1, &mut efd[voff1..voff1 + len1]);
            pool::reduce_into(&workers, |w| &w.efd2, &mut efd[voff2..voff2 + len2]);
        }
    }
}
