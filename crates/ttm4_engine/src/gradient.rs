//! The gradient driver (§4.8): charge x permanent field, the intramonomer
//! dipole-dipole and charge-dipole pass (charge-dipole suppressed for
//! excluded pairs, dipole-dipole always present with the topology's a_DD),
//! and the intermonomer charge-dipole + dipole-dipole pass.
//!
//! The charge-dipole kernels also fold a potential correction into the
//! shared `phi` array alongside the permanent-field contribution already
//! there, since `Topology::charge_derivative_force`'s `sys_phi` argument
//! needs the total electrostatic potential, not the permanent part alone.

use alloc::vec::Vec;

use ttm4_core::{Exclusions, SystemLayout, Topology, A_CD, A_DD};
use ttm4_kernels::{
    kernels::gradient::{self, ChargeDipole},
    pool,
};

use crate::common::thole_a_sqsq;

struct Workspace {
    grad1: Vec<f64>,
    phi1: Vec<f64>,
    grad2: Vec<f64>,
    phi2: Vec<f64>,
}

impl Workspace {
    fn new(n1: usize, n2: usize) -> Self {
        Self {
            grad1: alloc::vec![0.0; 3 * n1],
            phi1: alloc::vec![0.0; n1],
            grad2: alloc::vec![0.0; 3 * n2],
            phi2: alloc::vec![0.0; n2],
        }
    }
}

/// Accumulates all three gradient contributions into `phi`/`grad` (core
/// layout, already holding the permanent-field `phi` from
/// [`crate::permanent`]).
#[allow(clippy::too_many_arguments)]
pub fn compute<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    mu: &[f64],
    efq: &[f64],
    phi: &mut [f64],
    grad: &mut [f64],
) {
    charge_times_field(layout, chg, efq, grad);
    intramonomer(layout, exclusions, topology, xyz, chg, polfac, mu, phi, grad);
    intermonomer(layout, xyz, chg, polfac, mu, phi, grad);
}

fn charge_times_field(layout: &SystemLayout, chg: &[f64], efq: &[f64], grad: &mut [f64]) {
    for block in layout.blocks() {
        let nmon = block.nmon;
        let scalar_off = block.core_site_offset;
        let vec_off = 3 * block.core_site_offset;

        for site in 0..block.nsites {
            let sc = scalar_off + site * nmon;
            let vc = vec_off + site * 3 * nmon;
            for m in 0..nmon {
                let q = chg[sc + m];
                grad[vc + m] -= q * efq[vc + m];
                grad[vc + nmon + m] -= q * efq[vc + nmon + m];
                grad[vc + 2 * nmon + m] -= q * efq[vc + 2 * nmon + m];
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn intramonomer<T: Topology>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    mu: &[f64],
    phi: &mut [f64],
    grad: &mut [f64],
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
        let chg_blk = &chg[scalar_off..scalar_off + scalar_len];
        let mu_blk = &mu[vec_off..vec_off + vec_len];
        let polfac_blk = &polfac[scalar_off..scalar_off + scalar_len];

        let mut grad_blk = alloc::vec![0.0f64; vec_len];
        let mut phi_blk = alloc::vec![0.0f64; scalar_len];

        for site_i in 0..block.nsites {
            for site_j in (site_i + 1)..block.nsites {
                let (is12, is13, is14) = exc.classify(site_i, site_j);
                let excluded = is12 || is13 || is14;
                let a_dd = topology.get_add(is12, is13, is14, &ty.mon_id);

                let polfac_i = polfac_blk[site_i * nmon];
                let polfac_j = polfac_blk[site_j * nmon];

                for m in 0..nmon {
                    let charge_dipole = if excluded {
                        None
                    } else {
                        Some(ChargeDipole {
                            chg1: chg_blk,
                            chg2: chg_blk,
                            phi2: &mut phi_blk,
                        })
                    };

                    let (g1, phi1) = if let Some(a_sqsq) = thole_a_sqsq(polfac_i, polfac_j) {
                        gradient::damped(
                            xyz_blk, xyz_blk, mu_blk, mu_blk, m, m..(m + 1), nmon, nmon, site_i,
                            site_j, a_dd, A_CD, a_sqsq, charge_dipole, &mut grad_blk,
                        )
                    } else {
                        gradient::undamped(
                            xyz_blk, xyz_blk, mu_blk, mu_blk, m, m..(m + 1), nmon, nmon, site_i,
                            site_j, charge_dipole, &mut grad_blk,
                        )
                    };

                    let off_i = site_i * 3 * nmon;
                    grad_blk[off_i + m] += g1[0];
                    grad_blk[off_i + nmon + m] += g1[1];
                    grad_blk[off_i + 2 * nmon + m] += g1[2];
                    phi_blk[site_i * nmon + m] += phi1;
                }
            }
        }

        for (o, v) in grad[vec_off..vec_off + vec_len].iter_mut().zip(grad_blk) {
            *o += v;
        }
        for (o, v) in phi[scalar_off..scalar_off + scalar_len].iter_mut().zip(phi_blk) {
            *o += v;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn intermonomer(
    layout: &SystemLayout,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    mu: &[f64],
    phi: &mut [f64],
    grad: &mut [f64],
) {
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
            let chg1 = &chg[soff1..soff1 + slen1];
            let mu1 = &mu[voff1..voff1 + len1];
            let polfac1 = &polfac[soff1..soff1 + slen1];
            let xyz2 = &xyz[voff2..voff2 + len2];
            let chg2 = &chg[soff2..soff2 + slen2];
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

                            let charge_dipole = Some(ChargeDipole {
                                chg1,
                                chg2,
                                phi2: &mut ws.phi2,
                            });

                            let (g1, phi1) = if let Some(a_sqsq) = thole_a_sqsq(polfac_i, polfac_j)
                            {
                                gradient::damped(
                                    xyz1, xyz2, mu1, mu2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, A_DD, A_CD, a_sqsq, charge_dipole, &mut ws.grad2,
                                )
                            } else {
                                gradient::undamped(
                                    xyz1, xyz2, mu1, mu2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, charge_dipole, &mut ws.grad2,
                                )
                            };

                            let off_i = site_i * 3 * n1;
                            ws.grad1[off_i + m1] += g1[0];
                            ws.grad1[off_i + n1 + m1] += g1[1];
                            ws.grad1[off_i + 2 * n1 + m1] += g1[2];
                            ws.phi1[site_i * n1 + m1] += phi1;
                        }
                    }
                }
            });

            pool::reduce_into(&workers, |w| &w.grad1, &mut grad[voff1..voff1 + len1]);
            pool::reduce_into(&workers, |w| &w.phi1, &mut phi[soff1..soff1 + slen1]);
            pool::reduce_into(&workers, |w| &w.grad2, &mut grad[voff2..voff2 + len2]);
            pool::reduce_into(&workers, |w| &w.phi2, &mut phi[soff2..soff2 + slen2]);
        }
    }
}
