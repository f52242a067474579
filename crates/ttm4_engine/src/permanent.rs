//! The permanent-field driver: intramonomer exclusion-aware pass, then an
//! intermonomer pass parallelized over the outer monomer-1 axis with
//! private per-worker accumulators.

use ttm4_core::{Exclusions, SystemLayout, Topology, A_CC, POLFAC_FLOOR};
use ttm4_kernels::{kernels::permanent, pool};

struct Workspace {
    phi1: alloc::vec::Vec<f64>,
    efq1: alloc::vec::Vec<f64>,
    phi2: alloc::vec::Vec<f64>,
    efq2: alloc::vec::Vec<f64>,
}

impl Workspace {
    fn new(n1: usize, n2: usize) -> Self {
        Self {
            phi1: alloc::vec![0.0; n1],
            efq1: alloc::vec![0.0; 3 * n1],
            phi2: alloc::vec![0.0; n2],
            efq2: alloc::vec![0.0; 3 * n2],
        }
    }
}

fn a_branch(polfac_i: f64, polfac_j: f64) -> Option<(f64, f64, f64, f64)> {
    let prod = polfac_i * polfac_j;
    if prod <= POLFAC_FLOOR {
        return None;
    }
    let a = prod.powf(1.0 / 6.0);
    let a_sqsq = a.powi(4);
    let a_inv = 1.0 / a;
    let a_quarter = A_CC.powf(0.25);
    Some((a_sqsq, a_inv, a_quarter, a))
}

/// Runs both phases of the permanent-field driver, accumulating into
/// `phi`/`efq` (core layout, zeroed by the caller beforehand).
#[allow(clippy::too_many_arguments)]
pub fn compute<T: Topology + Sync>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    g34: f64,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    phi: &mut [f64],
    efq: &mut [f64],
) {
    intramonomer(layout, exclusions, topology, xyz, chg, polfac, g34, phi, efq);
    intermonomer(layout, topology, g34, xyz, chg, polfac, phi, efq);
}

#[allow(clippy::too_many_arguments)]
fn intramonomer<T: Topology>(
    layout: &SystemLayout,
    exclusions: &[Exclusions],
    topology: &T,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    g34: f64,
    phi: &mut [f64],
    efq: &mut [f64],
) {
    for block in layout.blocks() {
        let exc = &exclusions[block.type_index];
        let nmon = block.nmon;
        let vec_off = 3 * block.core_site_offset;
        let scalar_off = block.core_site_offset;
        let vec_len = 3 * block.nsites * nmon;
        let scalar_len = block.nsites * nmon;

        let xyz_blk = &xyz[vec_off..vec_off + vec_len];
        let chg_blk = &chg[scalar_off..scalar_off + scalar_len];
        let polfac_blk = &polfac[scalar_off..scalar_off + scalar_len];

        let (mut phi_blk, mut efq_blk) = (alloc::vec![0.0f64; scalar_len], alloc::vec![0.0f64; vec_len]);

        for site_i in 0..block.nsites {
            for site_j in (site_i + 1)..block.nsites {
                if exc.is_excluded(site_i, site_j) {
                    continue;
                }

                let polfac_i = polfac_blk[site_i * nmon];
                let polfac_j = polfac_blk[site_j * nmon];

                for m in 0..nmon {
                    let (phi1, efq1) = if let Some((a_sqsq, a_inv, a_quarter, _)) =
                        a_branch(polfac_i, polfac_j)
                    {
                        permanent::damped(
                            xyz_blk,
                            xyz_blk,
                            chg_blk,
                            chg_blk,
                            m,
                            m..(m + 1),
                            nmon,
                            nmon,
                            site_i,
                            site_j,
                            a_inv,
                            a_sqsq,
                            A_CC,
                            a_quarter,
                            g34,
                            &|u| topology.gammq_075(u),
                            &mut phi_blk,
                            &mut efq_blk,
                        )
                    } else {
                        permanent::undamped(
                            xyz_blk, xyz_blk, chg_blk, chg_blk, m, m..(m + 1), nmon, nmon,
                            site_i, site_j, &mut phi_blk, &mut efq_blk,
                        )
                    };

                    phi_blk[site_i * nmon + m] += phi1;
                    let off_i = site_i * 3 * nmon;
                    efq_blk[off_i + m] += efq1[0];
                    efq_blk[off_i + nmon + m] += efq1[1];
                    efq_blk[off_i + 2 * nmon + m] += efq1[2];
                }
            }
        }

        for (o, v) in phi[scalar_off..scalar_off + scalar_len].iter_mut().zip(phi_blk) {
            *o += v;
        }
        for (o, v) in efq[vec_off..vec_off + vec_len].iter_mut().zip(efq_blk) {
            *o += v;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn intermonomer<T: Topology + Sync>(
    layout: &SystemLayout,
    topology: &T,
    g34: f64,
    xyz: &[f64],
    chg: &[f64],
    polfac: &[f64],
    phi: &mut [f64],
    efq: &mut [f64],
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
            let polfac1 = &polfac[soff1..soff1 + slen1];
            let xyz2 = &xyz[voff2..voff2 + len2];
            let chg2 = &chg[soff2..soff2 + slen2];
            let polfac2 = &polfac[soff2..soff2 + slen2];

            let ranges = pool::chunk_ranges(n1);
            let mut workers: alloc::vec::Vec<Workspace> =
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

                            let (phi1, efq1) = if let Some((a_sqsq, a_inv, a_quarter, _)) =
                                a_branch(polfac_i, polfac_j)
                            {
                                permanent::damped(
                                    xyz1, xyz2, chg1, chg2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, a_inv, a_sqsq, A_CC, a_quarter, g34,
                                    &|u| topology.gammq_075(u),
                                    &mut ws.phi2, &mut ws.efq2,
                                )
                            } else {
                                permanent::undamped(
                                    xyz1, xyz2, chg1, chg2, m1, m2_start..n2, n1, n2, site_i,
                                    site_j, &mut ws.phi2, &mut ws.efq2,
                                )
                            };

                            ws.phi1[site_i * n1 + m1] += phi1;
                            let off_i = site_i * 3 * n1;
                            ws.efq1[off_i + m1] += efq1[0];
                            ws.efq1[off_i + n1 + m1] += efq1[1];
                            ws.efq1[off_i + 2 * n1 + m1] += efq1[2];
                        }
                    }
                }
            });

            pool::reduce_into(&workers, |w| &w.phi1, &mut phi[soff1..soff1 + slen1]);
            pool::reduce_into(&workers, |w| &w.efq1, &mut efq[voff1..voff1 + len1]);
            pool::reduce_into(&workers, |w| &w.phi2, &mut phi[soff2..soff2 + slen2]);
            pool::reduce_into(&workers, |w| &w.efq2, &mut efq[voff2..voff2 + len2]);
        }
    }
}
