use core::ops::Range;

use super::{site_scalar_offset, site_vec_offset};
use crate::screening;

/// The Thole-damped permanent-field kernel: accumulates `phi`/`E_q` on both
/// sides of the pair. Returns `(phi1, [efq1x, efq1y, efq1z])` for the
/// `mon1_index` side; the `mon2` side is written into `phi2`/`efq2` over
/// `m2_range`.
#[allow(clippy::too_many_arguments)]
pub fn damped(
    xyz1: &[f64],
    xyz2: &[f64],
    chg1: &[f64],
    chg2: &[f64],
    mon1_index: usize,
    m2_range: Range<usize>,
    nmon1: usize,
    nmon2: usize,
    site_i: usize,
    site_j: usize,
    a_inv: f64,
    a_sqsq: f64,
    a_cc: f64,
    a_cc_quarter: f64,
    g34: f64,
    gammq: &dyn Fn(f64) -> f64,
    phi2: &mut [f64],
    efq2: &mut [f64],
) -> (f64, [f64; 3]) {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);
    let sc1 = site_scalar_offset(site_i, nmon1);
    let sc2 = site_scalar_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let c1 = chg1[sc1 + mon1_index];

    let (mut phi1, mut efqx, mut efqy, mut efqz) = (0.0, 0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;
        let c2 = chg2[sc2 + m];

        let (s0, s1r3) =
            screening::permanent_damped(rsq, a_cc, a_sqsq, a_inv, a_cc_quarter, g34, gammq);

        phi1 += s0 * c2;
        phi2[sc2 + m] += s0 * c1;

        let s1r3c1 = s1r3 * c1;
        let s1r3c2 = s1r3 * c2;

        efqx += s1r3c2 * rijx;
        efqy += s1r3c2 * rijy;
        efqz += s1r3c2 * rijz;

        efq2[off2 + m] -= s1r3c1 * rijx;
        efq2[off2 + nmon2 + m] -= s1r3c1 * rijy;
        efq2[off2 + 2 * nmon2 + m] -= s1r3c1 * rijz;
    }

    (phi1, [efqx, efqy, efqz])
}

/// The undamped ("A = 0") permanent-field kernel: bare Coulomb.
#[allow(clippy::too_many_arguments)]
pub fn undamped(
    xyz1: &[f64],
    xyz2: &[f64],
    chg1: &[f64],
    chg2: &[f64],
    mon1_index: usize,
    m2_range: Range<usize>,
    nmon1: usize,
    nmon2: usize,
    site_i: usize,
    site_j: usize,
    phi2: &mut [f64],
    efq2: &mut [f64],
) -> (f64, [f64; 3]) {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);
    let sc1 = site_scalar_offset(site_i, nmon1);
    let sc2 = site_scalar_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let c1 = chg1[sc1 + mon1_index];

    let (mut phi1, mut efqx, mut efqy, mut efqz) = (0.0, 0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;
        let c2 = chg2[sc2 + m];

        let (s0, s1r3) = screening::permanent_undamped(rsq);

        phi1 += s0 * c2;
        phi2[sc2 + m] += s0 * c1;

        let s1r3c1 = s1r3 * c1;
        let s1r3c2 = s1r3 * c2;

        efqx += s1r3c2 * rijx;
        efqy += s1r3c2 * rijy;
        efqz += s1r3c2 * rijz;

        efq2[off2 + m] -= s1r3c1 * rijx;
        efq2[off2 + nmon2 + m] -= s1r3c1 * rijy;
        efq2[off2 + 2 * nmon2 + m] -= s1r3c1 * rijz;
    }

    (phi1, [efqx, efqy, efqz])
}
