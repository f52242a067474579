use core::ops::Range;

use super::site_vec_offset;
use crate::screening;

/// The Thole-damped dipole-field kernel (`Efd`), symmetric in both sides.
#[allow(clippy::too_many_arguments)]
pub fn damped(
    xyz1: &[f64],
    xyz2: &[f64],
    mu1: &[f64],
    mu2: &[f64],
    mon1_index: usize,
    m2_range: Range<usize>,
    nmon1: usize,
    nmon2: usize,
    site_i: usize,
    site_j: usize,
    a_dd: f64,
    a_sqsq: f64,
    efd2: &mut [f64],
) -> [f64; 3] {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let mu1x = mu1[off1 + mon1_index];
    let mu1y = mu1[off1 + nmon1 + mon1_index];
    let mu1z = mu1[off1 + 2 * nmon1 + mon1_index];

    let (mut efdx, mut efdy, mut efdz) = (0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;

        let (s1r3, s2r5_3) = screening::dipole_damped(rsq, a_dd, a_sqsq);
        let ts2x = s2r5_3 * rijx;
        let ts2y = s2r5_3 * rijy;
        let ts2z = s2r5_3 * rijz;

        let mu2x = mu2[off2 + m];
        let mu2y = mu2[off2 + nmon2 + m];
        let mu2z = mu2[off2 + 2 * nmon2 + m];

        efdx += (ts2x * rijx - s1r3) * mu2x + ts2x * rijy * mu2y + ts2x * rijz * mu2z;
        efdy += ts2y * rijx * mu2x + (ts2y * rijy - s1r3) * mu2y + ts2y * rijz * mu2z;
        efdz += ts2z * rijx * mu2x + ts2z * rijy * mu2y + (ts2z * rijz - s1r3) * mu2z;

        efd2[off2 + m] += (ts2x * rijx - s1r3) * mu1x + ts2x * rijy * mu1y + ts2x * rijz * mu1z;
        efd2[off2 + nmon2 + m] +=
            ts2y * rijx * mu1x + (ts2y * rijy - s1r3) * mu1y + ts2y * rijz * mu1z;
        efd2[off2 + 2 * nmon2 + m] +=
            ts2z * rijx * mu1x + ts2z * rijy * mu1y + (ts2z * rijz - s1r3) * mu1z;
    }

    [efdx, efdy, efdz]
}

/// The undamped dipole-field kernel.
#[allow(clippy::too_many_arguments)]
pub fn undamped(
    xyz1: &[f64],
    xyz2: &[f64],
    mu1: &[f64],
    mu2: &[f64],
    mon1_index: usize,
    m2_range: Range<usize>,
    nmon1: usize,
    nmon2: usize,
    site_i: usize,
    site_j: usize,
    efd2: &mut [f64],
) -> [f64; 3] {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let mu1x = mu1[off1 + mon1_index];
    let mu1y = mu1[off1 + nmon1 + mon1_index];
    let mu1z = mu1[off1 + 2 * nmon1 + mon1_index];

    let (mut efdx, mut efdy, mut efdz) = (0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;

        let (s1r3, s2r5_3) = screening::dipole_undamped(rsq);
        let ts2x = s2r5_3 * rijx;
        let ts2y = s2r5_3 * rijy;
        let ts2z = s2r5_3 * rijz;

        let mu2x = mu2[off2 + m];
        let mu2y = mu2[off2 + nmon2 + m];
        let mu2z = mu2[off2 + 2 * nmon2 + m];

        efdx += (ts2x * rijx - s1r3) * mu2x + ts2x * rijy * mu2y + ts2x * rijz * mu2z;
        efdy += ts2y * rijx * mu2x + (ts2y * rijy - s1r3) * mu2y + ts2y * rijz * mu2z;
        efdz += ts2z * rijx * mu2x + ts2z * rijy * mu2y + (ts2z * rijz - s1r3) * mu2z;

        efd2[off2 + m] += (ts2x * rijx - s1r3) * mu1x + ts2x * rijy * mu1y + ts2x * rijz * mu1z;
        efd2[off2 + nmon2 + m] +=
            ts2y * rijx * mu1x + (ts2y * rijy - s1r3) * mu1y + ts2y * rijz * mu1z;
        efd2[off2 + 2 * nmon2 + m] +=
            ts2z * rijx * mu1x + ts2z * rijy * mu1y + (ts2z * rijz - s1r3) * mu1z;
    }

    [efdx, efdy, efdz]
}
