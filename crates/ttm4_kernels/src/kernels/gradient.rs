use core::ops::Range;

use super::{site_scalar_offset, site_vec_offset};
use crate::screening;

/// The Thole-damped gradient kernel. Always accumulates the dipole-dipole
/// force; the charge-dipole force and potential correction are only
/// accumulated when `charge_dipole` is `Some`, which the caller uses to
/// suppress charge-derived terms for excluded intramonomer pairs while
/// still letting the dipole-dipole tensor act (see the gradient driver's
/// exclusion handling).
///
/// Returns `(grad1, phi1_correction)` for the `mon1_index` side.
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
    a_cd: f64,
    a_sqsq: f64,
    charge_dipole: Option<ChargeDipole<'_>>,
    grad2: &mut [f64],
) -> ([f64; 3], f64) {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let mu1x = mu1[off1 + mon1_index];
    let mu1y = mu1[off1 + nmon1 + mon1_index];
    let mu1z = mu1[off1 + 2 * nmon1 + mon1_index];

    let mut cd = charge_dipole;

    let (mut gx1, mut gy1, mut gz1, mut phi1) = (0.0, 0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;

        let (_, s2r5_3d, s3r7_15d) = screening::grad_damped(rsq, a_dd, a_sqsq);

        let rijx2 = rijx * rijx;
        let rijy2 = rijy * rijy;
        let rijz2 = rijz * rijz;

        let t3_0 = s3r7_15d * rijx2 * rijx - s2r5_3d * 3.0 * rijx;
        let t3_1 = s3r7_15d * rijx2 * rijy - s2r5_3d * rijy;
        let t3_2 = s3r7_15d * rijx2 * rijz - s2r5_3d * rijz;
        let t3_3 = s3r7_15d * rijy2 * rijx - s2r5_3d * rijx;
        let t3_4 = s3r7_15d * rijx * rijy * rijz;
        let t3_5 = s3r7_15d * rijz2 * rijx - s2r5_3d * rijx;
        let t3_6 = s3r7_15d * rijy2 * rijy - s2r5_3d * 3.0 * rijy;
        let t3_7 = s3r7_15d * rijy2 * rijz - s2r5_3d * rijz;
        let t3_8 = s3r7_15d * rijz2 * rijy - s2r5_3d * rijy;
        let t3_9 = s3r7_15d * rijz2 * rijz - s2r5_3d * 3.0 * rijz;

        let mu2x = mu2[off2 + m];
        let mu2y = mu2[off2 + nmon2 + m];
        let mu2z = mu2[off2 + 2 * nmon2 + m];

        let (mu1xmu2x, mu1xmu2y, mu1xmu2z) = (mu1x * mu2x, mu1x * mu2y, mu1x * mu2z);
        let (mu1ymu2x, mu1ymu2y, mu1ymu2z) = (mu1y * mu2x, mu1y * mu2y, mu1y * mu2z);
        let (mu1zmu2x, mu1zmu2y, mu1zmu2z) = (mu1z * mu2x, mu1z * mu2y, mu1z * mu2z);

        let gx = mu1xmu2x * t3_0
            + mu1xmu2y * t3_1
            + mu1xmu2z * t3_2
            + mu1ymu2x * t3_1
            + mu1ymu2y * t3_3
            + mu1ymu2z * t3_4
            + mu1zmu2x * t3_2
            + mu1zmu2y * t3_4
            + mu1zmu2z * t3_5;

        let gy = mu1xmu2x * t3_1
            + mu1xmu2y * t3_3
            + mu1xmu2z * t3_4
            + mu1ymu2x * t3_3
            + mu1ymu2y * t3_6
            + mu1ymu2z * t3_7
            + mu1zmu2x * t3_4
            + mu1zmu2y * t3_7
            + mu1zmu2z * t3_8;

        let gz = mu1xmu2x * t3_2
            + mu1xmu2y * t3_4
            + mu1xmu2z * t3_5
            + mu1ymu2x * t3_4
            + mu1ymu2y * t3_7
            + mu1ymu2z * t3_8
            + mu1zmu2x * t3_5
            + mu1zmu2y * t3_8
            + mu1zmu2z * t3_9;

        let (mut vx, mut vy, mut vz) = (gx, gy, gz);

        if let Some(cd) = cd.as_mut() {
            let sc1 = site_scalar_offset(site_i, nmon1);
            let sc2 = site_scalar_offset(site_j, nmon2);
            let c1 = cd.chg1[sc1 + mon1_index];
            let c2 = cd.chg2[sc2 + m];

            let (s1r3c, s2r5_3c) = screening::dipole_damped(rsq, a_cd, a_sqsq);
            let ts2x = s2r5_3c * rijx;
            let ts2y = s2r5_3c * rijy;
            let ts2z = s2r5_3c * rijz;

            let t2_0 = ts2x * rijx - s1r3c;
            let t2_1 = ts2x * rijy;
            let t2_2 = ts2x * rijz;
            let t2_3 = ts2y * rijy - s1r3c;
            let t2_4 = ts2y * rijz;
            let t2_5 = ts2z * rijz - s1r3c;

            let ci_mjx = c1 * mu2x;
            let cj_mix = c2 * mu1x;
            let ci_mjy = c1 * mu2y;
            let cj_miy = c2 * mu1y;
            let ci_mjz = c1 * mu2z;
            let cj_miz = c2 * mu1z;

            let cdx = (cj_mix - ci_mjx) * t2_0 + (cj_miy - ci_mjy) * t2_1 + (cj_miz - ci_mjz) * t2_2;
            let cdy = (cj_mix - ci_mjx) * t2_1 + (cj_miy - ci_mjy) * t2_3 + (cj_miz - ci_mjz) * t2_4;
            let cdz = (cj_mix - ci_mjx) * t2_2 + (cj_miy - ci_mjy) * t2_4 + (cj_miz - ci_mjz) * t2_5;

            vx += cdx;
            vy += cdy;
            vz += cdz;

            grad2[off2 + m] -= cdx;
            grad2[off2 + nmon2 + m] -= cdy;
            grad2[off2 + 2 * nmon2 + m] -= cdz;

            let rxs1r3c = rijx * s1r3c;
            let rys1r3c = rijy * s1r3c;
            let rzs1r3c = rijz * s1r3c;

            phi1 += rxs1r3c * mu2x + rys1r3c * mu2y + rzs1r3c * mu2z;
            cd.phi2[sc2 + m] -= rxs1r3c * mu1x + rys1r3c * mu1y + rzs1r3c * mu1z;
        }

        gx1 += vx;
        gy1 += vy;
        gz1 += vz;

        grad2[off2 + m] -= gx;
        grad2[off2 + nmon2 + m] -= gy;
        grad2[off2 + 2 * nmon2 + m] -= gz;
    }

    ([gx1, gy1, gz1], phi1)
}

/// Borrowed charge arrays and the potential-correction output slice for the
/// charge-dipole part of the gradient kernel. Omitted (`None` at the call
/// site) to suppress charge-derived terms for an excluded pair.
pub struct ChargeDipole<'a> {
    pub chg1: &'a [f64],
    pub chg2: &'a [f64],
    pub phi2: &'a mut [f64],
}

/// The undamped gradient kernel.
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
    charge_dipole: Option<ChargeDipole<'_>>,
    grad2: &mut [f64],
) -> ([f64; 3], f64) {
    let off1 = site_vec_offset(site_i, nmon1);
    let off2 = site_vec_offset(site_j, nmon2);

    let x1 = xyz1[off1 + mon1_index];
    let y1 = xyz1[off1 + nmon1 + mon1_index];
    let z1 = xyz1[off1 + 2 * nmon1 + mon1_index];
    let mu1x = mu1[off1 + mon1_index];
    let mu1y = mu1[off1 + nmon1 + mon1_index];
    let mu1z = mu1[off1 + 2 * nmon1 + mon1_index];

    let mut cd = charge_dipole;

    let (mut gx1, mut gy1, mut gz1, mut phi1) = (0.0, 0.0, 0.0, 0.0);

    for m in m2_range {
        let rijx = x1 - xyz2[off2 + m];
        let rijy = y1 - xyz2[off2 + nmon2 + m];
        let rijz = z1 - xyz2[off2 + 2 * nmon2 + m];
        let rsq = rijx * rijx + rijy * rijy + rijz * rijz;

        let (_, s2r5_3, s3r7_15) = screening::grad_undamped(rsq);

        let rijx2 = rijx * rijx;
        let rijy2 = rijy * rijy;
        let rijz2 = rijz * rijz;

        let t3_0 = s3r7_15 * rijx2 * rijx - s2r5_3 * 3.0 * rijx;
        let t3_1 = s3r7_15 * rijx2 * rijy - s2r5_3 * rijy;
        let t3_2 = s3r7_15 * rijx2 * rijz - s2r5_3 * rijz;
        let t3_3 = s3r7_15 * rijy2 * rijx - s2r5_3 * rijx;
        let t3_4 = s3r7_15 * rijx * rijy * rijz;
        let t3_5 = s3r7_15 * rijz2 * rijx - s2r5_3 * rijx;
        let t3_6 = s3r7_15 * rijy2 * rijy - s2r5_3 * 3.0 * rijy;
        let t3_7 = s3r7_15 * rijy2 * rijz - s2r5_3 * rijz;
        let t3_8 = s3r7_15 * rijz2 * rijy - s2r5_3 * rijy;
        let t3_9 = s3r7_15 * rijz2 * rijz - s2r5_3 * 3.0 * rijz;

        let mu2x = mu2[off2 + m];
        let mu2y = mu2[off2 + nmon2 + m];
        let mu2z = mu2[off2 + 2 * nmon2 + m];

        let (mu1xmu2x, mu1xmu2y, mu1xmu2z) = (mu1x * mu2x, mu1x * mu2y, mu1x * mu2z);
        let (mu1ymu2x, mu1ymu2y, mu1ymu2z) = (mu1y * mu2x, mu1y * mu2y, mu1y * mu2z);
        let (mu1zmu2x, mu1zmu2y, mu1zmu2z) = (mu1z * mu2x, mu1z * mu2y, mu1z * mu2z);

        let gx = mu1xmu2x * t3_0
            + mu1xmu2y * t3_1
            + mu1xmu2z * t3_2
            + mu1ymu2x * t3_1
            + mu1ymu2y * t3_3
            + mu1ymu2z * t3_4
            + mu1zmu2x * t3_2
            + mu1zmu2y * t3_4
            + mu1zmu2z * t3_5;

        let gy = mu1xmu2x * t3_1
            + mu1xmu2y * t3_3
            + mu1xmu2z * t3_4
            + mu1ymu2x * t3_3
            + mu1ymu2y * t3_6
            + mu1ymu2z * t3_7
            + mu1zmu2x * t3_4
            + mu1zmu2y * t3_7
            + mu1zmu2z * t3_8;

        let gz = mu1xmu2x * t3_2
            + mu1xmu2y * t3_4
            + mu1xmu2z * t3_5
            + mu1ymu2x * t3_4
            + mu1ymu2y * t3_7
            + mu1ymu2z * t3_8
            + mu1zmu2x * t3_5
            + mu1zmu2y * t3_8
            + mu1zmu2z * t3_9;

        let (mut vx, mut vy, mut vz) = (gx, gy, gz);

        if let Some(cd) = cd.as_mut() {
            let sc1 = site_scalar_offset(site_i, nmon1);
            let sc2 = site_scalar_offset(site_j, nmon2);
            let c1 = cd.chg1[sc1 + mon1_index];
            let c2 = cd.chg2[sc2 + m];

            let (s1r3c, s2r5_3c) = screening::dipole_undamped(rsq);
            let ts2x = s2r5_3c * rijx;
            let ts2y = s2r5_3c * rijy;
            let ts2z = s2r5_3c * rijz;

            let t2_0 = ts2x * rijx - s1r3c;
            let t2_1 = ts2x * rijy;
            let t2_2 = ts2x * rijz;
            let t2_3 = ts2y * rijy - s1r3c;
            let t2_4 = ts2y * rijz;
            let t2_5 = ts2z * rijz - s1r3c;

            let ci_mjx = c1 * mu2x;
            let cj_mix = c2 * mu1x;
            let ci_mjy = c1 * mu2y;
            let cj_miy = c2 * mu1y;
            let ci_mjz = c1 * mu2z;
            let cj_miz = c2 * mu1z;

            let cdx = (cj_mix - ci_mjx) * t2_0 + (cj_miy - ci_mjy) * t2_1 + (cj_miz - ci_mjz) * t2_2;
            let cdy = (cj_mix - ci_mjx) * t2_1 + (cj_miy - ci_mjy) * t2_3 + (cj_miz - ci_mjz) * t2_4;
            let cdz = (cj_mix - ci_mjx) * t2_2 + (cj_miy - ci_mjy) * t2_4 + (cj_miz - ci_mjz) * t2_5;

            vx += cdx;
            vy += cdy;
            vz += cdz;

            grad2[off2 + m] -= cdx;
            grad2[off2 + nmon2 + m] -= cdy;
            grad2[off2 + 2 * nmon2 + m] -= cdz;

            let rxs1r3c = rijx * s1r3c;
            let rys1r3c = rijy * s1r3c;
            let rzs1r3c = rijz * s1r3c;

            phi1 += rxs1r3c * mu2x + rys1r3c * mu2y + rzs1r3c * mu2z;
            cd.phi2[sc2 + m] -= rxs1r3c * mu1x + rys1r3c * mu1y + rzs1r3c * mu1z;
        }

        gx1 += vx;
        gy1 += vy;
        gz1 += vz;

        grad2[off2 + m] -= gx;
        grad2[off2 + nmon2 + m] -= gy;
        grad2[off2 + 2 * nmon2 + m] -= gz;
    }

    ([gx1, gy1, gz1], phi1)
}
