//! The one per-pair decision every driver in this crate makes before
//! dispatching into a kernel: whether the pair is damped (`A > 0`) or falls
//! back to the bare-Coulomb variant.

use ttm4_core::POLFAC_FLOOR;

/// `A^4` for a pair of sites, or `None` when `polfac_i * polfac_j` falls at
/// or below [`POLFAC_FLOOR`] and the caller should dispatch the undamped
/// ("A = 0") kernel variant instead of the Thole-damped one.
///
/// The branch is taken once per `(site_i, site_j, block1, block2)` outside
/// the monomer-axis loop, per the design note against branching inside the
/// vectorizable kernel body.
#[inline]
pub(crate) fn thole_a_sqsq(polfac_i: f64, polfac_j: f64) -> Option<f64> {
    let prod = polfac_i * polfac_j;
    if prod <= POLFAC_FLOOR {
        return None;
    }
    let a = prod.powf(1.0 / 6.0);
    Some(a.powi(4))
}
