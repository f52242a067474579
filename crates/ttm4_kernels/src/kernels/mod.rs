//! The vectorizable pair kernels: permanent field, dipole field, and
//! gradient, each in a damped (Thole-screened) and undamped ("A = 0")
//! variant.
//!
//! Every kernel treats one site `i` of a single monomer (`mon1_index`) of
//! block 1 against a contiguous run of monomer instances (`m2_range`) of
//! site `j` of block 2, both sites already sliced down to the block-local
//! core-layout arrays (length `3 * nmon` for vector quantities, `nmon` for
//! scalar ones, per site). The `m1`-side contribution is returned by value
//! so the caller can reduce it outside this hot loop; the `m2`-side is
//! updated in place across the whole range.

pub mod dipole;
pub mod gradient;
pub mod permanent;

#[inline]
fn site_vec_offset(site: usize, nmon: usize) -> usize {
    site * 3 * nmon
}

#[inline]
fn site_scalar_offset(site: usize, nmon: usize) -> usize {
    site * nmon
}
