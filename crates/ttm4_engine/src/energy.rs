//! The energy contraction (§4.7): `E_perm = 1/2 sum phi_i q_i`, `E_ind =
//! -1/2 sum mu_i E_q,i` (component-wise over the 3N-wide vectors).

/// Returns `(e_perm, e_ind)`. `efq` is the permanent field alone, per the
/// energy identity in §3 — callers must not pass `efd` here.
pub fn compute(phi: &[f64], chg: &[f64], mu: &[f64], efq: &[f64]) -> (f64, f64) {
    let e_perm = 0.5 * phi.iter().zip(chg).map(|(p, q)| p * q).sum::<f64>();
    let e_ind = -0.5 * mu.iter().zip(efq).map(|(m, e)| m * e).sum::<f64>();
    (e_perm, e_ind)
}
