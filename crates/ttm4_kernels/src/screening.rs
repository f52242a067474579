//! Thole screening functions for the three pair-kernel families.
//!
//! Each function returns the $s_n/r^{2n+1}$ combinations the kernels need
//! directly, rather than $s_n$ itself, since that is what every downstream
//! multiply uses: `s1r3` means $s_1/r^3$, `s2r5_3` means $s_2/r^5$ already
//! multiplied by 3, and `s3r7_15` means $s_3/r^7$ already multiplied by 15,
//! matching the original screening-function convention.

/// $s_0$ and $s_1/r^3$ for the damped permanent-field kernel, given
/// $r^2$, the intermolecular or intramolecular damping coefficient `a`,
/// $A^4$ (`a_sqsq`), $A^{-1}$ (`a_inv`), $a^{1/4}$ (`a_quarter`), and
/// $\Gamma(0.75)$ (`g34`). `gammq` is `Q(0.75, u)`, supplied by the host.
#[inline]
pub fn permanent_damped(
    rsq: f64,
    a: f64,
    a_sqsq: f64,
    a_inv: f64,
    a_quarter: f64,
    g34: f64,
    gammq: impl Fn(f64) -> f64,
) -> (f64, f64) {
    let ri = 1.0 / rsq.sqrt();
    let u = a * rsq * rsq / a_sqsq;
    let exp1 = (-u).exp();

    let s1r = ri - exp1 * ri;
    let s0 = s1r + a_quarter * a_inv * g34 * gammq(u);
    let s1r3 = s1r * ri * ri;

    (s0, s1r3)
}

/// $s_0 = 1/r$ and $s_1/r^3 = 1/r^3$, the undamped ("A = 0") permanent-field
/// kernel.
#[inline]
pub fn permanent_undamped(rsq: f64) -> (f64, f64) {
    let ri = 1.0 / rsq.sqrt();
    (ri, ri * ri * ri)
}

/// $s_1/r^3$ and $s_2/r^5$ (already times 3) for the damped dipole-field and
/// charge-dipole gradient kernels.
#[inline]
pub fn dipole_damped(rsq: f64, a: f64, a_sqsq: f64) -> (f64, f64) {
    let ri = 1.0 / rsq.sqrt();
    let risq = ri * ri;
    let r_a4 = rsq * rsq / a_sqsq;
    let u = a * r_a4;
    let exp1 = (-u).exp();

    let s1r3 = (ri - exp1 * ri) * risq;
    let s2r5_3 = (3.0 * s1r3 - 4.0 * a * r_a4 * exp1 * risq * ri) * risq;

    (s1r3, s2r5_3)
}

/// $s_1/r^3 = 1/r^3$ and $s_2/r^5 = 3/r^5$, undamped.
#[inline]
pub fn dipole_undamped(rsq: f64) -> (f64, f64) {
    let ri = 1.0 / rsq.sqrt();
    let risq = ri * ri;
    let s1r3 = ri * risq;
    (s1r3, 3.0 * s1r3 * risq)
}

/// $s_1/r^3$, $s_2/r^5$ and $s_3/r^7$ (times 15) for the damped dipole-dipole
/// third-rank gradient tensor.
#[inline]
pub fn grad_damped(rsq: f64, a: f64, a_sqsq: f64) -> (f64, f64, f64) {
    let (s1r3, s2r5_3) = dipole_damped(rsq, a, a_sqsq);
    let ri = 1.0 / rsq.sqrt();
    let risq = ri * ri;
    let r_a4 = rsq * rsq / a_sqsq;
    let a4_rA4 = 4.0 * a * r_a4;
    let exp1 = (-a * r_a4).exp();

    let s3r7_15 = (s2r5_3 * 5.0 - a4_rA4 * exp1 * (a4_rA4 - 1.0) * risq * risq * ri) * risq;
    (s1r3, s2r5_3, s3r7_15)
}

/// $s_1/r^3 = 1/r^3$, $s_2/r^5 = 3/r^5$, $s_3/r^7 = 15/r^7$, undamped.
#[inline]
pub fn grad_undamped(rsq: f64) -> (f64, f64, f64) {
    let ri = 1.0 / rsq.sqrt();
    let risq = ri * ri;
    let s1r3 = ri * risq;
    let s2r5_3 = 3.0 * s1r3 * risq;
    let s3r7_15 = 5.0 * s2r5_3 * risq;
    (s1r3, s2r5_3, s3r7_15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damped_permanent_relaxes_to_undamped_at_large_separation() {
        let (s0d, s1d) = permanent_damped(100.0, 0.4, 1.0, 1.0, 0.4f64.powf(0.25), 1.225, |_| 0.0);
        let (s0u, s1u) = permanent_undamped(100.0);
        assert!((s0d - s0u).abs() < 1.0e-6);
        assert!((s1d - s1u).abs() < 1.0e-6);
    }

    #[test]
    fn damped_dipole_relaxes_to_undamped_at_large_separation() {
        let (s1d, s2d) = dipole_damped(400.0, 0.055, 1.0);
        let (s1u, s2u) = dipole_undamped(400.0);
        assert!((s1d - s1u).abs() < 1.0e-8);
        assert!((s2d - s2u).abs() < 1.0e-6);
    }
}
