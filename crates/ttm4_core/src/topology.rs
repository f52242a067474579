//! The small capability set the engine borrows from the host: bond-topology
//! exclusion lookups, the intramonomer Thole-damping coefficient, and the two
//! pieces of gradient bookkeeping (virtual-site redistribution and the force
//! from position-dependent charges) that only the host's topology layer can
//! perform.

use alloc::vec::Vec;

/// An unordered set of intramonomer site-index pairs sharing a bond relation
/// (1-2, 1-3, or 1-4).
///
/// Pairs are stored normalized as `(min(i, j), max(i, j))`; [`ExcludedSet::contains`]
/// does the same normalization before comparing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExcludedSet {
    pairs: Vec<(usize, usize)>,
}

impl ExcludedSet {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut set = Self::new();
        for (i, j) in pairs {
            set.insert(i, j);
        }
        set
    }

    pub fn insert(&mut self, i: usize, j: usize) {
        let pair = if i < j { (i, j) } else { (j, i) };
        if !self.pairs.contains(&pair) {
            self.pairs.push(pair);
        }
    }

    /// `IsExcluded`: whether sites `i` and `j` are related by this bond class.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let pair = if i < j { (i, j) } else { (j, i) };
        self.pairs.contains(&pair)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The three bond-distance exclusion classes for one monomer type, as
/// returned by [`Topology::excluded`].
#[derive(Clone, Debug, Default)]
pub struct Exclusions {
    pub one_two: ExcludedSet,
    pub one_three: ExcludedSet,
    pub one_four: ExcludedSet,
}

impl Exclusions {
    /// Whether `(i, j)` is excluded from permanent-field and charge-dipole
    /// contributions under any of the three classes.
    pub fn is_excluded(&self, i: usize, j: usize) -> bool {
        self.one_two.contains(i, j) || self.one_three.contains(i, j) || self.one_four.contains(i, j)
    }

    /// Which of the three classes `(i, j)` belongs to, if any. Used to pick
    /// the right intramonomer damping coefficient via [`Topology::get_add`].
    pub fn classify(&self, i: usize, j: usize) -> (bool, bool, bool) {
        (
            self.one_two.contains(i, j),
            self.one_three.contains(i, j),
            self.one_four.contains(i, j),
        )
    }
}

/// Host-provided services the engine cannot implement itself: bond topology,
/// virtual-site handling, and the special function used by the permanent
/// field screening kernel.
///
/// A single implementation is expected to bundle all of `GetExcluded`,
/// `GetAdd`, `RedistributeVirtGrads2Real`, `ChargeDerivativeForce`, and
/// `gammq(0.75, x)` from the host's potential layer; the engine never
/// inspects monomer internals beyond this interface.
pub trait Topology {
    /// `GetExcluded`: the 1-2, 1-3, and 1-4 intramonomer site pairs for the
    /// monomer type identified by `mon_id`.
    fn excluded(&self, mon_id: &str) -> Exclusions;

    /// `GetAdd`: the intramonomer Thole-damping coefficient a_DD for a pair
    /// already classified by [`Exclusions::classify`].
    fn get_add(&self, is_12: bool, is_13: bool, is_14: bool, mon_id: &str) -> f64;

    /// `RedistributeVirtGrads2Real`: folds the gradient accumulated on
    /// virtual sites back onto the real atoms of every monomer of this type,
    /// in place, over the `nmon` monomers starting at `first_crd`.
    fn redistribute_virt_grads_to_real(
        &self,
        mon_id: &str,
        nmon: usize,
        first_crd: usize,
        grad: &mut [f64],
    );

    /// `ChargeDerivativeForce`: adds the force contribution from
    /// position-dependent charges (`d q / d r` encoded in `sys_chg_grad`),
    /// using the already-computed potential `sys_phi` at each site.
    fn charge_derivative_force(
        &self,
        mon_id: &str,
        nmon: usize,
        first_crd: usize,
        first_site: usize,
        sys_phi: &[f64],
        grad: &mut [f64],
        sys_chg_grad: &[f64],
    );

    /// `gammq(0.75, u)`, the regularized upper incomplete gamma function
    /// used by the damped permanent-field screening function s0.
    fn gammq_075(&self, u: f64) -> f64;

    /// Γ(0.75), a fixed constant the host is free to compute however it
    /// likes (including via `lgamma`); cached here so the kernel does not
    /// recompute it per pair.
    fn g34(&self) -> f64;
}
