//! The public `ttm4` engine: wires `ttm4_core`'s data model and
//! `ttm4_kernels`'s pair kernels into the five-stage pipeline described in
//! the crate-level design document (`ReorderData -> PermanentField ->
//! induce mu -> Energy -> (Gradients) -> Unreorder -> Topology callbacks`)
//! behind a single [`Engine`] type.
//!
//! `Engine` is generic over the host-provided [`Topology`] capability
//! rather than boxed as a trait object: every driver in this crate already
//! takes `T: Topology + Sync` directly, and monomorphizing avoids a vtable
//! indirection in the hot pair-kernel dispatch.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod aspc;
mod common;
mod dipole_field;
mod energy;
mod gradient;
mod permanent;
mod solvers;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use ttm4_core::{
    AspcOrder, DipoleMethod, Error, Exclusions, MonomerType, Result, SolverConfig, SystemLayout,
    Topology,
};
use ttm4_kernels::reorder;

pub use aspc::AspcHistory;

/// The polarizable-electrostatics engine. One instance is built per system
/// topology via [`Engine::initialize`] and then driven through a
/// trajectory with [`Engine::set_geometry`] + [`Engine::get_electrostatics`]
/// per step.
pub struct Engine<T: Topology + Sync> {
    layout: SystemLayout,
    exclusions: Vec<Exclusions>,
    topology: Arc<T>,
    g34: f64,

    config: SolverConfig,
    do_grads: bool,
    aspc_order: AspcOrder,
    aspc_history: AspcHistory,

    // Core-layout (SoA) working state, cf. §3.
    xyz_core: Vec<f64>,
    chg_core: Vec<f64>,
    polfac_core: Vec<f64>,
    pol_sqrt_core: Vec<f64>,
    phi: Vec<f64>,
    efq: Vec<f64>,
    efd: Vec<f64>,
    mu: Vec<f64>,
    grad_core: Vec<f64>,

    // User-layout views, refreshed unconditionally at the end of every
    // `get_electrostatics` call (see the Open Question decision in
    // DESIGN.md: this generalizes over the original's gradients-only
    // writeback).
    phi_user: Vec<f64>,
    efq_user: Vec<f64>,
    efd_user: Vec<f64>,
    mu_user: Vec<f64>,

    // Opaque pass-through for `Topology::charge_derivative_force`; this
    // crate never interprets its contents.
    chg_grad_user: Vec<f64>,
}

impl<T: Topology + Sync> Engine<T> {
    /// One-time setup: partitions the system into monomer-type blocks,
    /// precomputes the reorder index map, pulls the bond-topology
    /// exclusions and `g34` constant from `topology`, and runs the
    /// equivalent of [`Engine::set_geometry`] on the initial geometry.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        chg: &[f64],
        chg_grad: &[f64],
        polfac: &[f64],
        pol: &[f64],
        sys_xyz: &[f64],
        mon_type_count: Vec<MonomerType>,
        do_grads: bool,
        tolerance: f64,
        maxit: usize,
        dip_method: DipoleMethod,
        topology: Arc<T>,
    ) -> Result<Self> {
        let layout = SystemLayout::new(mon_type_count);
        let n = layout.total_sites();

        let exclusions: Vec<Exclusions> =
            layout.types().iter().map(|ty| topology.excluded(&ty.mon_id)).collect();
        let g34 = topology.g34();

        let mut engine = Self {
            layout,
            exclusions,
            topology,
            g34,
            config: SolverConfig::new(tolerance, maxit, dip_method),
            do_grads,
            aspc_order: AspcOrder::default(),
            aspc_history: AspcHistory::new(AspcOrder::default().history_len()),
            xyz_core: vec![0.0; 3 * n],
            chg_core: vec![0.0; n],
            polfac_core: vec![0.0; n],
            pol_sqrt_core: vec![0.0; 3 * n],
            phi: vec![0.0; n],
            efq: vec![0.0; 3 * n],
            efd: vec![0.0; 3 * n],
            mu: vec![0.0; 3 * n],
            grad_core: vec![0.0; 3 * n],
            phi_user: vec![0.0; n],
            efq_user: vec![0.0; 3 * n],
            efd_user: vec![0.0; 3 * n],
            mu_user: vec![0.0; 3 * n],
            chg_grad_user: Vec::new(),
        };

        engine.set_geometry(sys_xyz, chg, chg_grad, pol, polfac, dip_method, do_grads)?;
        Ok(engine)
    }

    /// Per-step update (`SetXyzChgPolPolfac`): reorders the new geometry and
    /// per-site scalars into core layout and zeros every derived field
    /// (`phi`, `E_q`, `E_fd`, `mu`, `grad`).
    #[allow(clippy::too_many_arguments)]
    pub fn set_geometry(
        &mut self,
        xyz: &[f64],
        chg: &[f64],
        chg_grad: &[f64],
        pol: &[f64],
        polfac: &[f64],
        dip_method: DipoleMethod,
        do_grads: bool,
    ) -> Result<()> {
        let n = self.layout.total_sites();
        if xyz.len() != 3 * n {
            return Err(Error::SiteArrayLengthMismatch { expected: 3 * n, got: xyz.len() });
        }
        if chg.len() != n {
            return Err(Error::SiteArrayLengthMismatch { expected: n, got: chg.len() });
        }
        if pol.len() != n {
            return Err(Error::SiteArrayLengthMismatch { expected: n, got: pol.len() });
        }
        if polfac.len() != n {
            return Err(Error::SiteArrayLengthMismatch { expected: n, got: polfac.len() });
        }

        self.config.method = dip_method;
        self.do_grads = do_grads;
        self.chg_grad_user = chg_grad.to_vec();

        let map = self.layout.map();
        reorder::reorder_vector(map, xyz, &mut self.xyz_core);
        reorder::reorder_scalar(map, chg, &mut self.chg_core);
        reorder::reorder_scalar(map, polfac, &mut self.polfac_core);

        // pol_sqrt_core duplicates sqrt(pol) three times per site (§4.1); build
        // the replicated user-layout vector and let the existing vector reorder
        // place it, rather than re-deriving the per-axis core strides here.
        let mut pol_sqrt_user = vec![0.0; 3 * n];
        for site in 0..n {
            let s = pol[site].sqrt();
            pol_sqrt_user[3 * site] = s;
            pol_sqrt_user[3 * site + 1] = s;
            pol_sqrt_user[3 * site + 2] = s;
        }
        reorder::reorder_vector(map, &pol_sqrt_user, &mut self.pol_sqrt_core);

        for v in self.phi.iter_mut() {
            *v = 0.0;
        }
        for v in self.efq.iter_mut().chain(self.efd.iter_mut()).chain(self.mu.iter_mut()).chain(self.grad_core.iter_mut()) {
            *v = 0.0;
        }

        Ok(())
    }

    /// Sets the ASPC predictor order, resetting the history ring (a
    /// history entry's meaning is tied to the order it was
    /// predicted/corrected under).
    pub fn set_aspc_parameters(&mut self, k: usize) -> Result<()> {
        let order = AspcOrder::new(k)?;
        self.aspc_order = order;
        self.aspc_history.set_capacity(order.history_len());
        Ok(())
    }

    /// Clears the ASPC history window, forcing the next `Aspc`-method call
    /// to warm up via conjugate gradient again.
    pub fn reset_aspc_history(&mut self) {
        self.aspc_history.clear();
    }

    /// Runs Permanent -> Dipoles(dip_method) -> Energy -> (if `do_grads`)
    /// Gradients, and returns `E_perm + E_ind`. `grad` is accumulated into
    /// additively (user layout); the core never zeroes the caller's array.
    #[tracing::instrument(skip_all, fields(method = ?self.config.method, n_sites = self.layout.total_sites()))]
    pub fn get_electrostatics(&mut self, grad: &mut [f64]) -> Result<f64> {
        permanent::compute(
            &self.layout,
            &self.exclusions,
            self.topology.as_ref(),
            self.g34,
            &self.xyz_core,
            &self.chg_core,
            &self.polfac_core,
            &mut self.phi,
            &mut self.efq,
        );

        let pol_core: Vec<f64> = self.pol_sqrt_core.iter().map(|s| s * s).collect();
        match self.config.method {
            DipoleMethod::ConjugateGradient => solvers::solve_cg(
                &self.layout,
                &self.exclusions,
                self.topology.as_ref(),
                &self.config,
                &self.xyz_core,
                &self.polfac_core,
                &self.pol_sqrt_core,
                &self.efq,
                &mut self.mu,
            )?,
            DipoleMethod::Iterative => solvers::solve_iterative(
                &self.layout,
                &self.exclusions,
                self.topology.as_ref(),
                &self.config,
                &self.xyz_core,
                &self.polfac_core,
                &pol_core,
                &self.efq,
                &mut self.mu,
            )?,
            DipoleMethod::Aspc => solvers::solve_aspc(
                &self.layout,
                &self.exclusions,
                self.topology.as_ref(),
                &self.config,
                &self.xyz_core,
                &self.polfac_core,
                &pol_core,
                &self.pol_sqrt_core,
                self.aspc_order.get(),
                &mut self.aspc_history,
                &self.efq,
                &mut self.mu,
            )?,
        }

        let (e_perm, e_ind) = energy::compute(&self.phi, &self.chg_core, &self.mu, &self.efq);
        tracing::debug!(e_perm, e_ind, "electrostatics converged");

        if self.do_grads {
            for v in self.efd.iter_mut() {
                *v = 0.0;
            }
            dipole_field::compute(
                &self.layout,
                &self.exclusions,
                self.topology.as_ref(),
                &self.xyz_core,
                &self.polfac_core,
                &self.mu,
                &mut self.efd,
            );

            gradient::compute(
                &self.layout,
                &self.exclusions,
                self.topology.as_ref(),
                &self.xyz_core,
                &self.chg_core,
                &self.polfac_core,
                &self.mu,
                &self.efq,
                &mut self.phi,
                &mut self.grad_core,
            );
        }

        let map = self.layout.map();
        reorder::unreorder_scalar(map, &self.phi, &mut self.phi_user);
        reorder::unreorder_vector(map, &self.efq, &mut self.efq_user);
        reorder::unreorder_vector(map, &self.efd, &mut self.efd_user);
        reorder::unreorder_vector(map, &self.mu, &mut self.mu_user);

        if self.do_grads {
            reorder::unreorder_vector_accumulate(map, &self.grad_core, grad);

            for block in self.layout.blocks() {
                let ty = &self.layout.types()[block.type_index];
                self.topology.redistribute_virt_grads_to_real(
                    &ty.mon_id,
                    block.nmon,
                    block.first_crd,
                    grad,
                );
            }
            for block in self.layout.blocks() {
                let ty = &self.layout.types()[block.type_index];
                self.topology.charge_derivative_force(
                    &ty.mon_id,
                    block.nmon,
                    block.first_crd,
                    block.first_site,
                    &self.phi_user,
                    grad,
                    &self.chg_grad_user,
                );
            }
        }

        Ok(e_perm + e_ind)
    }

    /// The permanent + induced electrostatic potential at every site, user
    /// layout, as of the last `get_electrostatics` call.
    pub fn phi(&self) -> &[f64] {
        &self.phi_user
    }

    /// The permanent electric field at every site, user layout.
    pub fn efq(&self) -> &[f64] {
        &self.efq_user
    }

    /// The induced-dipole field at every site, user layout (zero if the
    /// last call had `do_grads = false`).
    pub fn efd(&self) -> &[f64] {
        &self.efd_user
    }

    /// The converged induced dipoles at every site, user layout.
    pub fn mu(&self) -> &[f64] {
        &self.mu_user
    }

    pub fn layout(&self) -> &SystemLayout {
        &self.layout
    }
}
