//! `ttm4`: a Thole-damped, self-consistent polarizable electrostatics engine
//! for the TTM4 family of water/ion potentials.
//!
//! This crate is a thin facade over the `ttm4` workspace: [`ttm4_core`] owns
//! the shared data model (layout, topology capability trait, errors),
//! [`ttm4_kernels`] owns the screening functions and pair kernels, and
//! [`ttm4_engine`] wires them into the public [`Engine`] re-exported here.
//! Most callers only need this crate; the split exists so a host that wants
//! to reuse the pair kernels directly (e.g. to drive its own solver) can
//! depend on `ttm4_kernels` without pulling in the engine.
//!
//! # Feature flags
//!
//! - `std` (default): enables the standard-library builds of the dependent
//!   crates. Without it the workspace builds `no_std` + `alloc`.
//! - `multicore` (default): parallelizes the intermonomer pair loops across
//!   threads via `maybe-rayon`. Without it every driver runs single-threaded,
//!   which is the only option in a `no_std` build with no OS thread pool.

#![cfg_attr(not(feature = "std"), no_std)]

pub use ttm4_core::{
    AspcOrder, BlockOffsets, DipoleMethod, DipoleSolver, Error, ExcludedSet, Exclusions,
    MonomerType, Result, SolverConfig, SystemLayout, Topology, A_CC, A_CD, A_DD, POLFAC_FLOOR,
};
pub use ttm4_engine::{AspcHistory, Engine};
