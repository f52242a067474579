//! Fundamental types shared by every crate in the `ttm4` workspace: the
//! error/result pair, the host-facing [`topology::Topology`] capability
//! trait, solver configuration, and the monomer-type/layout data model.
//!
//! This crate does no arithmetic of its own; [`ttm4_kernels`](../ttm4_kernels)
//! and the top-level engine build on the types defined here.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod layout;
pub mod topology;

pub use config::{AspcOrder, DipoleMethod, SolverConfig};
pub use error::{DipoleSolver, Error, Result};
pub use layout::{BlockOffsets, MonomerType, ReorderMap, SystemLayout};
pub use topology::{ExcludedSet, Exclusions, Topology};

/// Intermolecular Thole-damping coefficient for charge-charge interactions.
pub const A_CC: f64 = 0.4;
/// Intermolecular Thole-damping coefficient for charge-dipole interactions.
pub const A_CD: f64 = 0.4;
/// Intermolecular Thole-damping coefficient for dipole-dipole interactions.
pub const A_DD: f64 = 0.055;

/// Below this product of `polfac_i * polfac_j`, a pair is treated with the
/// undamped ("A = 0") kernel variant instead of the Thole-damped one.
pub const POLFAC_FLOOR: f64 = 1.0e-9;
