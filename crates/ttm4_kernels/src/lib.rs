//! Screening functions, the six pair kernels, the reorder/unreorder buffer
//! transforms, and the private-per-thread-workspace parallel reduction
//! primitive used by every driver in the `ttm4` engine.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod kernels;
pub mod pool;
pub mod reorder;
pub mod screening;

pub use kernels::gradient::ChargeDipole;
