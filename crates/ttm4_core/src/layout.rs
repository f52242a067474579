//! The monomer-type partition and the index map between user layout
//! (monomer-major, atom-by-atom) and core layout (per-type-block
//! Structure-of-Arrays, `xxxx...yyyy...zzzz...` per site).
//!
//! # Design
//!
//! User layout orders the system as `(type block, monomer instance, site,
//! axis)`, the natural layout for a host that stores one struct per atom.
//! Core layout orders it as `(type block, axis, site, monomer instance)`
//! within each block, so that the pair kernels can treat the monomer-instance
//! axis as a contiguous SIMD axis. [`ReorderMap`] is the bijection between
//! the two, computed once and reused for the lifetime of an [`crate::Engine`]
//! (the trait lives in `ttm4_engine`; this crate only describes the shape).

use alloc::string::String;
use alloc::vec::Vec;

/// One monomer type in the system: its topology identifier, the number of
/// monomer instances, and the number of sites per instance.
#[derive(Clone, Debug)]
pub struct MonomerType {
    pub mon_id: String,
    pub nmon: usize,
    pub nsites: usize,
}

impl MonomerType {
    pub fn new(mon_id: impl Into<String>, nmon: usize, nsites: usize) -> Self {
        Self {
            mon_id: mon_id.into(),
            nmon,
            nsites,
        }
    }

    fn site_count(&self) -> usize {
        self.nmon * self.nsites
    }
}

/// A contiguous run of monomer instances of one type, with its offsets into
/// both the user-layout and core-layout arrays already resolved.
#[derive(Clone, Copy, Debug)]
pub struct BlockOffsets {
    pub type_index: usize,
    pub nmon: usize,
    pub nsites: usize,
    /// Offset of this block's first site in the user-layout scalar arrays
    /// (`chg`, `pol`, `polfac`, ...). Equal to the `first_site` argument
    /// passed to [`crate::topology::Topology::charge_derivative_force`].
    pub first_site: usize,
    /// Offset of this block's first coordinate in the user-layout vector
    /// arrays (`xyz`, gradient). Equal to `3 * first_site` and to the
    /// `first_crd` argument of the `Topology` methods.
    pub first_crd: usize,
    /// Offset of this block's first site in the core-layout scalar arrays.
    pub core_site_offset: usize,
}

/// The full partition of a system into monomer-type blocks, plus the
/// precomputed user-layout <-> core-layout index map.
#[derive(Clone, Debug)]
pub struct SystemLayout {
    types: Vec<MonomerType>,
    blocks: Vec<BlockOffsets>,
    total_sites: usize,
    map: ReorderMap,
}

impl SystemLayout {
    /// Builds the block partition and the reorder map from an ordered
    /// `mon_type_count` sequence. Computed once at `Engine::initialize` time
    /// and cached, per the design notes on layout permutation cost.
    pub fn new(types: Vec<MonomerType>) -> Self {
        let mut blocks = Vec::with_capacity(types.len());
        let mut first_site = 0usize;
        let mut core_site_offset = 0usize;

        for (type_index, ty) in types.iter().enumerate() {
            blocks.push(BlockOffsets {
                type_index,
                nmon: ty.nmon,
                nsites: ty.nsites,
                first_site,
                first_crd: 3 * first_site,
                core_site_offset,
            });
            first_site += ty.site_count();
            core_site_offset += ty.site_count();
        }

        let total_sites = first_site;
        let map = ReorderMap::build(&blocks);

        Self {
            types,
            blocks,
            total_sites,
            map,
        }
    }

    pub fn types(&self) -> &[MonomerType] {
        &self.types
    }

    pub fn blocks(&self) -> &[BlockOffsets] {
        &self.blocks
    }

    pub fn total_sites(&self) -> usize {
        self.total_sites
    }

    pub fn map(&self) -> &ReorderMap {
        &self.map
    }
}

/// The bijection between user-layout and core-layout positions, for both
/// scalar (per-site) and vector (per-site, 3 axes) arrays.
///
/// `scalar[u]` is the core-layout index holding the value that user-layout
/// index `u` holds, and likewise `vector[u]` for the 3-wide arrays. Since the
/// map is a bijection, the same arrays drive both directions: a scatter
/// write (`core[map[u]] = user[u]`) reorders, and a gather read
/// (`user[u] = core[map[u]]`) unreorders.
#[derive(Clone, Debug)]
pub struct ReorderMap {
    scalar: Vec<usize>,
    vector: Vec<usize>,
}

impl ReorderMap {
    fn build(blocks: &[BlockOffsets]) -> Self {
        let total_sites = blocks
            .last()
            .map(|b| b.first_site + b.nmon * b.nsites)
            .unwrap_or(0);

        let mut scalar = alloc::vec![0usize; total_sites];
        let mut vector = alloc::vec![0usize; 3 * total_sites];

        for b in blocks {
            for m in 0..b.nmon {
                for s in 0..b.nsites {
                    let user_site = b.first_site + m * b.nsites + s;
                    let core_site = b.core_site_offset + s * b.nmon + m;
                    scalar[user_site] = core_site;

                    for axis in 0..3 {
                        let user_vec = 3 * user_site + axis;
                        let core_vec =
                            3 * b.core_site_offset + s * 3 * b.nmon + axis * b.nmon + m;
                        vector[user_vec] = core_vec;
                    }
                }
            }
        }

        Self { scalar, vector }
    }

    pub fn scalar(&self) -> &[usize] {
        &self.scalar
    }

    pub fn vector(&self) -> &[usize] {
        &self.vector
    }

    pub fn n_sites(&self) -> usize {
        self.scalar.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_blocks_partition_contiguously() {
        let layout = SystemLayout::new(alloc::vec![
            MonomerType::new("h2o", 2, 4),
            MonomerType::new("na", 3, 1),
        ]);

        assert_eq!(layout.total_sites(), 2 * 4 + 3 * 1);
        assert_eq!(layout.blocks()[0].first_site, 0);
        assert_eq!(layout.blocks()[1].first_site, 8);
        assert_eq!(layout.blocks()[1].first_crd, 24);
    }

    #[test]
    fn map_is_a_bijection() {
        let layout = SystemLayout::new(alloc::vec![MonomerType::new("h2o", 3, 4)]);
        let map = layout.map();

        let mut seen = alloc::vec![false; map.n_sites()];
        for &c in map.scalar() {
            assert!(!seen[c], "core index {c} written twice");
            seen[c] = true;
        }
        assert!(seen.into_iter().all(|b| b));

        let mut seen_vec = alloc::vec![false; 3 * map.n_sites()];
        for &c in map.vector() {
            assert!(!seen_vec[c]);
            seen_vec[c] = true;
        }
        assert!(seen_vec.into_iter().all(|b| b));
    }
}
