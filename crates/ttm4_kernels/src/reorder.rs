//! Applies a [`ReorderMap`] to move data between user layout and core
//! layout. The map itself is data (computed once in `ttm4_core`); this
//! module only knows how to scatter/gather through it.

use ttm4_core::ReorderMap;

/// `ReorderData`: scatters a user-layout scalar array into core layout.
pub fn reorder_scalar(map: &ReorderMap, user: &[f64], core: &mut [f64]) {
    debug_assert_eq!(user.len(), map.scalar().len());
    for (u, &c) in map.scalar().iter().enumerate() {
        core[c] = user[u];
    }
}

/// `ReorderData`: scatters a user-layout 3-wide array into core layout.
pub fn reorder_vector(map: &ReorderMap, user: &[f64], core: &mut [f64]) {
    debug_assert_eq!(user.len(), map.vector().len());
    for (u, &c) in map.vector().iter().enumerate() {
        core[c] = user[u];
    }
}

/// The inverse of [`reorder_scalar`]: gathers core layout back into user
/// layout.
pub fn unreorder_scalar(map: &ReorderMap, core: &[f64], user: &mut [f64]) {
    debug_assert_eq!(user.len(), map.scalar().len());
    for (u, &c) in map.scalar().iter().enumerate() {
        user[u] = core[c];
    }
}

/// The inverse of [`reorder_vector`].
pub fn unreorder_vector(map: &ReorderMap, core: &[f64], user: &mut [f64]) {
    debug_assert_eq!(user.len(), map.vector().len());
    for (u, &c) in map.vector().iter().enumerate() {
        user[u] = core[c];
    }
}

/// The inverse of [`reorder_vector`], but accumulating (`+=`) instead of
/// overwriting. Used to fold the core-layout gradient back into the
/// caller's user-layout gradient array without clobbering contributions the
/// host already placed there.
pub fn unreorder_vector_accumulate(map: &ReorderMap, core: &[f64], user: &mut [f64]) {
    debug_assert_eq!(user.len(), map.vector().len());
    for (u, &c) in map.vector().iter().enumerate() {
        user[u] += core[c];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttm4_core::{MonomerType, SystemLayout};

    #[test]
    fn reorder_then_unreorder_is_identity() {
        let layout = SystemLayout::new(alloc::vec![
            MonomerType::new("h2o", 3, 4),
            MonomerType::new("na", 2, 1),
        ]);
        let map = layout.map();
        let n = layout.total_sites();

        let user: alloc::vec::Vec<f64> = (0..3 * n).map(|i| i as f64 * 1.5).collect();
        let mut core = alloc::vec![0.0f64; 3 * n];
        reorder_vector(map, &user, &mut core);

        let mut back = alloc::vec![0.0f64; 3 * n];
        unreorder_vector(map, &core, &mut back);

        assert_eq!(user, back);
    }

    proptest::proptest! {
        /// Reorder-then-unreorder is the identity for any monomer-type
        /// mix and any scalar/vector payload, not just the one fixed
        /// layout above.
        #[test]
        fn reorder_roundtrip_is_identity_for_arbitrary_layouts(
            n_h2o in 0usize..6,
            n_na in 0usize..6,
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..200),
        ) {
            let layout = SystemLayout::new(alloc::vec![
                MonomerType::new("h2o", n_h2o, 4),
                MonomerType::new("na", n_na, 1),
            ]);
            let map = layout.map();
            let n = layout.total_sites();

            let scalar_user: alloc::vec::Vec<f64> =
                values.iter().cycle().take(n).copied().collect();
            let mut scalar_core = alloc::vec![0.0f64; n];
            reorder_scalar(map, &scalar_user, &mut scalar_core);
            let mut scalar_back = alloc::vec![0.0f64; n];
            unreorder_scalar(map, &scalar_core, &mut scalar_back);
            proptest::prop_assert_eq!(&scalar_user, &scalar_back);

            let vector_user: alloc::vec::Vec<f64> =
                values.iter().cycle().take(3 * n).copied().collect();
            let mut vector_core = alloc::vec![0.0f64; 3 * n];
            reorder_vector(map, &vector_user, &mut vector_core);
            let mut vector_back = alloc::vec![0.0f64; 3 * n];
            unreorder_vector(map, &vector_core, &mut vector_back);
            proptest::prop_assert_eq!(&vector_user, &vector_back);
        }
    }
}
