//! Fx-hashed maps for the symbol, builtin and completion tables. Keys are short
//! identifiers, so the non-cryptographic hasher is a good fit.

use rustc_hash::{FxHashMap, FxHashSet};

pub type FastHashMap<K, V> = FxHashMap<K, V>;

pub type FastHashSet<K> = FxHashSet<K>;

#[inline]
pub fn fast_hash_map_new<K, V>() -> FastHashMap<K, V> {
    FxHashMap::default()
}

/// Pre-sized map for tables whose size is known up front (builtins, module members).
#[inline]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}

#[inline]
pub fn fast_hash_set_new<K>() -> FastHashSet<K> {
    FxHashSet::default()
}
