//! Shader Macro Definition Set
//!
//! Stores the macro definitions that select a shader variant. Keys and values
//! are interned [`Symbol`]s kept in sorted order, so two sets built from the
//! same definitions always compare equal and hash identically regardless of
//! insertion order.
//!
//! The canonical string form ([`ShaderDefines::cache_key`]) sorts keys
//! lexicographically and is the cache key for compiled variants: two flag
//! sets are the same variant iff their cache keys are byte-equal.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::utils::interner::{self, Symbol};

/// An ordered collection of shader macro definitions.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(Symbol, Symbol)>,
}

impl ShaderDefines {
    /// Creates an empty definition set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Creates a definition set with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            defines: Vec::with_capacity(capacity),
        }
    }

    /// Sets a definition, replacing any previous value for the key.
    pub fn set(&mut self, key: &str, value: &str) {
        let key_sym = interner::intern(key);
        let value_sym = interner::intern(value);
        self.set_symbol(key_sym, value_sym);
    }

    /// Sets a boolean-style definition (value `"1"`).
    pub fn set_flag(&mut self, key: &str) {
        self.set(key, "1");
    }

    /// Symbol-level insert, maintains sorted order.
    #[inline]
    pub fn set_symbol(&mut self, key: Symbol, value: Symbol) {
        match self.defines.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(idx) => {
                self.defines[idx].1 = value;
            }
            Err(idx) => {
                self.defines.insert(idx, (key, value));
            }
        }
    }

    /// Removes a definition. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if let Some(key_sym) = interner::get(key) {
            self.remove_symbol(key_sym)
        } else {
            false
        }
    }

    /// Symbol-level remove.
    #[inline]
    pub fn remove_symbol(&mut self, key: Symbol) -> bool {
        if let Ok(idx) = self.defines.binary_search_by_key(&key, |&(k, _)| k) {
            self.defines.remove(idx);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the key is defined.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key).is_some_and(|key_sym| self.contains_symbol(key_sym))
    }

    /// Symbol-level contains.
    #[inline]
    #[must_use]
    pub fn contains_symbol(&self, key: Symbol) -> bool {
        self.defines.binary_search_by_key(&key, |&(k, _)| k).is_ok()
    }

    /// Returns the value for a key, if defined.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let key_sym = interner::get(key)?;
        self.defines
            .binary_search_by_key(&key_sym, |&(k, _)| k)
            .ok()
            .map(|idx| interner::resolve(self.defines[idx].1))
    }

    /// Returns the value for a key parsed as `u32`, if defined and numeric.
    #[must_use]
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Clears all definitions.
    #[inline]
    pub fn clear(&mut self) {
        self.defines.clear();
    }

    /// Number of definitions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    /// Returns `true` if no definitions are set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterates definitions as symbols, in symbol order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, Symbol)> {
        self.defines.iter()
    }

    /// Iterates definitions as strings.
    #[inline]
    pub fn iter_strings(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Converts to a lexicographically ordered map (template rendering).
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.defines
            .iter()
            .map(|&(k, v)| {
                (
                    interner::resolve(k).to_string(),
                    interner::resolve(v).to_string(),
                )
            })
            .collect()
    }

    /// Merges definitions from `other`; values in `other` win on conflict.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for &(key, value) in &other.defines {
            self.set_symbol(key, value);
        }
    }

    /// The canonical serialized form: keys sorted lexicographically, boolean
    /// flags rendered bare and valued flags as `KEY=VALUE`, comma-joined.
    ///
    /// This string is the identity of a shader variant.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut parts: Vec<String> = self
            .defines
            .iter()
            .map(|&(k, v)| {
                let key = interner::resolve(k);
                let value = interner::resolve(v);
                if value == "1" {
                    key.to_string()
                } else {
                    format!("{key}={value}")
                }
            })
            .collect();
        parts.sort_unstable();
        parts.join(",")
    }

    /// Content hash, suitable for fast cache pre-checks.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }

    /// Raw slice access.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[(Symbol, Symbol)] {
        &self.defines
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::with_capacity(defines.len());
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut defines = ShaderDefines::new();
        defines.set_flag("DIFFUSE");
        defines.set("NUM_LIGHTS", "4");

        assert!(defines.contains("DIFFUSE"));
        assert!(!defines.contains("SHADE"));
        assert_eq!(defines.get("NUM_LIGHTS"), Some("4"));
        assert_eq!(defines.get_u32("NUM_LIGHTS"), Some(4));
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let mut a = ShaderDefines::new();
        a.set_flag("RIM");
        a.set_flag("DIFFUSE");
        a.set("NUM_LIGHTS", "2");

        let mut b = ShaderDefines::new();
        b.set("NUM_LIGHTS", "2");
        b.set_flag("DIFFUSE");
        b.set_flag("RIM");

        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "DIFFUSE,NUM_LIGHTS=2,RIM");
    }

    #[test]
    fn test_merge() {
        let mut d1 = ShaderDefines::from(&[("A", "1"), ("B", "2")][..]);
        let d2 = ShaderDefines::from(&[("B", "3"), ("C", "4")][..]);

        d1.merge(&d2);

        assert_eq!(d1.get("A"), Some("1"));
        assert_eq!(d1.get("B"), Some("3")); // overwritten
        assert_eq!(d1.get("C"), Some("4"));
    }

    #[test]
    fn test_hash_consistency() {
        let mut d1 = ShaderDefines::new();
        d1.set("A", "1");
        d1.set("B", "2");

        let mut d2 = ShaderDefines::new();
        d2.set("B", "2");
        d2.set("A", "1");

        assert_eq!(d1.compute_hash(), d2.compute_hash());
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_remove() {
        let mut defines = ShaderDefines::from(&[("BUMP", "1"), ("FOG", "1")][..]);
        assert!(defines.remove("BUMP"));
        assert!(!defines.remove("BUMP"));
        assert_eq!(defines.cache_key(), "FOG");
    }
}
