use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

use crate::types::{Multiname, Namespace, NamespaceSet};

/// The per-kind capability set of a pool entry: structural hashing and
/// equality, decoupled from [Eq]/[Hash] so that kinds like `f64` can
/// take part.
pub trait PoolValue: Clone {
    fn pool_hash(&self) -> u64;
    fn pool_eq(&self, other: &Self) -> bool;
}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

macro_rules! structural_pool_value {
    ($($kind:ty),* $(,)?) => {
        $(
            impl PoolValue for $kind {
                fn pool_hash(&self) -> u64 {
                    hash_one(self)
                }

                fn pool_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

structural_pool_value!(i32, u32, String, Namespace, NamespaceSet, Multiname);

/// Doubles intern by bit pattern, keeping hashing consistent with
/// equality; NaN payloads and the sign of zero survive a round trip.
impl PoolValue for f64 {
    fn pool_hash(&self) -> u64 {
        self.to_bits()
    }

    fn pool_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// A deduplicating vector with a reserved sentinel at index 0, so all
/// valid indices are 1-based.
///
/// `append` preserves on-disk index assignments (duplicates allowed);
/// `append_if_new` and `find` go through a hash-to-candidates map so
/// interning stays amortized O(1).
pub struct InternedArray<T> {
    entries: Vec<Option<T>>,
    lookup: HashMap<u64, Vec<u32>>,
}

impl<T: PoolValue> InternedArray<T> {
    pub fn new() -> InternedArray<T> {
        InternedArray {
            entries: vec![None],
            lookup: HashMap::new(),
        }
    }

    /// Total entry count, sentinel included.
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.get(index as usize)?.as_ref()
    }

    /// Entries from index 1 up, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().flatten()
    }

    /// Unconditionally appends, returning the new 1-based index.
    pub fn append(&mut self, value: T) -> u32 {
        let index = self.entries.len() as u32;
        self.lookup.entry(value.pool_hash()).or_default().push(index);
        self.entries.push(Some(value));
        index
    }

    /// The index of the first entry structurally equal to `value`, or 0.
    pub fn find(&self, value: &T) -> u32 {
        let Some(candidates) = self.lookup.get(&value.pool_hash()) else {
            return 0;
        };
        candidates
            .iter()
            .copied()
            .find(|&index| match self.get(index) {
                Some(entry) => entry.pool_eq(value),
                None => false,
            })
            .unwrap_or(0)
    }

    /// The index of an existing equal entry, appending `value` when there
    /// is none. Never returns 0.
    pub fn append_if_new(&mut self, value: T) -> u32 {
        match self.find(&value) {
            0 => self.append(value),
            index => index,
        }
    }
}

impl<T: PoolValue> Default for InternedArray<T> {
    fn default() -> InternedArray<T> {
        InternedArray::new()
    }
}

impl<T: PoolValue> PartialEq for InternedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a.pool_eq(b))
    }
}

impl<T: PoolValue + Debug> Debug for InternedArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_if_new_dedups() {
        let mut array = InternedArray::new();
        assert_eq!(array.append_if_new("a".to_owned()), 1);
        assert_eq!(array.append_if_new("b".to_owned()), 2);
        assert_eq!(array.append_if_new("a".to_owned()), 1);
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(2).map(String::as_str), Some("b"));
        assert_eq!(array.get(0), None);
    }

    #[test]
    fn append_keeps_duplicates_and_find_takes_the_first() {
        let mut array = InternedArray::new();
        array.append("x".to_owned());
        array.append("x".to_owned());
        assert_eq!(array.len(), 3);
        assert_eq!(array.find(&"x".to_owned()), 1);
        assert_eq!(array.find(&"y".to_owned()), 0);
    }

    #[test]
    fn floats_intern_by_bit_pattern() {
        let mut array = InternedArray::new();
        let nan = array.append_if_new(f64::NAN);
        assert_eq!(array.append_if_new(f64::NAN), nan);
        assert_ne!(array.append_if_new(0.0), array.append_if_new(-0.0));
    }
}
