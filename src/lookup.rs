//! Bidirectional mapping between items and their insertion ordinals.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::ops::Index;

#[derive(Debug, Clone)]
pub struct HashLookup<T: Eq + Hash> {
    item_to_index: FxHashMap<T, usize>,
    index_to_item: Vec<T>,
}
impl<T: Eq + Hash> HashLookup<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let item_to_index = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let index_to_item = Vec::with_capacity(capacity);
        Self {
            item_to_index,
            index_to_item,
        }
    }

    /// Appends `item`, returning its ordinal. If an equal item is already present, the lookup is
    /// left unchanged and the existing ordinal is returned as the error.
    pub fn try_push(&mut self, item: T) -> Result<usize, usize>
    where
        T: Clone,
    {
        let index = self.index_to_item.len();
        if let Some(&existing_index) = self.item_to_index.get(&item) {
            return Err(existing_index);
        }
        self.item_to_index.insert(item.clone(), index);
        self.index_to_item.push(item);
        Ok(index)
    }

    pub fn item_at(&self, index: usize) -> Option<&T> {
        self.index_to_item.get(index)
    }

    pub fn index_of<Q>(&self, item: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.item_to_index.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.index_to_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_item.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.index_to_item
    }
}

impl<T: Eq + Hash> Index<usize> for HashLookup<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.item_at(index)
            .unwrap_or_else(|| panic!("no item at index {index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_resolve() {
        let mut lookup = HashLookup::with_capacity(3);
        assert_eq!(0, lookup.len());
        assert!(lookup.is_empty());
        assert_eq!(Ok(0), lookup.try_push("zero".to_string()));
        assert_eq!(Ok(1), lookup.try_push("one".to_string()));
        assert!(!lookup.is_empty());
        assert_eq!(2, lookup.len());
        assert_eq!(&["zero".to_string(), "one".to_string()], lookup.items());

        assert_eq!(Some(&"zero".to_string()), lookup.item_at(0));
        assert_eq!(Some(0), lookup.index_of("zero"));

        assert_eq!(Some(1), lookup.index_of("one"));
        assert_eq!(None, lookup.item_at(2));
        assert_eq!(None, lookup.index_of("two"));
    }

    #[test]
    fn push_duplicate() {
        let mut lookup = HashLookup::with_capacity(2);
        lookup.try_push("zero").unwrap();
        lookup.try_push("one").unwrap();
        assert_eq!(Err(1), lookup.try_push("one"));
        assert_eq!(2, lookup.len());
    }

    #[test]
    #[should_panic(expected = "no item at index 2")]
    fn no_item_at_index() {
        let mut lookup = HashLookup::with_capacity(2);
        lookup.try_push("zero").unwrap();
        lookup.try_push("one").unwrap();
        lookup[2];
    }
}
