//! In-memory shapes of a parsed table: a plain sequence, a map on a unique key,
//! groups on a foreign key and a sequence sorted for binary search.
use crate::binary_search::find_first_occurrence;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use std::cmp::Ordering;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

/// An insertion ordered map with the fast, non cryptographic, hasher used everywhere in the crate
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// All the records of a table, in file order
#[derive(Debug)]
pub struct Table<T> {
    records: Vec<Arc<T>>,
}

impl<T> Table<T> {
    pub(crate) fn new(records: Vec<Arc<T>>) -> Self {
        Table { records }
    }

    pub fn all(&self) -> &[Arc<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record matching the predicate
    pub fn find<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Option<Arc<T>> {
        self.records.iter().find(|r| predicate(r)).cloned()
    }

    /// Every record matching the predicate, in file order
    pub fn filter<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Vec<Arc<T>> {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

/// Records of a table keyed by a column that identifies them
#[derive(Debug)]
pub struct UniqueIndex<T> {
    records: FxIndexMap<String, Arc<T>>,
}

impl<T> UniqueIndex<T> {
    pub(crate) fn new(records: FxIndexMap<String, Arc<T>>) -> Self {
        UniqueIndex { records }
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.records.get(id).cloned()
    }

    /// Records in the order their key first appeared in the file
    pub fn all(&self) -> impl Iterator<Item = &Arc<T>> {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Records of a table grouped by a foreign key, built in a single pass
#[derive(Debug)]
pub struct GroupIndex<T> {
    groups: FxHashMap<String, Vec<Arc<T>>>,
}

impl<T> GroupIndex<T> {
    /// Groups `records` by `key_of`, each group keeping the file order
    pub fn build<F>(records: &[Arc<T>], key_of: F) -> Self
    where
        F: Fn(&T) -> &str,
    {
        let mut groups: FxHashMap<String, Vec<Arc<T>>> = FxHashMap::default();
        for record in records {
            let key = key_of(record);
            match groups.get_mut(key) {
                Some(group) => group.push(Arc::clone(record)),
                None => {
                    groups.insert(key.to_owned(), vec![Arc::clone(record)]);
                }
            }
        }
        GroupIndex { groups }
    }

    /// Records of the group, empty when the key has none
    pub fn get(&self, key: &str) -> Vec<Arc<T>> {
        self.groups.get(key).cloned().unwrap_or_default()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Records sorted by a primary string key, each key owning a contiguous run
pub struct SortedIndex<T> {
    records: Vec<Arc<T>>,
    key_of: fn(&T) -> &str,
}

impl<T> SortedIndex<T> {
    /// Sorts by `key_of`, then by `then` inside a run
    pub fn new<C>(mut records: Vec<Arc<T>>, key_of: fn(&T) -> &str, mut then: C) -> Self
    where
        C: FnMut(&T, &T) -> Ordering,
    {
        records.sort_by(|a, b| key_of(a).cmp(key_of(b)).then_with(|| then(a, b)));
        SortedIndex { records, key_of }
    }

    pub fn all(&self) -> &[Arc<T>] {
        &self.records
    }

    /// Position of the first record of the run of `key`
    pub fn position(&self, key: &str) -> Option<usize> {
        let key_of = self.key_of;
        find_first_occurrence(&self.records, |r| key_of(r), key)
    }

    /// The whole run of records with that key, empty if there is none
    pub fn run(&self, key: &str) -> &[Arc<T>] {
        match self.position(key) {
            Some(start) => {
                let len = self.records[start..]
                    .iter()
                    .take_while(|r| (self.key_of)(r) == key)
                    .count();
                &self.records[start..start + len]
            }
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
