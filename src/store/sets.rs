use crate::error::{Result, TkvsError};
use crate::store::KeySpace;
use dashmap::DashMap;
use std::collections::HashSet;

/// Keyed unordered sets of unique strings.
///
/// The algebra operations (`intersection`, `difference`, `union`) fail fast
/// on a missing operand and never hold more than one entry guard at a time:
/// each operand is visited in input order and its contribution is folded into
/// a local accumulator before the next guard is taken. There is deliberately
/// no cross-key consistency guarantee.
#[derive(Debug, Default)]
pub struct SetStore {
    map: DashMap<String, HashSet<String>>,
}

impl SetStore {
    /// creates an empty set store
    pub fn new() -> Self {
        SetStore { map: DashMap::new() }
    }

    /// inserts a new empty set under `name`
    pub fn create(&self, keys: &KeySpace, name: &str) -> Result<()> {
        if !keys.add(name) {
            return Err(TkvsError::key_exists(name));
        }
        self.map.insert(name.to_string(), HashSet::new());
        Ok(())
    }

    /// adds `value` to the set `name`; adding a present element is a no-op
    pub fn add(&self, name: &str, value: &str) -> Result<()> {
        let mut set = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        set.insert(value.to_string());
        Ok(())
    }

    /// the number of elements in the set `name`
    pub fn len(&self, name: &str) -> Result<usize> {
        self.map
            .get(name)
            .map(|s| s.len())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// whether `value` is an element of the set `name`
    pub fn contains(&self, name: &str, value: &str) -> Result<bool> {
        self.map
            .get(name)
            .map(|s| s.contains(value))
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// copies every element of the set `name` into a list
    pub fn get_all(&self, name: &str) -> Result<Vec<String>> {
        self.map
            .get(name)
            .map(|s| s.iter().cloned().collect())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// removes the specific element `value` from the set `name` and returns it
    pub fn pop(&self, name: &str, value: &str) -> Result<String> {
        let mut set = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        if !set.remove(value) {
            return Err(TkvsError::value_not_found(name, value));
        }
        Ok(value.to_string())
    }

    /// the intersection of the named sets
    ///
    /// Duplicate names are collapsed; the first name seeds the scan and the
    /// remaining unique names shrink it in input order. An empty name list
    /// yields an empty result.
    pub fn intersection(&self, names: &[&str]) -> Result<Vec<String>> {
        let names = dedup(names);
        let (seed, rest) = match names.split_first() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };
        let mut acc: HashSet<String> = {
            let set = self
                .map
                .get(*seed)
                .ok_or_else(|| TkvsError::key_not_found(seed))?;
            set.clone()
        };
        for name in rest {
            let set = self
                .map
                .get(*name)
                .ok_or_else(|| TkvsError::key_not_found(name))?;
            acc.retain(|element| set.contains(element));
        }
        Ok(acc.into_iter().collect())
    }

    /// the elements of `a` that are not elements of `b`
    ///
    /// Requires `a != b`.
    pub fn difference(&self, a: &str, b: &str) -> Result<Vec<String>> {
        if a == b {
            return Err(TkvsError::invalid_arguments(
                "cannot diff a set against itself",
            ));
        }
        let mut acc: HashSet<String> = {
            let set = self.map.get(a).ok_or_else(|| TkvsError::key_not_found(a))?;
            set.clone()
        };
        {
            let set = self.map.get(b).ok_or_else(|| TkvsError::key_not_found(b))?;
            acc.retain(|element| !set.contains(element));
        }
        Ok(acc.into_iter().collect())
    }

    /// the union of the named sets
    ///
    /// Duplicate names are collapsed; a missing name fails the whole call.
    /// An empty name list yields an empty result.
    pub fn union(&self, names: &[&str]) -> Result<Vec<String>> {
        let names = dedup(names);
        let mut acc: HashSet<String> = HashSet::new();
        for name in &names {
            let set = self
                .map
                .get(*name)
                .ok_or_else(|| TkvsError::key_not_found(name))?;
            acc.extend(set.iter().cloned());
        }
        Ok(acc.into_iter().collect())
    }

    /// removes `name` and its elements, returning whether it was present
    pub(crate) fn take(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    /// visits every entry, each under its shard read lock
    pub(crate) fn for_each_entry<F: FnMut(&str, &HashSet<String>)>(&self, mut visit: F) {
        for entry in self.map.iter() {
            visit(entry.key(), entry.value());
        }
    }
}

/// collapses duplicate names, keeping first occurrences in input order
fn dedup<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(**name))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn seeded() -> (KeySpace, SetStore) {
        let keys = KeySpace::new();
        let sets = SetStore::new();
        for (name, elements) in [
            ("evens", vec!["2", "4", "6"]),
            ("primes", vec!["2", "3", "5"]),
            ("small", vec!["2", "3"]),
        ] {
            sets.create(&keys, name).unwrap();
            for element in elements {
                sets.add(name, element).unwrap();
            }
        }
        (keys, sets)
    }

    fn sorted(mut values: Vec<String>) -> Vec<String> {
        values.sort();
        values
    }

    #[test]
    fn add_len_contains_pop() {
        let (keys, sets) = (KeySpace::new(), SetStore::new());
        sets.create(&keys, "s").unwrap();
        sets.add("s", "a").unwrap();
        sets.add("s", "b").unwrap();
        sets.add("s", "a").unwrap();
        assert_eq!(sets.len("s").unwrap(), 2);
        assert!(sets.contains("s", "a").unwrap());
        assert!(!sets.contains("s", "c").unwrap());

        assert_eq!(sets.pop("s", "a").unwrap(), "a");
        assert_eq!(sets.pop("s", "a").unwrap_err().code(), ErrorCode::ValueNotFound);
        assert_eq!(sets.len("s").unwrap(), 1);
    }

    #[test]
    fn missing_set_is_key_not_found() {
        let (_, sets) = (KeySpace::new(), SetStore::new());
        assert_eq!(sets.add("nope", "x").unwrap_err().code(), ErrorCode::KeyNotFound);
        assert_eq!(sets.len("nope").unwrap_err().code(), ErrorCode::KeyNotFound);
        assert_eq!(sets.get_all("nope").unwrap_err().code(), ErrorCode::KeyNotFound);
    }

    #[test]
    fn intersection_shrinks_across_operands() {
        let (_, sets) = seeded();
        assert_eq!(
            sorted(sets.intersection(&["evens", "primes"]).unwrap()),
            vec!["2"]
        );
        assert_eq!(
            sorted(sets.intersection(&["primes", "small"]).unwrap()),
            vec!["2", "3"]
        );
    }

    #[test]
    fn intersection_collapses_duplicate_names() {
        let (_, sets) = seeded();
        assert_eq!(
            sorted(sets.intersection(&["primes", "primes", "small"]).unwrap()),
            vec!["2", "3"]
        );
    }

    #[test]
    fn intersection_fails_fast_on_a_missing_name() {
        let (_, sets) = seeded();
        assert_eq!(
            sets.intersection(&["evens", "ghost"]).unwrap_err().code(),
            ErrorCode::KeyNotFound
        );
    }

    #[test]
    fn difference_excludes_the_second_operand() {
        let (_, sets) = seeded();
        assert_eq!(
            sorted(sets.difference("primes", "evens").unwrap()),
            vec!["3", "5"]
        );
        let diff: HashSet<String> = sets.difference("evens", "primes").unwrap().into_iter().collect();
        for element in sets.get_all("primes").unwrap() {
            assert!(!diff.contains(&element));
        }
    }

    #[test]
    fn self_difference_is_invalid() {
        let (_, sets) = seeded();
        assert_eq!(
            sets.difference("evens", "evens").unwrap_err().code(),
            ErrorCode::InvalidArguments
        );
    }

    #[test]
    fn union_covers_every_operand() {
        let (_, sets) = seeded();
        let union = sorted(sets.union(&["evens", "primes", "small"]).unwrap());
        assert_eq!(union, vec!["2", "3", "4", "5", "6"]);
        assert_eq!(
            sets.union(&["evens", "ghost"]).unwrap_err().code(),
            ErrorCode::KeyNotFound
        );
    }

    #[test]
    fn algebra_containment_properties() {
        let (_, sets) = seeded();
        let names = ["evens", "primes", "small"];

        let inter: HashSet<String> = sets.intersection(&names).unwrap().into_iter().collect();
        let union: HashSet<String> = sets.union(&names).unwrap().into_iter().collect();
        for name in &names {
            let all: HashSet<String> = sets.get_all(name).unwrap().into_iter().collect();
            assert!(inter.is_subset(&all));
            assert!(all.is_subset(&union));
        }
    }
}
