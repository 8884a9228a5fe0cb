use crate::error::{Result, TkvsError};
use crate::store::KeySpace;
use dashmap::DashMap;
use std::collections::HashMap;

/// Keyed string-to-string maps.
///
/// Field names are unique within a hash. `set` upserts; `del` and `get`
/// error on a missing field; `search` scans fields linearly for a substring,
/// with no index behind it.
#[derive(Debug, Default)]
pub struct HashStore {
    map: DashMap<String, HashMap<String, String>>,
}

impl HashStore {
    /// creates an empty hash store
    pub fn new() -> Self {
        HashStore { map: DashMap::new() }
    }

    /// inserts a new empty hash under `name`
    pub fn create(&self, keys: &KeySpace, name: &str) -> Result<()> {
        if !keys.add(name) {
            return Err(TkvsError::key_exists(name));
        }
        self.map.insert(name.to_string(), HashMap::new());
        Ok(())
    }

    /// removes the field `field` from the hash `name`
    pub fn del(&self, name: &str, field: &str) -> Result<()> {
        let mut hash = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        hash.remove(field)
            .map(|_| ())
            .ok_or_else(|| TkvsError::field_not_found(name, field))
    }

    /// whether the hash `name` has a field `field`
    pub fn exists(&self, name: &str, field: &str) -> Result<bool> {
        self.map
            .get(name)
            .map(|h| h.contains_key(field))
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// returns the value of the field `field` in the hash `name`
    pub fn get(&self, name: &str, field: &str) -> Result<String> {
        let hash = self.map.get(name).ok_or_else(|| TkvsError::key_not_found(name))?;
        hash.get(field)
            .cloned()
            .ok_or_else(|| TkvsError::field_not_found(name, field))
    }

    /// copies every (field, value) pair of the hash `name` into a list
    pub fn get_all(&self, name: &str) -> Result<Vec<(String, String)>> {
        self.map
            .get(name)
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// copies every field name of the hash `name` into a list
    pub fn get_keys(&self, name: &str) -> Result<Vec<String>> {
        self.map
            .get(name)
            .map(|h| h.keys().cloned().collect())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// upserts the field `field` of the hash `name` to `value`
    pub fn set(&self, name: &str, field: &str, value: &str) -> Result<()> {
        let mut hash = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        hash.insert(field.to_string(), value.to_string());
        Ok(())
    }

    /// the number of fields in the hash `name`
    pub fn len(&self, name: &str) -> Result<usize> {
        self.map
            .get(name)
            .map(|h| h.len())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// the fields of the hash `name` whose names contain `query`
    pub fn search(&self, name: &str, query: &str) -> Result<Vec<String>> {
        self.map
            .get(name)
            .map(|h| {
                h.keys()
                    .filter(|field| field.contains(query))
                    .cloned()
                    .collect()
            })
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// removes `name` and its fields, returning whether it was present
    pub(crate) fn take(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    /// visits every entry, each under its shard read lock
    pub(crate) fn for_each_entry<F: FnMut(&str, &HashMap<String, String>)>(&self, mut visit: F) {
        for entry in self.map.iter() {
            visit(entry.key(), entry.value());
        }
    }
}
