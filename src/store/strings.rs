use crate::error::{Result, TkvsError};
use crate::store::KeySpace;
use dashmap::DashMap;

/// Keyed mutable byte-strings.
///
/// Every operation resolves its key under the map's per-shard lock, so a
/// mutation holds an exclusive lock on the entry for exactly the duration of
/// the call. Range arguments address bytes; an edit that would split a UTF-8
/// code point is rejected rather than applied.
#[derive(Debug, Default)]
pub struct StringStore {
    map: DashMap<String, String>,
}

impl StringStore {
    /// creates an empty string store
    pub fn new() -> Self {
        StringStore { map: DashMap::new() }
    }

    /// inserts a new string under `name`
    ///
    /// The name is claimed in `keys` first; if it is live anywhere the create
    /// fails with `KEY_EXISTS` and nothing changes.
    pub fn create(&self, keys: &KeySpace, name: &str, value: &str) -> Result<()> {
        if !keys.add(name) {
            return Err(TkvsError::key_exists(name));
        }
        self.map.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// returns the current value of `name`
    pub fn get(&self, name: &str) -> Result<String> {
        self.map
            .get(name)
            .map(|v| v.clone())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// whether a string named `name` exists; never errors
    pub fn exists(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// the byte length of the value of `name`
    pub fn length(&self, name: &str) -> Result<usize> {
        self.map
            .get(name)
            .map(|v| v.len())
            .ok_or_else(|| TkvsError::key_not_found(name))
    }

    /// returns the bytes `[start, end)` of the value of `name`
    ///
    /// Requires `start <= end <= length`.
    pub fn substring(&self, name: &str, start: usize, end: usize) -> Result<String> {
        let value = self.map.get(name).ok_or_else(|| TkvsError::key_not_found(name))?;
        check_range(start, end, value.len())?;
        bytes_to_string(&value.as_bytes()[start..end])
    }

    /// appends `suffix` to the value of `name`
    pub fn append(&self, name: &str, suffix: &str) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        value.push_str(suffix);
        Ok(())
    }

    /// prepends `prefix` to the value of `name`
    pub fn prepend(&self, name: &str, prefix: &str) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        value.insert_str(0, prefix);
        Ok(())
    }

    /// splices `insert` into the value of `name` at byte offset `index`
    ///
    /// Requires `index <= length`.
    pub fn insert(&self, name: &str, insert: &str, index: usize) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        if index > value.len() {
            return Err(TkvsError::invalid_arguments(format!(
                "index {} is out of bounds for length {}",
                index,
                value.len()
            )));
        }
        let mut bytes = value.as_bytes().to_vec();
        bytes.splice(index..index, insert.as_bytes().iter().copied());
        *value = bytes_to_string(&bytes)?;
        Ok(())
    }

    /// erases the bytes `[start, end)` from the value of `name`
    ///
    /// Requires `start <= end <= length`.
    pub fn trim(&self, name: &str, start: usize, end: usize) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        check_range(start, end, value.len())?;
        let mut bytes = value.as_bytes().to_vec();
        bytes.drain(start..end);
        *value = bytes_to_string(&bytes)?;
        Ok(())
    }

    /// erases `count` bytes from the front of the value of `name`
    ///
    /// Requires `count <= length`.
    pub fn ltrim(&self, name: &str, count: usize) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        check_trim_count(count, value.len())?;
        let mut bytes = value.as_bytes().to_vec();
        bytes.drain(0..count);
        *value = bytes_to_string(&bytes)?;
        Ok(())
    }

    /// erases `count` bytes from the back of the value of `name`
    ///
    /// Requires `count <= length`.
    pub fn rtrim(&self, name: &str, count: usize) -> Result<()> {
        let mut value = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        check_trim_count(count, value.len())?;
        let keep = value.len() - count;
        let mut bytes = value.as_bytes().to_vec();
        bytes.truncate(keep);
        *value = bytes_to_string(&bytes)?;
        Ok(())
    }

    /// removes `name` and its value, returning whether it was present
    pub(crate) fn take(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    /// visits every entry, each under its shard read lock
    pub(crate) fn for_each_entry<F: FnMut(&str, &str)>(&self, mut visit: F) {
        for entry in self.map.iter() {
            visit(entry.key(), entry.value());
        }
    }
}

fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end || end > len {
        return Err(TkvsError::invalid_arguments(format!(
            "range {}..{} is out of bounds for length {}",
            start, end, len
        )));
    }
    Ok(())
}

fn check_trim_count(count: usize, len: usize) -> Result<()> {
    if count > len {
        return Err(TkvsError::invalid_arguments(format!(
            "cannot trim {} bytes from a value of length {}",
            count, len
        )));
    }
    Ok(())
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TkvsError::invalid_arguments("edit does not fall on a character boundary"))
}
