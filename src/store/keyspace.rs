use dashmap::DashSet;

/// The process-wide set of live keys and the authority on key uniqueness.
///
/// Every successful create claims its key here before touching a typed store,
/// so a name can never be live in two stores at once. Membership operations
/// are O(1) expected; [`KeySpace::snapshot`] copies the keys into a fresh
/// sorted list so callers can iterate without holding any store lock.
#[derive(Debug, Default)]
pub struct KeySpace {
    keys: DashSet<String>,
}

impl KeySpace {
    /// creates an empty key space
    pub fn new() -> Self {
        KeySpace { keys: DashSet::new() }
    }

    /// claims `key`, returning `false` if it is already live
    pub fn add(&self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    /// releases `key`, returning `false` if it was not live
    pub fn remove(&self, key: &str) -> bool {
        self.keys.remove(key).is_some()
    }

    /// whether `key` is currently live
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// the number of live keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// whether no keys are live
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// copies every live key into a sorted list
    ///
    /// Writers concurrent with the copy may or may not be reflected; the
    /// returned list itself is stable and safe to iterate.
    pub fn snapshot(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().map(|k| k.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}
