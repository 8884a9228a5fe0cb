use crate::store::Stores;

/// The literal pattern that matches every key.
const MATCH_ALL: &str = "*";

impl Stores {
    /// lists live keys matching `pattern`, sorted ascending
    ///
    /// The pattern grammar is deliberately minimal: the literal `*` matches
    /// everything, any other pattern matches keys containing it as a
    /// substring. No globbing, no regex.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let all = self.keyspace.snapshot();
        if pattern == MATCH_ALL {
            return all;
        }
        all.into_iter().filter(|key| key.contains(pattern)).collect()
    }

    /// deletes `key` from whichever store owns it, releasing the name
    ///
    /// The owner is located by probing strings, sets, queues and hashes in
    /// that order. A key no store owns is silently left alone; in particular
    /// the name is only released from the key space when a store gave up an
    /// entry, so a create that has claimed its name but not yet inserted its
    /// value cannot be torn down from under it.
    pub fn del(&self, key: &str) {
        let owned = self.strings.take(key)
            || self.sets.take(key)
            || self.queues.take(key)
            || self.hashes.take(key);
        if owned {
            self.keyspace.remove(key);
        }
    }
}
