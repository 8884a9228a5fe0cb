use crate::error::{Result, TkvsError};
use crate::store::KeySpace;
use dashmap::DashMap;
use std::collections::VecDeque;

/// Keyed FIFO queues of strings.
///
/// `push` appends at the tail and `pop` removes from the head, each under the
/// entry's exclusive lock, so concurrent producers and consumers observe a
/// single global FIFO order and no element is delivered twice. Queues are not
/// persisted by the snapshot codec.
#[derive(Debug, Default)]
pub struct QueueStore {
    map: DashMap<String, VecDeque<String>>,
}

impl QueueStore {
    /// creates an empty queue store
    pub fn new() -> Self {
        QueueStore { map: DashMap::new() }
    }

    /// inserts a new empty queue under `name`
    pub fn create(&self, keys: &KeySpace, name: &str) -> Result<()> {
        if !keys.add(name) {
            return Err(TkvsError::key_exists(name));
        }
        self.map.insert(name.to_string(), VecDeque::new());
        Ok(())
    }

    /// appends `value` at the tail of the queue `name`
    pub fn push(&self, name: &str, value: &str) -> Result<()> {
        let mut queue = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        queue.push_back(value.to_string());
        Ok(())
    }

    /// removes and returns the head of the queue `name`
    ///
    /// Popping an empty queue is an error, not a wait.
    pub fn pop(&self, name: &str) -> Result<String> {
        let mut queue = self
            .map
            .get_mut(name)
            .ok_or_else(|| TkvsError::key_not_found(name))?;
        queue.pop_front().ok_or_else(|| TkvsError::queue_empty(name))
    }

    /// removes `name` and its elements, returning whether it was present
    pub(crate) fn take(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }
}
