//! Worker pools for servicing client connections.
//!
//! The server is generic over [`ThreadPool`], so the pool implementation is
//! chosen at startup; the binary runs on [`SharedQueueThreadPool`].

use crate::Result;

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;

/// A fixed-size pool of worker threads that jobs can be spawned onto.
pub trait ThreadPool {
    /// creates a pool running `threads` worker threads
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// schedules `job` to run on one of the pool's threads
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}
