use super::ThreadPool;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

/// A thread pool built on a shared job queue.
///
/// The queue is a crossbeam MPMC channel used single-producer,
/// multiple-consumer: the pool owns the sending half and every worker thread
/// holds a clone of the receiving half. A worker that panics while running a
/// job is replaced by a fresh thread, so the pool keeps its size across
/// panicking jobs. If thread creation itself fails after construction the
/// failure is logged and the pool shrinks.
pub struct SharedQueueThreadPool {
    jobs: Sender<Job>,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let (jobs, queue) = channel::unbounded::<Job>();
        for _ in 0..threads {
            let worker = Worker(queue.clone());
            thread::Builder::new().spawn(move || worker.run())?;
        }
        Ok(SharedQueueThreadPool { jobs })
    }

    /// # Panics
    /// Panics if every worker thread has died and could not be replaced.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.jobs
            .send(Box::new(job))
            .expect("no worker threads left in the pool");
    }
}

/// The receiving half of the job queue, owned by one worker thread.
///
/// Replacing panicked workers lives in `Drop`: unwinding out of a job drops
/// the worker, which notices the panic and spawns its replacement.
#[derive(Clone)]
struct Worker(Receiver<Job>);

impl Worker {
    fn run(&self) {
        loop {
            match self.0.recv() {
                Ok(job) => job(),
                Err(_) => {
                    debug!("job queue closed, worker exiting");
                    break;
                }
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            let replacement = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || replacement.run()) {
                error!("failed to replace a panicked worker: {}", e);
            }
        }
    }
}
