//! Bounded task-execution pool for post-processing jobs.
//!
//! The orchestrator submits heterogeneous jobs (statistics, correlations,
//! plots) tagged by kind and measure key; workers execute them and push
//! results onto a shared channel in completion order. A job failure (an
//! `Err` or a panic) is captured at the pool boundary and delivered inside
//! the completed tuple; it never kills a worker or the pool.
//!
//! There is no timeout or cancellation: draining blocks until every
//! outstanding job has completed, so a hung job blocks its caller
//! indefinitely. Known limitation.

use crate::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// What kind of work a job carries. Results come back tagged with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Stat,
    Correlation,
    Plot,
}

/// A finished job: kind and tag as submitted, result in completion order.
pub struct Completed<T> {
    pub kind: JobKind,
    pub tag: String,
    pub result: Result<T>,
}

/// Number of workers to use when the caller does not specify one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

struct Job<T> {
    kind: JobKind,
    tag: String,
    work: Box<dyn FnOnce() -> Result<T> + Send>,
}

/// Thread pool with a single result queue.
///
/// Submission order and completion order are unrelated; the only ordering
/// guarantee is that a submitted job eventually appears exactly once in the
/// result queue. Callers drain with `while pool.pending() > 0 { pool.poll() }`.
pub struct WorkerPool<T> {
    job_tx: Option<Sender<Job<T>>>,
    result_rx: Receiver<Completed<T>>,
    pending: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn a pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<Job<T>>();
        let (result_tx, result_rx) = unbounded::<Completed<T>>();

        let handles = (0..workers)
            .map(|i| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                std::thread::Builder::new()
                    .name(format!("graphprof-worker-{i}"))
                    .spawn(move || worker_loop(&job_rx, &result_tx))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            result_rx,
            pending: Arc::new(AtomicUsize::new(0)),
            workers: handles,
        }
    }

    /// Pool sized to the number of available processing units.
    pub fn with_default_workers() -> Self {
        Self::new(default_workers())
    }

    /// Enqueue a job.
    pub fn submit<F>(&self, kind: JobKind, tag: impl Into<String>, work: F)
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let Some(tx) = &self.job_tx else {
            return;
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            kind,
            tag: tag.into(),
            work: Box::new(work),
        };
        if tx.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Jobs submitted but not yet polled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Block until a completed job is available. `None` only if the pool
    /// has shut down, which cannot happen while jobs are outstanding.
    pub fn poll(&self) -> Option<Completed<T>> {
        let completed = self.result_rx.recv().ok()?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(completed)
    }

    /// Shut down: stop accepting work and wait for every worker to drain
    /// and terminate.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop<T>(job_rx: &Receiver<Job<T>>, result_tx: &Sender<Completed<T>>) {
    while let Ok(job) = job_rx.recv() {
        let Job { kind, tag, work } = job;
        let result = match catch_unwind(AssertUnwindSafe(work)) {
            Ok(result) => result,
            Err(panic) => Err(Error::PostProcessing(format!(
                "job panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };
        // The receiver only disappears during shutdown with nothing pending.
        let _ = result_tx.send(Completed { kind, tag, result });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn drain(pool: &WorkerPool<usize>) -> Vec<Completed<usize>> {
        let mut out = Vec::new();
        while pool.pending() > 0 {
            out.push(pool.poll().expect("pool alive while pending"));
        }
        out
    }

    #[test]
    fn n_jobs_yield_exactly_n_results() {
        for workers in [1, 4, default_workers()] {
            let pool = WorkerPool::new(workers);
            for i in 0..50usize {
                pool.submit(JobKind::Stat, format!("job-{i}"), move || Ok(i * i));
            }
            let results = drain(&pool);
            assert_eq!(results.len(), 50, "workers = {workers}");

            // No loss, no duplication.
            let tags: HashSet<String> = results.iter().map(|c| c.tag.clone()).collect();
            assert_eq!(tags.len(), 50, "workers = {workers}");
            pool.join();
        }
    }

    #[test]
    fn job_error_is_delivered_not_raised() {
        let pool: WorkerPool<usize> = WorkerPool::new(2);
        pool.submit(JobKind::Plot, "bad", || {
            Err(Error::PostProcessing("render failed".into()))
        });
        pool.submit(JobKind::Plot, "good", || Ok(7));

        let results = drain(&pool);
        assert_eq!(results.len(), 2);
        let bad = results.iter().find(|c| c.tag == "bad").unwrap();
        assert!(bad.result.is_err());
        let good = results.iter().find(|c| c.tag == "good").unwrap();
        assert_eq!(*good.result.as_ref().unwrap(), 7);
    }

    #[test]
    fn panicking_job_does_not_kill_the_pool() {
        let pool: WorkerPool<usize> = WorkerPool::new(1);
        pool.submit(JobKind::Stat, "boom", || panic!("deliberate"));
        pool.submit(JobKind::Stat, "after", || Ok(1));

        let results = drain(&pool);
        assert_eq!(results.len(), 2);
        let boom = results.iter().find(|c| c.tag == "boom").unwrap();
        match &boom.result {
            Err(Error::PostProcessing(msg)) => assert!(msg.contains("deliberate")),
            other => panic!("expected captured panic, got {other:?}"),
        }
        assert!(results.iter().any(|c| c.tag == "after"));
    }

    #[test]
    fn kinds_travel_with_results() {
        let pool: WorkerPool<usize> = WorkerPool::new(2);
        pool.submit(JobKind::Stat, "s", || Ok(0));
        pool.submit(JobKind::Correlation, "c", || Ok(0));
        pool.submit(JobKind::Plot, "p", || Ok(0));

        let results = drain(&pool);
        let kind_of = |tag: &str| results.iter().find(|c| c.tag == tag).unwrap().kind;
        assert_eq!(kind_of("s"), JobKind::Stat);
        assert_eq!(kind_of("c"), JobKind::Correlation);
        assert_eq!(kind_of("p"), JobKind::Plot);
    }

    #[test]
    fn join_waits_for_workers() {
        let pool: WorkerPool<usize> = WorkerPool::new(4);
        for i in 0..16usize {
            pool.submit(JobKind::Stat, "t", move || {
                std::thread::sleep(std::time::Duration::from_millis(1));
                Ok(i)
            });
        }
        let results = drain(&pool);
        assert_eq!(results.len(), 16);
        pool.join(); // must not hang
    }
}
