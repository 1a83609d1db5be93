//! Parallel dispatch of query-tile jobs.
//!
//! The engine splits the query collection into disjoint tiles and hands one
//! job per tile to a [`TileDispatcher`]. Each job owns its queries'
//! accumulators outright, so dispatchers only need to run independent closures
//! and return their outputs in job order.

use rayon::prelude::*;
use tracing::debug;

use crate::matching::selector::PartialResults;
use crate::matching::MatchError;

/// Work run for one query-tile job, identified by its index
pub type TileJob<'a> = dyn Fn(usize) -> PartialResults + Sync + 'a;

/// Executes independent query-tile jobs.
pub trait TileDispatcher: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Run jobs `0..jobs` and return their outputs indexed by job.
    fn dispatch(&self, jobs: usize, work: &TileJob<'_>) -> Vec<PartialResults>;
}

/// Runs every job on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialDispatcher;

impl TileDispatcher for SerialDispatcher {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn dispatch(&self, jobs: usize, work: &TileJob<'_>) -> Vec<PartialResults> {
        (0..jobs).map(work).collect()
    }
}

/// Runs jobs on a rayon thread pool
pub struct RayonDispatcher {
    /// `None` uses rayon's global pool
    pool: Option<rayon::ThreadPool>,
}

impl RayonDispatcher {
    /// Dispatcher over rayon's global pool
    #[must_use]
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Dispatcher over a dedicated pool of `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::ThreadPool` if the pool cannot be created.
    pub fn with_threads(threads: usize) -> Result<Self, MatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| MatchError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }
}

impl TileDispatcher for RayonDispatcher {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn dispatch(&self, jobs: usize, work: &TileJob<'_>) -> Vec<PartialResults> {
        debug!("Dispatching {jobs} query tiles over {} threads", self.threads());
        let run = || -> Vec<PartialResults> { (0..jobs).into_par_iter().map(work).collect() };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

/// Pick a dispatcher for a thread count: 1 runs serially, 0 uses all cores.
///
/// # Errors
///
/// Returns `MatchError::ThreadPool` if a dedicated pool cannot be created.
pub fn dispatcher_for(threads: usize) -> Result<Box<dyn TileDispatcher>, MatchError> {
    match threads {
        0 => Ok(Box::new(RayonDispatcher::global())),
        1 => Ok(Box::new(SerialDispatcher)),
        n => Ok(Box::new(RayonDispatcher::with_threads(n)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::selector::TopK;

    fn job(i: usize) -> PartialResults {
        PartialResults {
            query_start: i * 10,
            tops: vec![TopK::new(1)],
            completed_master_tiles: i,
            cancelled: false,
        }
    }

    #[test]
    fn test_serial_preserves_job_order() {
        let out = SerialDispatcher.dispatch(4, &job);
        let starts: Vec<usize> = out.iter().map(|p| p.query_start).collect();
        assert_eq!(starts, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_rayon_preserves_job_order() {
        let dispatcher = RayonDispatcher::with_threads(3).unwrap();
        assert_eq!(dispatcher.threads(), 3);
        let out = dispatcher.dispatch(50, &job);
        let starts: Vec<usize> = out.iter().map(|p| p.query_start).collect();
        assert_eq!(starts, (0..50).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_dispatcher_for() {
        assert_eq!(dispatcher_for(1).unwrap().name(), "serial");
        assert_eq!(dispatcher_for(0).unwrap().name(), "rayon");
        assert_eq!(dispatcher_for(2).unwrap().name(), "rayon");
    }
}
