//! Parallel execution of independent simulated days
//!
//! Days share nothing but the immutable configuration, so they can be spread
//! across a rayon pool. Results always come back in run order, whatever the
//! thread count.
//!
//! # Example
//!
//! ```rust
//! use queue_sim::parallel::ParallelRunner;
//!
//! let results = ParallelRunner::new(20, |run_index| run_index * 2)
//!     .num_threads(4)
//!     .run();
//!
//! assert_eq!(results.len(), 20);
//! assert_eq!(results[7], Ok(14));
//! ```
//!
//! # Determinism
//!
//! Results are deterministic when the job derives its randomness from the
//! run index alone (e.g. `StdRng::seed_from_u64(mix(seed, run_index))`).
//!
//! # Error Handling
//!
//! Panics in individual runs are caught and returned as `Err(String)`.
//! Other runs continue executing normally.

use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{SimError, SimResult};

/// Executes `num_runs` calls of a job in parallel
///
/// The job receives the run index (`0..num_runs`) and must be `Send + Sync`
/// so it can be called from any worker thread.
pub struct ParallelRunner<S, F>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Send,
{
    num_runs: usize,
    job: F,
    num_threads: Option<usize>,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl<S, F> ParallelRunner<S, F>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Send,
{
    pub fn new(num_runs: usize, job: F) -> Self {
        ParallelRunner {
            num_runs,
            job,
            num_threads: None,
            progress_callback: None,
        }
    }

    /// Set number of threads (defaults to rayon's global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Set progress callback, called with `(completed, total)` after each run
    ///
    /// ```rust
    /// use queue_sim::parallel::ParallelRunner;
    ///
    /// let runner = ParallelRunner::new(100, |run_index| run_index)
    ///     .progress(|completed, total| {
    ///         if completed % 10 == 0 {
    ///             println!("Progress: {}/{}", completed, total);
    ///         }
    ///     });
    /// ```
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute all runs and return their results in run order
    ///
    /// Fails only if a dedicated pool was requested and could not be built.
    pub fn try_run(self) -> SimResult<Vec<Result<S, String>>> {
        let progress_counter = AtomicUsize::new(0);

        let pool = match self.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(pool_error)?,
            ),
            None => None,
        };

        let execute = || {
            (0..self.num_runs)
                .into_par_iter()
                .map(|run_index| {
                    let result =
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            (self.job)(run_index)
                        }));

                    let completed = progress_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(completed, self.num_runs);
                    }

                    result.map_err(|panic| {
                        if let Some(s) = panic.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "Unknown panic".to_string()
                        }
                    })
                })
                .collect()
        };

        Ok(match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        })
    }

    /// Like [`try_run`](Self::try_run), reporting a pool failure as a failed
    /// result for every run
    pub fn run(self) -> Vec<Result<S, String>> {
        let num_runs = self.num_runs;
        match self.try_run() {
            Ok(results) => results,
            Err(e) => (0..num_runs).map(|_| Err(e.to_string())).collect(),
        }
    }
}

fn pool_error(e: impl std::fmt::Display) -> SimError {
    SimError::ThreadPool(e.to_string())
}

/// Run `num_runs` jobs on rayon's global pool
pub fn run_parallel<S, F>(num_runs: usize, job: F) -> Vec<Result<S, String>>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Send,
{
    ParallelRunner::new(num_runs, job).run()
}

/// Progress callback that prints every `interval` completed runs
pub fn simple_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    move |completed, total| {
        if (interval > 0 && completed % interval == 0) || completed == total {
            println!("  Completed {}/{} runs", completed, total);
        }
    }
}
