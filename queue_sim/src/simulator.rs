use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::arrivals::{Arrival, ArrivalGenerator};
use crate::config::{SimulationConfig, format_clock};
use crate::error::{SimError, SimResult};
use crate::parallel::ParallelRunner;
use crate::results::{ResultsTable, RunSummary};
use crate::servers::ServerPool;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed of the RNG stream for one run
///
/// Depends only on the simulator seed and the run's position in the
/// results table, so a day comes out the same whether it is simulated
/// alone, in a sequential batch or on a worker thread.
pub fn run_seed(seed: u64, run_index: usize) -> u64 {
    seed ^ (run_index as u64).wrapping_add(1).wrapping_mul(MIXING_CONSTANT)
}

/// Unwrap a batch of per-day outcomes, failing on the first panicked day
fn collect_rows(
    first: usize,
    results: Vec<Result<RunSummary, String>>,
) -> SimResult<Vec<RunSummary>> {
    results
        .into_iter()
        .enumerate()
        .map(|(offset, result)| {
            result.map_err(|message| SimError::RunPanicked {
                run_index: first + offset,
                message,
            })
        })
        .collect()
}

/// Everything that happened on one simulated day
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub arrivals: Vec<Arrival>,
    /// Server free times at the end of the day
    pub servers: ServerPool,
    pub summary: RunSummary,
}

/// Multi-server queue simulator for repeated independent days
///
/// ```rust
/// use queue_sim::{QueueSimulator, SimulationConfig};
///
/// let mut sim = QueueSimulator::with_seed(SimulationConfig::clinic(), 42).unwrap();
/// sim.run_simulation(5).unwrap();
///
/// assert_eq!(sim.results().len(), 5);
/// for row in sim.results() {
///     assert!(row.wait_count <= row.num_items);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QueueSimulator {
    config: SimulationConfig,
    generator: ArrivalGenerator,
    /// Idle pool at opening time, cloned for every day
    servers: ServerPool,
    seed: u64,
    results: ResultsTable,
}

impl QueueSimulator {
    /// Build a simulator seeded from the thread RNG
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        let seed = rand::rng().random();
        QueueSimulator::with_seed(config, seed)
    }

    pub fn with_seed(config: SimulationConfig, seed: u64) -> SimResult<Self> {
        let generator = ArrivalGenerator::new(&config)?;
        let servers = ServerPool::new(config.num_queues, config.day_start())?;
        debug!(
            "simulator ready: {} queues, {} arrivals drawn per day, seed {}",
            config.num_queues,
            generator.expected_count(),
            seed
        );
        Ok(QueueSimulator {
            config,
            generator,
            servers,
            seed,
            results: ResultsTable::new(),
        })
    }

    /// Build from raw parameters, hours as 0-24 times of day
    pub fn from_params(
        num_queues: usize,
        rate: f64,
        day_start_hour: u32,
        day_end_hour: u32,
        appt_low: f64,
        appt_high: f64,
    ) -> SimResult<Self> {
        let config = SimulationConfig::new(
            num_queues,
            rate,
            day_start_hour,
            day_end_hour,
            appt_low,
            appt_high,
        )?;
        QueueSimulator::new(config)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Arrivals drawn per day before dropping those after closing
    pub fn expected_count(&self) -> usize {
        self.generator.expected_count()
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    /// Simulate the day that would occupy row `run_index`, without recording it
    pub fn simulate_day(&self, run_index: usize) -> DayRecord {
        let mut servers = self.servers.clone();
        let (arrivals, summary) = self.run_day(run_index, &mut servers);
        DayRecord {
            arrivals,
            servers,
            summary,
        }
    }

    /// Simulate one day
    pub fn run_once(&mut self) -> SimResult<()> {
        self.run_simulation(1)
    }

    /// Simulate `number_of_runs` days and append one row per day
    ///
    /// Rows are appended only once every day has finished. Run indices keep
    /// counting across calls: a row's `run_index` is its position in the table.
    pub fn run_simulation(&mut self, number_of_runs: usize) -> SimResult<()> {
        if number_of_runs == 0 {
            return Err(SimError::InvalidRunCount(number_of_runs));
        }

        let first = self.results.len();
        let mut servers = self.servers.clone();
        let rows: Vec<RunSummary> = (first..first + number_of_runs)
            .map(|run_index| self.run_day(run_index, &mut servers).1)
            .collect();

        self.append(rows);
        Ok(())
    }

    /// Like [`run_simulation`](Self::run_simulation) with days spread over a
    /// rayon pool
    ///
    /// `num_threads` of `None` uses the global pool. The appended rows are
    /// identical to a sequential call. If any day panics nothing is appended.
    pub fn run_simulation_parallel(
        &mut self,
        number_of_runs: usize,
        num_threads: Option<usize>,
    ) -> SimResult<()> {
        if number_of_runs == 0 {
            return Err(SimError::InvalidRunCount(number_of_runs));
        }

        let first = self.results.len();
        let sim: &QueueSimulator = self;
        let mut runner = ParallelRunner::new(number_of_runs, |offset| {
            let mut servers = sim.servers.clone();
            sim.run_day(first + offset, &mut servers).1
        });
        if let Some(n) = num_threads {
            runner = runner.num_threads(n);
        }

        let results = runner.try_run()?;
        self.commit_batch(first, results)
    }

    /// Append a batch of per-day outcomes starting at row `first`
    ///
    /// The first failed day is reported as `RunPanicked` and the table is
    /// left as it was.
    fn commit_batch(
        &mut self,
        first: usize,
        results: Vec<Result<RunSummary, String>>,
    ) -> SimResult<()> {
        let rows = collect_rows(first, results)?;
        self.append(rows);
        Ok(())
    }

    fn run_day(&self, run_index: usize, servers: &mut ServerPool) -> (Vec<Arrival>, RunSummary) {
        let mut rng = StdRng::seed_from_u64(run_seed(self.seed, run_index));

        servers.reset(self.config.day_start());
        let mut arrivals = self.generator.generate(&mut rng);
        servers.assign_all(&mut arrivals);

        let summary = RunSummary::from_arrivals(
            run_index,
            &arrivals,
            self.config.day_start(),
            self.config.day_end(),
        );
        debug!(
            "run {}: {} items, {} waited, avg wait {:.2} min, closed {}",
            run_index,
            summary.num_items,
            summary.wait_count,
            summary.avg_wait_time,
            format_clock(summary.close_time)
        );

        (arrivals, summary)
    }

    fn append(&mut self, rows: Vec<RunSummary>) {
        let added = rows.len();
        self.results.extend(rows);
        info!(
            "appended {} runs, results table now holds {}",
            added,
            self.results.len()
        );
    }
}
