//! Multi-server queue simulation over repeated service days
//!
//! Arrivals follow a Poisson process between opening and closing time, each
//! needing a uniformly distributed service time on one of several parallel
//! servers. Every arrival goes to whichever server frees up first (lowest
//! index on ties) and waits if that server is still busy. Each simulated day
//! starts with all servers idle and yields one [`RunSummary`] row in the
//! simulator's [`ResultsTable`].
//!
//! Key pieces:
//! - ArrivalGenerator: draws one day's chronological arrivals
//! - ServerPool: earliest-free-server assignment and wait bookkeeping
//! - QueueSimulator: runs days sequentially or in parallel and keeps the table
//!
//! ```rust
//! use queue_sim::QueueSimulator;
//!
//! // 3 doctors, a patient every 10 minutes, 9AM-4PM, 5-21 minute appointments
//! let mut sim = QueueSimulator::from_params(3, 10.0, 9, 16, 5.0, 21.0).unwrap();
//! sim.run_simulation(10).unwrap();
//!
//! let summary = sim.results().summary().unwrap();
//! assert_eq!(summary.num_runs, 10);
//! ```

pub mod arrivals;
pub mod config;
pub mod error;
pub mod parallel;
pub mod results;
pub mod servers;
pub mod simulator;

pub use arrivals::{Arrival, ArrivalGenerator};
pub use config::SimulationConfig;
pub use error::{SimError, SimResult};
pub use results::{ResultsTable, RunSummary, TableSummary};
pub use servers::ServerPool;
pub use simulator::{DayRecord, QueueSimulator};
