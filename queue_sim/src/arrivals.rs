//! Arrival generation for one simulated day
//!
//! Arrivals are drawn speculatively: a fixed number of exponential gaps is
//! sampled up front, accumulated onto the opening time, and the arrivals that
//! land after closing are dropped. The fixed number comes from the 99.99th
//! percentile of the day's Poisson arrival count, so the speculative batch
//! almost never runs out before the window closes.

use rand::Rng;
use rand::distr::Uniform;
use rand_distr::{Distribution, Exp};
use serde::Serialize;
use tracing::warn;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};

/// Percentile of the daily Poisson count used to size the speculative batch
pub const ARRIVAL_PERCENTILE: f64 = 0.9999;

/// One arrival and, once assigned, its service outcome
///
/// Times are minutes after midnight; durations are minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    pub id: usize,
    pub inter_arrival_minutes: f64,
    pub arrival_time: f64,
    pub service_length: f64,
    /// Server index, `None` until the arrival has been assigned
    pub assigned_queue: Option<usize>,
    pub wait_time: f64,
    pub service_start_time: f64,
    pub service_end_time: f64,
}

impl Arrival {
    pub fn new(
        id: usize,
        inter_arrival_minutes: f64,
        arrival_time: f64,
        service_length: f64,
    ) -> Arrival {
        Arrival {
            id,
            inter_arrival_minutes,
            arrival_time,
            service_length,
            assigned_queue: None,
            wait_time: 0.0,
            service_start_time: arrival_time,
            service_end_time: arrival_time + service_length,
        }
    }

    pub fn waited(&self) -> bool {
        self.wait_time > 0.0
    }
}

/// Smallest `k` with `P(X <= k) >= q` for `X ~ Poisson(mean)`
///
/// The pmf is stepped in log space so large means do not underflow at
/// `k = 0`; the leading terms simply contribute nothing to the sum.
pub fn poisson_quantile(q: f64, mean: f64) -> usize {
    if mean <= 0.0 || q <= 0.0 {
        return 0;
    }

    let ln_mean = mean.ln();
    // Far beyond any percentile we ask for; guards against the cdf stalling
    // just below `q` through rounding.
    let cap = (mean + 40.0 * mean.sqrt() + 40.0).ceil() as usize;

    let mut k = 0;
    let mut log_pmf = -mean;
    let mut cdf = log_pmf.exp();
    while cdf < q && k < cap {
        k += 1;
        log_pmf += ln_mean - (k as f64).ln();
        cdf += log_pmf.exp();
    }
    k
}

/// Draws a day's arrivals for a fixed configuration
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    day_start: f64,
    day_end: f64,
    expected_count: usize,
    gap: Exp<f64>,
    service: Uniform<f64>,
}

impl ArrivalGenerator {
    pub fn new(config: &SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let gap = Exp::new(1.0 / config.rate).map_err(|e| {
            SimError::InvalidConfiguration(format!("inter-arrival distribution: {}", e))
        })?;
        let service = Uniform::new_inclusive(config.appt_low, config.appt_high).map_err(|e| {
            SimError::InvalidConfiguration(format!("service time distribution: {}", e))
        })?;

        Ok(ArrivalGenerator {
            day_start: config.day_start(),
            day_end: config.day_end(),
            expected_count: poisson_quantile(ARRIVAL_PERCENTILE, config.expected_arrivals()),
            gap,
            service,
        })
    }

    /// Number of arrivals drawn per day before filtering
    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    /// Generate one day's arrivals in chronological order
    ///
    /// All gaps are drawn before any service length, so a given RNG stream
    /// always yields the same day.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Arrival> {
        let gaps: Vec<f64> = (0..self.expected_count)
            .map(|_| self.gap.sample(rng))
            .collect();
        let service_lengths: Vec<f64> = (0..self.expected_count)
            .map(|_| self.service.sample(rng))
            .collect();

        let mut clock = self.day_start;
        let arrivals: Vec<Arrival> = gaps
            .into_iter()
            .zip(service_lengths)
            .enumerate()
            .map(|(id, (gap, service_length))| {
                clock += gap;
                Arrival::new(id, gap, clock, service_length)
            })
            .take_while(|arrival| arrival.arrival_time <= self.day_end)
            .collect();

        if self.is_saturated(&arrivals) {
            warn!(
                "all {} speculative arrivals fell before closing; day may be under-populated",
                self.expected_count
            );
        }

        arrivals
    }

    /// True when every speculative arrival landed before closing
    ///
    /// The window may then hold traffic that was never drawn. Such a day is
    /// kept as is.
    pub fn is_saturated(&self, arrivals: &[Arrival]) -> bool {
        self.expected_count > 0 && arrivals.len() == self.expected_count
    }
}
