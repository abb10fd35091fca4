use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const LAST_HOUR: u32 = 24;
/// Largest mean number of arrivals per day a configuration may ask for
pub const MAX_EXPECTED_ARRIVALS: f64 = 1_000_000.0;

/// Parameters of a simulated service day
///
/// A day opens at `day_start_hour`, accepts arrivals until `day_end_hour`,
/// and serves every accepted arrival to completion even if that runs past
/// closing. Arrivals follow a Poisson process with a mean gap of `rate`
/// minutes; each needs a service time drawn uniformly from
/// `[appt_low, appt_high]` minutes on one of `num_queues` parallel servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of parallel servers
    pub num_queues: usize,
    /// Mean minutes between arrivals (scale of the exponential gap)
    pub rate: f64,
    /// Hour of day (0-24) when arrivals may start
    pub day_start_hour: u32,
    /// Hour of day (0-24) after which no arrival is accepted
    pub day_end_hour: u32,
    /// Shortest service time in minutes
    pub appt_low: f64,
    /// Longest service time in minutes
    pub appt_high: f64,
}

impl SimulationConfig {
    /// Build and validate a configuration
    pub fn new(
        num_queues: usize,
        rate: f64,
        day_start_hour: u32,
        day_end_hour: u32,
        appt_low: f64,
        appt_high: f64,
    ) -> SimResult<Self> {
        let config = SimulationConfig {
            num_queues,
            rate,
            day_start_hour,
            day_end_hour,
            appt_low,
            appt_high,
        };
        config.validate()?;
        Ok(config)
    }

    /// Clinic with 3 doctors, a patient every 10 minutes on average between
    /// 9AM and 4PM, appointments lasting 5 to 21 minutes
    pub fn clinic() -> Self {
        SimulationConfig {
            num_queues: 3,
            rate: 10.0,
            day_start_hour: 9,
            day_end_hour: 16,
            appt_low: 5.0,
            appt_high: 21.0,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.num_queues == 0 {
            return Err(invalid("num_queues must be at least 1"));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(invalid(format!(
                "rate must be a positive number of minutes, got {}",
                self.rate
            )));
        }
        if self.day_start_hour > LAST_HOUR || self.day_end_hour > LAST_HOUR {
            return Err(invalid(format!(
                "hours must lie in 0..={}, got {}..{}",
                LAST_HOUR, self.day_start_hour, self.day_end_hour
            )));
        }
        if self.day_end_hour <= self.day_start_hour {
            return Err(invalid(format!(
                "day_end_hour ({}) must be after day_start_hour ({})",
                self.day_end_hour, self.day_start_hour
            )));
        }
        if self.expected_arrivals() > MAX_EXPECTED_ARRIVALS {
            return Err(invalid(format!(
                "rate {} gives {:.0} expected arrivals per day, above the limit of {}",
                self.rate,
                self.expected_arrivals(),
                MAX_EXPECTED_ARRIVALS
            )));
        }
        if !self.appt_low.is_finite() || !self.appt_high.is_finite() {
            return Err(invalid("appointment bounds must be finite"));
        }
        if self.appt_low < 0.0 {
            return Err(invalid(format!(
                "appt_low must be non-negative, got {}",
                self.appt_low
            )));
        }
        if self.appt_low > self.appt_high {
            return Err(invalid(format!(
                "appt_low ({}) exceeds appt_high ({})",
                self.appt_low, self.appt_high
            )));
        }
        Ok(())
    }

    /// Opening time in minutes after midnight
    pub fn day_start(&self) -> f64 {
        self.day_start_hour as f64 * MINUTES_PER_HOUR
    }

    /// Last admissible arrival time in minutes after midnight
    pub fn day_end(&self) -> f64 {
        self.day_end_hour as f64 * MINUTES_PER_HOUR
    }

    pub fn window_minutes(&self) -> f64 {
        self.day_end() - self.day_start()
    }

    /// Mean number of arrivals in one day (the Poisson mean)
    pub fn expected_arrivals(&self) -> f64 {
        self.window_minutes() / self.rate
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::clinic()
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfiguration(message.into())
}

/// Render minutes after midnight as `HH:MM:SS`
///
/// Hours keep counting past 23 so service that runs beyond midnight stays
/// readable. Negative values are clamped to midnight.
pub fn format_clock(minutes: f64) -> String {
    let total_seconds = (minutes.max(0.0) * 60.0).round() as u64;
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
