use std::fmt;

use serde::Serialize;

use crate::arrivals::Arrival;
use crate::config::format_clock;

/// Outcome of one simulated day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_index: usize,
    /// Arrivals served during the day
    pub num_items: usize,
    /// Arrivals that waited for a server
    pub wait_count: usize,
    /// Mean wait in minutes over all arrivals (0 on an empty day)
    pub avg_wait_time: f64,
    pub max_wait_time: f64,
    /// Arrival time of the last arrival, opening time on an empty day
    pub last_arrival_time: f64,
    /// Time the last service finished, opening time on an empty day
    pub close_time: f64,
    /// `close_time - day_end`, negative when the day wraps up early
    pub minutes_past_close: f64,
}

impl RunSummary {
    /// Summarise a fully assigned day
    pub fn from_arrivals(
        run_index: usize,
        arrivals: &[Arrival],
        day_start: f64,
        day_end: f64,
    ) -> RunSummary {
        let num_items = arrivals.len();
        let wait_count = arrivals.iter().filter(|a| a.waited()).count();
        let total_wait: f64 = arrivals.iter().map(|a| a.wait_time).sum();
        let avg_wait_time = if num_items == 0 {
            0.0
        } else {
            total_wait / num_items as f64
        };
        let max_wait_time = arrivals.iter().map(|a| a.wait_time).fold(0.0, f64::max);
        let last_arrival_time = arrivals.last().map_or(day_start, |a| a.arrival_time);
        let close_time = arrivals
            .iter()
            .map(|a| a.service_end_time)
            .fold(day_start, f64::max);

        RunSummary {
            run_index,
            num_items,
            wait_count,
            avg_wait_time,
            max_wait_time,
            last_arrival_time,
            close_time,
            minutes_past_close: close_time - day_end,
        }
    }

    pub fn closed_late(&self) -> bool {
        self.minutes_past_close > 0.0
    }
}

/// Aggregate view over every run in a [`ResultsTable`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub num_runs: usize,
    pub mean_items: f64,
    pub min_items: usize,
    pub max_items: usize,
    pub mean_wait_count: f64,
    pub mean_avg_wait_time: f64,
    /// Share of runs in which at least one arrival waited
    pub share_runs_with_wait: f64,
    /// Share of runs whose last service ended after closing
    pub share_runs_closed_late: f64,
    pub mean_minutes_past_close: f64,
}

/// Append-only record of every simulated day, in run order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsTable {
    rows: Vec<RunSummary>,
}

impl ResultsTable {
    pub fn new() -> ResultsTable {
        ResultsTable { rows: Vec::new() }
    }

    pub(crate) fn extend(&mut self, rows: Vec<RunSummary>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RunSummary] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunSummary> {
        self.rows.iter()
    }

    pub fn get(&self, run_index: usize) -> Option<&RunSummary> {
        self.rows.get(run_index)
    }

    pub fn last(&self) -> Option<&RunSummary> {
        self.rows.last()
    }

    /// Aggregate statistics, `None` before the first run
    pub fn summary(&self) -> Option<TableSummary> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;

        let items: Vec<usize> = self.rows.iter().map(|r| r.num_items).collect();
        let mean_items = items.iter().sum::<usize>() as f64 / n;
        let min_items = items.iter().copied().min().unwrap_or(0);
        let max_items = items.iter().copied().max().unwrap_or(0);

        let mean_wait_count = self.rows.iter().map(|r| r.wait_count).sum::<usize>() as f64 / n;
        let mean_avg_wait_time = self.rows.iter().map(|r| r.avg_wait_time).sum::<f64>() / n;
        let share_runs_with_wait = self.rows.iter().filter(|r| r.wait_count > 0).count() as f64 / n;
        let share_runs_closed_late = self.rows.iter().filter(|r| r.closed_late()).count() as f64 / n;
        let mean_minutes_past_close =
            self.rows.iter().map(|r| r.minutes_past_close).sum::<f64>() / n;

        Some(TableSummary {
            num_runs: self.rows.len(),
            mean_items,
            min_items,
            max_items,
            mean_wait_count,
            mean_avg_wait_time,
            share_runs_with_wait,
            share_runs_closed_late,
            mean_minutes_past_close,
        })
    }
}

impl<'a> IntoIterator for &'a ResultsTable {
    type Item = &'a RunSummary;
    type IntoIter = std::slice::Iter<'a, RunSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>5} {:>9} {:>10} {:>13} {:>10} {:>18}",
            "run", "num_items", "wait_count", "avg_wait_time", "close_time", "minutes_past_close"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>5} {:>9} {:>10} {:>13.2} {:>10} {:>18.2}",
                row.run_index,
                row.num_items,
                row.wait_count,
                row.avg_wait_time,
                format_clock(row.close_time),
                row.minutes_past_close
            )?;
        }
        Ok(())
    }
}
