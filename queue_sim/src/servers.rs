use serde::Serialize;
use tracing::trace;

use crate::arrivals::Arrival;
use crate::error::{SimError, SimResult};

/// Next-free times of the parallel servers for one day
///
/// Entry `i` means server `i` can start new work at or after that time.
/// A pool always holds at least one server and is reset to opening time
/// before every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerPool {
    free_at: Vec<f64>,
}

impl ServerPool {
    pub fn new(num_queues: usize, day_start: f64) -> SimResult<ServerPool> {
        if num_queues == 0 {
            return Err(SimError::InvalidConfiguration(
                "a server pool needs at least one server".to_string(),
            ));
        }
        Ok(ServerPool {
            free_at: vec![day_start; num_queues],
        })
    }

    pub fn reset(&mut self, day_start: f64) {
        self.free_at.iter_mut().for_each(|t| *t = day_start);
    }

    pub fn num_queues(&self) -> usize {
        self.free_at.len()
    }

    pub fn free_times(&self) -> &[f64] {
        &self.free_at
    }

    /// Index of the earliest-free server, lowest index on ties
    pub fn earliest(&self) -> usize {
        let mut best = 0;
        for (idx, &t) in self.free_at.iter().enumerate().skip(1) {
            if t < self.free_at[best] {
                best = idx;
            }
        }
        best
    }

    /// Hand `arrival` to the earliest-free server and book its service
    ///
    /// Sets the queue, wait, start and end on the arrival and moves the
    /// server's free time to the arrival's end. Arrivals must be assigned in
    /// chronological order.
    pub fn assign(&mut self, arrival: &mut Arrival) {
        let queue = self.earliest();
        let free_at = self.free_at[queue];

        arrival.assigned_queue = Some(queue);
        if free_at <= arrival.arrival_time {
            arrival.wait_time = 0.0;
        } else {
            arrival.wait_time = free_at - arrival.arrival_time;
        }
        arrival.service_start_time = arrival.arrival_time + arrival.wait_time;
        arrival.service_end_time =
            arrival.arrival_time + arrival.wait_time + arrival.service_length;
        self.free_at[queue] = arrival.service_end_time;

        trace!(
            "arrival {} at {:.2} -> queue {} (wait {:.2}, done {:.2})",
            arrival.id, arrival.arrival_time, queue, arrival.wait_time, arrival.service_end_time
        );
    }

    /// Assign a chronological day of arrivals in order
    pub fn assign_all(&mut self, arrivals: &mut [Arrival]) {
        for arrival in arrivals.iter_mut() {
            self.assign(arrival);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(id: usize, t: f64, service: f64) -> Arrival {
        Arrival::new(id, 0.0, t, service)
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let pool = ServerPool::new(4, 540.0).unwrap();
        assert_eq!(pool.earliest(), 0);

        let pool = ServerPool {
            free_at: vec![560.0, 550.0, 550.0, 570.0],
        };
        assert_eq!(pool.earliest(), 1);
    }

    #[test]
    fn empty_pool_rejected() {
        let result = ServerPool::new(0, 540.0);
        assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn idle_server_serves_immediately() {
        let mut pool = ServerPool::new(2, 540.0).unwrap();
        let mut a = arrival(0, 545.0, 10.0);

        pool.assign(&mut a);

        assert_eq!(a.assigned_queue, Some(0));
        assert_eq!(a.wait_time, 0.0);
        assert_eq!(a.service_start_time, 545.0);
        assert_eq!(a.service_end_time, 555.0);
        assert_eq!(pool.free_times(), &[555.0, 540.0]);
    }

    #[test]
    fn busy_servers_make_arrival_wait() {
        let mut pool = ServerPool::new(1, 540.0).unwrap();
        let mut first = arrival(0, 540.0, 15.0);
        let mut second = arrival(1, 545.0, 15.0);

        pool.assign(&mut first);
        pool.assign(&mut second);

        assert_eq!(second.assigned_queue, Some(0));
        assert_eq!(second.wait_time, 10.0);
        assert_eq!(second.service_start_time, 555.0);
        assert_eq!(second.service_end_time, 570.0);
        assert_eq!(pool.free_times(), &[570.0]);
    }

    #[test]
    fn load_spreads_to_earliest_free_server() {
        let mut pool = ServerPool::new(2, 540.0).unwrap();
        let mut day = vec![
            arrival(0, 541.0, 30.0),
            arrival(1, 542.0, 5.0),
            arrival(2, 543.0, 5.0),
            arrival(3, 544.0, 5.0),
        ];

        pool.assign_all(&mut day);

        let queues: Vec<Option<usize>> = day.iter().map(|a| a.assigned_queue).collect();
        assert_eq!(queues, vec![Some(0), Some(1), Some(1), Some(1)]);
        // second lands at 542 on idle server 1, third waits until 547, fourth until 552
        assert_eq!(day[2].wait_time, 4.0);
        assert_eq!(day[3].wait_time, 8.0);
        for a in &day {
            assert_eq!(a.service_end_time, a.arrival_time + a.wait_time + a.service_length);
        }
    }

    #[test]
    fn arrival_exactly_at_free_time_does_not_wait() {
        let mut pool = ServerPool::new(1, 540.0).unwrap();
        let mut first = arrival(0, 540.0, 10.0);
        let mut second = arrival(1, 550.0, 10.0);

        pool.assign(&mut first);
        pool.assign(&mut second);

        assert_eq!(second.wait_time, 0.0);
        assert!(!second.waited());
    }

    #[test]
    fn reset_restores_opening_time() {
        let mut pool = ServerPool::new(3, 540.0).unwrap();
        let mut a = arrival(0, 600.0, 10.0);
        pool.assign(&mut a);

        pool.reset(540.0);

        assert_eq!(pool.free_times(), &[540.0, 540.0, 540.0]);
    }
}
