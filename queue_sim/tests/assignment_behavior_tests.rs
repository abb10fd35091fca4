// Given-When-Then tests for earliest-free-server assignment
// Arrivals are built by hand so every wait and end time is known exactly

use queue_sim::{Arrival, ServerPool, SimError};

const OPEN: f64 = 540.0; // 09:00

fn arrival(id: usize, t: f64, service: f64) -> Arrival {
    Arrival::new(id, 0.0, t, service)
}

#[test]
fn given_idle_servers_when_arrivals_tie_then_lowest_index_serves_first() {
    // GIVEN: Three idle servers, all free at opening
    let mut servers = ServerPool::new(3, OPEN).unwrap();

    // WHEN: Three arrivals come in before anyone finishes
    let mut day = vec![
        arrival(0, 541.0, 20.0),
        arrival(1, 542.0, 20.0),
        arrival(2, 543.0, 20.0),
    ];
    servers.assign_all(&mut day);

    // THEN: Servers are used in index order
    let queues: Vec<Option<usize>> = day.iter().map(|a| a.assigned_queue).collect();
    assert_eq!(queues, vec![Some(0), Some(1), Some(2)]);

    // THEN: Nobody waits
    assert!(day.iter().all(|a| a.wait_time == 0.0));
}

#[test]
fn given_all_servers_busy_when_arrival_comes_then_waits_for_earliest() {
    // GIVEN: Two servers busy until 560 and 555
    let mut servers = ServerPool::new(2, OPEN).unwrap();
    let mut busy = vec![arrival(0, 540.0, 20.0), arrival(1, 540.0, 15.0)];
    servers.assign_all(&mut busy);
    assert_eq!(servers.free_times(), &[560.0, 555.0]);

    // WHEN: Arrival at 550 needing 10 minutes
    let mut late = arrival(2, 550.0, 10.0);
    servers.assign(&mut late);

    // THEN: Goes to server 1 (free at 555) after a 5 minute wait
    assert_eq!(late.assigned_queue, Some(1));
    assert_eq!(late.wait_time, 5.0);
    assert_eq!(late.service_start_time, 555.0);
    assert_eq!(late.service_end_time, 565.0);
    assert!(late.waited());

    // THEN: Server 1 is now booked until the end of that service
    assert_eq!(servers.free_times(), &[560.0, 565.0]);
}

#[test]
fn given_equal_free_times_after_work_when_arrival_comes_then_lowest_index_wins() {
    // GIVEN: Both servers become free at exactly 560
    let mut servers = ServerPool::new(2, OPEN).unwrap();
    let mut busy = vec![arrival(0, 540.0, 20.0), arrival(1, 545.0, 15.0)];
    servers.assign_all(&mut busy);
    assert_eq!(servers.free_times(), &[560.0, 560.0]);

    // WHEN: Arrival at 550 must wait
    let mut next = arrival(2, 550.0, 5.0);
    servers.assign(&mut next);

    // THEN: Server 0 takes it
    assert_eq!(next.assigned_queue, Some(0));
    assert_eq!(next.wait_time, 10.0);
}

#[test]
fn given_single_server_when_backlog_builds_then_waits_accumulate() {
    // GIVEN: One server, arrivals every 10 minutes needing 15 each
    let mut servers = ServerPool::new(1, OPEN).unwrap();
    let mut day: Vec<Arrival> = (0..4)
        .map(|i| arrival(i, OPEN + 10.0 * i as f64, 15.0))
        .collect();

    // WHEN: The day is assigned
    servers.assign_all(&mut day);

    // THEN: Each arrival waits 5 minutes longer than the previous one
    let waits: Vec<f64> = day.iter().map(|a| a.wait_time).collect();
    assert_eq!(waits, vec![0.0, 5.0, 10.0, 15.0]);

    // THEN: Service is back to back
    for pair in day.windows(2) {
        assert_eq!(pair[1].service_start_time, pair[0].service_end_time);
    }
    assert_eq!(servers.free_times(), &[600.0]);
}

#[test]
fn given_gap_longer_than_service_when_next_arrives_then_no_wait() {
    // GIVEN: Server finishes the first arrival at 550
    let mut servers = ServerPool::new(1, OPEN).unwrap();
    let mut first = arrival(0, 540.0, 10.0);
    servers.assign(&mut first);

    // WHEN: Next arrival comes at 580
    let mut second = arrival(1, 580.0, 10.0);
    servers.assign(&mut second);

    // THEN: Served on arrival, server idle time is not carried over
    assert_eq!(second.wait_time, 0.0);
    assert_eq!(second.service_start_time, 580.0);
    assert_eq!(second.service_end_time, 590.0);
}

#[test]
fn given_used_pool_when_reset_then_next_day_starts_idle() {
    // GIVEN: A pool that worked a full day
    let mut servers = ServerPool::new(2, OPEN).unwrap();
    let mut day = vec![arrival(0, 900.0, 120.0), arrival(1, 950.0, 30.0)];
    servers.assign_all(&mut day);

    // WHEN: Reset for the next day
    servers.reset(OPEN);

    // THEN: First arrival of the new day goes to server 0 without waiting
    let mut morning = arrival(0, 545.0, 10.0);
    servers.assign(&mut morning);
    assert_eq!(morning.assigned_queue, Some(0));
    assert_eq!(morning.wait_time, 0.0);
}

#[test]
fn given_no_servers_when_pool_built_then_rejected() {
    // GIVEN/WHEN: A pool with zero servers is requested
    let result = ServerPool::new(0, OPEN);

    // THEN: Construction fails instead of silently dropping arrivals
    assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));

    // THEN: A single-server pool always has somewhere to send work
    let servers = ServerPool::new(1, OPEN).unwrap();
    assert_eq!(servers.num_queues(), 1);
    assert_eq!(servers.earliest(), 0);
}
