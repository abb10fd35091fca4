//! Simulate a month of clinic days and print the results table
//!
//! Run with:
//!   RUST_LOG=queue_sim=debug cargo run --example clinic_day -p queue_sim

use queue_sim::parallel::simple_progress_reporter;
use queue_sim::{QueueSimulator, SimResult, SimulationConfig};

fn main() -> SimResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Clinic Queue Simulation ===\n");

    let config = SimulationConfig::clinic();
    println!(
        "{} doctors, a patient every {} minutes, {}:00-{}:00, appointments {}-{} minutes",
        config.num_queues,
        config.rate,
        config.day_start_hour,
        config.day_end_hour,
        config.appt_low,
        config.appt_high
    );

    let mut sim = QueueSimulator::with_seed(config, 42)?;
    sim.run_simulation(10)?;
    sim.run_simulation_parallel(20, Some(4))?;

    println!("\n{}", sim.results());

    if let Some(summary) = sim.results().summary() {
        println!("Runs: {}", summary.num_runs);
        println!(
            "Patients per day: {:.1} [{}, {}]",
            summary.mean_items, summary.min_items, summary.max_items
        );
        println!("Patients waiting per day: {:.1}", summary.mean_wait_count);
        println!("Average wait: {:.2} minutes", summary.mean_avg_wait_time);
        println!(
            "Days with a wait: {:.0}%",
            summary.share_runs_with_wait * 100.0
        );
        println!(
            "Days closing late: {:.0}% (mean {:.1} minutes past close)",
            summary.share_runs_closed_late * 100.0,
            summary.mean_minutes_past_close
        );
    }

    // A busier clinic with a single doctor, run through the raw parallel runner
    println!("\n=== Single doctor, 100 days ===");
    let single = QueueSimulator::with_seed(SimulationConfig::new(1, 10.0, 9, 16, 5.0, 21.0)?, 7)?;
    let late_days = queue_sim::parallel::ParallelRunner::new(100, |run_index| {
        single.simulate_day(run_index).summary.closed_late()
    })
    .progress(simple_progress_reporter(25))
    .run()
    .into_iter()
    .filter(|r| matches!(r, Ok(true)))
    .count();
    println!("Closed late on {}/100 days", late_days);

    Ok(())
}
