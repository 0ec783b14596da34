//! Drives a [`calqueue::DynamicQueue`] with a synthetic discrete-event
//! workload and reports how its geometry adapted.
//!
//! This exists to make the auto-tuning behaviour observable outside of
//! the unit tests: run with `RUST_LOG=debug` to see every resize decision
//! calqueue makes as the workload runs.

use calqueue::{DynamicQueue, Event, Scheduled};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Synthetic discrete-event workload for calqueue")]
struct Opt {
    /// Number of events to push before draining the queue.
    #[arg(long, default_value_t = 50_000)]
    events: u64,

    /// Events are scheduled uniformly over [0, horizon].
    #[arg(long, default_value_t = 1_000_000)]
    horizon: u64,

    /// RNG seed, for a repeatable workload.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// initLogNumEvents passed to DynamicQueue::new.
    #[arg(long, default_value_t = 0)]
    init_log_num_events: u32,

    /// Instead of a one-shot uniform load, seed three events at t=0 and
    /// run a pop/push(t+1) causal refill loop for this many steps.
    #[arg(long)]
    causal_refill_steps: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opt = Opt::parse();
    let mut queue = DynamicQueue::new(0, opt.init_log_num_events)
        .expect("requested geometry does not fit the time type");

    if let Some(steps) = opt.causal_refill_steps {
        run_causal_refill(&mut queue, steps);
    } else {
        run_uniform_load(&mut queue, opt.events, opt.horizon, opt.seed);
    }
}

fn run_uniform_load(queue: &mut DynamicQueue<Event<()>>, events: u64, horizon: u64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let start_bins = queue.num_bins();

    let push_start = Instant::now();
    for _ in 0..events {
        let t = rng.gen_range(0..=horizon);
        queue.push(Rc::new(Event::new(t, ())));
    }
    let push_elapsed = push_start.elapsed();

    let pop_start = Instant::now();
    let mut popped = 0u64;
    let mut last_time = 0u64;
    while let Some(event) = queue.pop() {
        assert!(event.time() >= last_time, "pop order regressed");
        last_time = event.time();
        popped += 1;
    }
    let pop_elapsed = pop_start.elapsed();

    println!("pushed {events} events over horizon [0, {horizon}] (seed={seed})");
    println!("popped {popped} events, last time observed = {last_time}");
    println!("push: {push_elapsed:?}, pop: {pop_elapsed:?}");
    println!(
        "bucket count: {start_bins} -> {} (log_bin_size={}, log_num_bins={})",
        queue.num_bins(),
        queue.log_bin_size(),
        queue.log_num_bins()
    );
}

fn run_causal_refill(queue: &mut DynamicQueue<Event<()>>, steps: u64) {
    for _ in 0..3 {
        queue.push(Rc::new(Event::new(0, ())));
    }

    print!("popped times:");
    for _ in 0..steps {
        let Some(event) = queue.pop() else {
            break;
        };
        print!(" {}", event.time());
        queue.push(Rc::new(Event::new(event.time() + 1, ())));
    }
    println!();
}
