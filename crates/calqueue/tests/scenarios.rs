use calqueue::{DynamicQueue, Event};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

fn push_all(queue: &mut DynamicQueue<Event<()>>, times: &[u64]) {
    for &t in times {
        queue.push(Rc::new(Event::new(t, ())));
    }
}

fn pop_all_times(queue: &mut DynamicQueue<Event<()>>) -> Vec<u64> {
    let mut out = vec![];
    while let Some(e) = queue.pop() {
        out.push(e.time());
    }
    out
}

#[test]
fn linear_schedule_pops_in_sorted_order() {
    let mut q = DynamicQueue::new(0, 0).unwrap();
    push_all(&mut q, &[3, 1, 4, 1, 5, 9, 2, 6, 5, 3]);
    k9::assert_equal!(
        pop_all_times(&mut q),
        vec![1, 1, 2, 3, 3, 4, 5, 5, 6, 9]
    );
}

#[test]
fn resize_up_grows_bins_while_keeping_pop_order_sorted() {
    let mut q = DynamicQueue::new(0, 0).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let t = rng.gen_range(0..=1_000_000u64);
        q.push(Rc::new(Event::new(t, ())));
    }

    let mut grew = false;
    let mut last = 0u64;
    let mut count = 0;
    while let Some(e) = q.pop() {
        assert!(e.time() >= last, "pop order regressed");
        last = e.time();
        count += 1;
        if q.num_bins() > 2 {
            grew = true;
        }
    }
    k9::assert_equal!(count, 1000);
    k9::assert_equal!(grew, true);
}

#[test]
fn empty_queue_pops_none() {
    let mut q: DynamicQueue<Event<()>> = DynamicQueue::new(0, 0).unwrap();
    k9::assert_equal!(q.pop().is_none(), true);
    k9::assert_equal!(q.num_events(), 0);
}

/// Property: pushing a batch of events with non-decreasing insertion
/// order and popping them all back out yields a non-decreasing,
/// multiset-preserving sequence, for a range of random workloads.
#[test]
fn random_workloads_preserve_multiset_and_order() {
    let mut rng = StdRng::seed_from_u64(7);

    for trial in 0..20 {
        let mut q = DynamicQueue::new(0, rng.gen_range(0..4)).unwrap();
        let n = rng.gen_range(0..200);
        let mut pushed: Vec<u64> = (0..n).map(|_| rng.gen_range(0..5000u64)).collect();
        for &t in &pushed {
            q.push(Rc::new(Event::new(t, ())));
        }

        let mut popped = vec![];
        let mut last = 0u64;
        while let Some(e) = q.pop() {
            assert!(
                e.time() >= last,
                "trial {trial}: pop order regressed at {}",
                e.time()
            );
            last = e.time();
            popped.push(e.time());
        }

        pushed.sort_unstable();
        popped.sort_unstable();
        k9::assert_equal!(pushed, popped);
    }
}

/// Property: removing an event before it is popped leaves the remaining
/// pop order and event count unaffected by its presence.
#[test]
fn remove_before_pop_is_transparent() {
    let mut q = DynamicQueue::new(0, 0).unwrap();
    let kept: Vec<_> = [1u64, 2, 4, 4, 7]
        .into_iter()
        .map(|t| {
            let e = Rc::new(Event::new(t, ()));
            q.push(Rc::clone(&e));
            e
        })
        .collect();
    let doomed = Rc::new(Event::new(3, ()));
    q.push(Rc::clone(&doomed));

    k9::assert_equal!(q.num_events(), 6);
    k9::assert_equal!(q.remove(&doomed), true);
    k9::assert_equal!(q.num_events(), 5);
    k9::assert_equal!(q.remove(&doomed), false);

    let times = pop_all_times(&mut q);
    let mut expected: Vec<u64> = kept.iter().map(|e| e.time()).collect();
    expected.sort_unstable();
    k9::assert_equal!(times, expected);
}

/// Property: the event stream produced by a workload is identical whether
/// or not resizes occur. We force early resizes with a tiny initial
/// geometry and compare against a run sized generously enough that it
/// never needs to resize.
#[test]
fn resize_is_observationally_transparent() {
    let mut rng = StdRng::seed_from_u64(99);
    let times: Vec<u64> = (0..500).map(|_| rng.gen_range(0..20_000u64)).collect();

    let mut small = DynamicQueue::new(0, 0).unwrap();
    push_all(&mut small, &times);
    let from_small = pop_all_times(&mut small);

    let mut large = DynamicQueue::new(0, 12).unwrap();
    push_all(&mut large, &times);
    let from_large = pop_all_times(&mut large);

    k9::assert_equal!(from_small, from_large);
}
