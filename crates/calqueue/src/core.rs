use crate::error::CalendarQueueError;
use crate::event::{Linked, Scheduled};
use crate::list::EventList;
use crate::{Time, TIME_BITS};
use std::rc::Rc;

/// A fixed-geometry bucket ring: `2^log_num_bins` buckets, each spanning
/// `2^log_bin_size` time units, for a total "year" of
/// `bin_size * num_bins` time units that the cursor sweeps through before
/// wrapping.
///
/// `CalendarCore` never resizes itself; [`crate::DynamicQueue`] is the
/// layer that observes pop statistics and rebuilds one of these with new
/// geometry when the workload's density drifts.
pub struct CalendarCore<E: Scheduled + Linked> {
    bins: Vec<EventList<E>>,
    log_bin_size: u32,
    log_num_bins: u32,
    num_bins: u32,
    bin_size: Time,
    year_length: Time,
    modulo_mask: Time,
    curr_bin: u32,
    next_year_start: Time,
    last_popped: Time,
    num_events: u64,
}

impl<E: Scheduled + Linked> CalendarCore<E> {
    /// Builds a new core with `2^log_num_bins` buckets each spanning
    /// `2^log_bin_size` time units, with the cursor positioned at
    /// `start_time`.
    pub fn new(
        log_bin_size: u32,
        log_num_bins: u32,
        start_time: Time,
    ) -> Result<Self, CalendarQueueError> {
        let overflow = || CalendarQueueError::GeometryOverflow {
            log_bin_size,
            log_num_bins,
            time_bits: TIME_BITS,
        };

        // `num_bins` is stored as a u32, so log_num_bins must itself fit a
        // u32 shift, independent of the combined check below.
        if log_num_bins >= u32::BITS {
            return Err(overflow());
        }

        let divide_shift = log_bin_size
            .checked_add(log_num_bins)
            .filter(|shift| *shift < TIME_BITS)
            .ok_or_else(overflow)?;

        let bin_size: Time = 1 << log_bin_size;
        let num_bins: u32 = 1 << log_num_bins;
        let year_length: Time = bin_size
            .checked_mul(num_bins as Time)
            .ok_or_else(overflow)?;
        let modulo_mask = year_length - 1;

        let curr_bin = ((start_time & modulo_mask) >> log_bin_size) as u32;
        let next_year_start = ((start_time >> divide_shift) + 1) * year_length;

        let bins = (0..num_bins).map(|_| EventList::new()).collect();

        Ok(Self {
            bins,
            log_bin_size,
            log_num_bins,
            num_bins,
            bin_size,
            year_length,
            modulo_mask,
            curr_bin,
            next_year_start,
            last_popped: start_time,
            num_events: 0,
        })
    }

    fn slot(&self, time: Time) -> u32 {
        ((time & self.modulo_mask) >> self.log_bin_size) as u32
    }

    /// Inserts `e`. Requires `e.time() >= current_time()`; a violation is
    /// a causality bug in the driver, not a recoverable error.
    pub fn push(&mut self, e: Rc<E>) {
        debug_assert!(
            e.time() >= self.last_popped,
            "causality violation: pushed time {} is before current time {}",
            e.time(),
            self.last_popped
        );
        let idx = self.slot(e.time());
        self.bins[idx as usize].push(e);
        self.num_events += 1;
    }

    /// Extracts the time-minimum queueable event, or `None` if the core
    /// holds no events.
    ///
    /// `probe_len` is incremented once per bucket the cursor advances past
    /// before finding the answer; `future_events` is incremented once for
    /// every non-empty bucket encountered whose head belongs to a later
    /// year. Both are accumulators owned by the caller (normally
    /// [`crate::DynamicQueue`]'s resize statistics).
    pub fn pop(&mut self, probe_len: &mut u64, future_events: &mut u64) -> Option<Rc<E>> {
        if self.num_events == 0 {
            return None;
        }

        loop {
            let bin = &mut self.bins[self.curr_bin as usize];
            if !bin.empty() {
                let min_time = bin.min_time();
                if min_time < self.next_year_start {
                    self.last_popped = min_time;
                    self.num_events -= 1;
                    return bin.pop();
                }
                *future_events += 1;
            }

            *probe_len += 1;
            self.curr_bin += 1;
            if self.curr_bin == self.num_bins {
                self.curr_bin = 0;
                self.next_year_start += self.year_length;
                tracing::trace!(
                    next_year_start = self.next_year_start,
                    "calendar queue completed a revolution"
                );
            }

            // The bucket we are about to examine next holds the soonest
            // unseen event; a prefetch hint costs nothing on hardware
            // without one and can hide the pointer chase on hardware with
            // one.
            self.bins[self.curr_bin as usize].prefetch_head();
        }
    }

    /// Unlinks `e`, returning whether it was found. Does not affect
    /// `current_time()`.
    pub fn remove(&mut self, e: &Rc<E>) -> bool {
        let idx = self.slot(e.time());
        let found = self.bins[idx as usize].remove(e);
        if found {
            self.num_events -= 1;
        }
        found
    }

    /// Drains every bucket of `other` directly into `self`, leaving
    /// `other` empty.
    ///
    /// Draining must walk `other`'s bucket array directly rather than
    /// popping through `other`'s own cursor: popping through the cursor
    /// would advance `other.last_popped` and could reorder events relative
    /// to a plain (non-resizing) run.
    pub fn consume(&mut self, other: &mut Self) {
        for bin in other.bins.iter_mut() {
            while let Some(e) = bin.pop() {
                self.push(e);
            }
        }
        other.num_events = 0;
    }

    pub fn current_time(&self) -> Time {
        self.last_popped
    }

    pub fn year_length(&self) -> Time {
        self.year_length
    }

    pub fn log_bin_size(&self) -> u32 {
        self.log_bin_size
    }

    pub fn log_num_bins(&self) -> u32 {
        self.log_num_bins
    }

    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    pub fn num_bins(&self) -> u32 {
        self.num_bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Event;

    fn push(core: &mut CalendarCore<Event<()>>, t: Time) {
        core.push(Rc::new(Event::new(t, ())));
    }

    fn pop_times(core: &mut CalendarCore<Event<()>>) -> Vec<Time> {
        let mut out = vec![];
        let mut probe = 0;
        let mut future = 0;
        while let Some(e) = core.pop(&mut probe, &mut future) {
            out.push(e.time());
        }
        out
    }

    #[test]
    fn minimum_geometry_two_buckets_works() {
        let mut core = CalendarCore::new(0, 1, 0).unwrap();
        for t in [3, 1, 4, 1, 5] {
            push(&mut core, t);
        }
        k9::assert_equal!(pop_times(&mut core), vec![1, 1, 3, 4, 5]);
    }

    #[test]
    fn year_wrap_advances_next_year_start() {
        // log_bin_size = 1, log_num_bins = 2 => bin_size=2, num_bins=4,
        // year_length=8.
        let mut core = CalendarCore::new(1, 2, 0).unwrap();
        for t in [0u64, 7, 8, 15] {
            push(&mut core, t);
        }
        k9::assert_equal!(core.year_length(), 8);

        let mut probe = 0;
        let mut future = 0;
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 0);
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 7);

        k9::assert_equal!(core.next_year_start, 8);
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 8);
        k9::assert_equal!(core.next_year_start, 16);
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 15);
    }

    #[test]
    fn event_exactly_at_next_year_start_is_future() {
        let mut core = CalendarCore::new(1, 2, 0).unwrap();
        // year_length = 8; an event at exactly 8 is next year relative to
        // a cursor still parked on year [0, 8).
        push(&mut core, 8);
        push(&mut core, 3);

        let mut probe = 0;
        let mut future = 0;
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 3);
        k9::assert_equal!(core.pop(&mut probe, &mut future).unwrap().time(), 8);
    }

    #[test]
    fn empty_pop_returns_none() {
        let mut core: CalendarCore<Event<()>> = CalendarCore::new(0, 1, 0).unwrap();
        let mut probe = 0;
        let mut future = 0;
        k9::assert_equal!(core.pop(&mut probe, &mut future).is_none(), true);
        k9::assert_equal!(core.num_events(), 0);
    }

    #[test]
    fn remove_decrements_num_events() {
        let mut core = CalendarCore::new(0, 1, 0).unwrap();
        let e = Rc::new(Event::new(4, ()));
        core.push(Rc::clone(&e));
        k9::assert_equal!(core.num_events(), 1);
        k9::assert_equal!(core.remove(&e), true);
        k9::assert_equal!(core.num_events(), 0);
        k9::assert_equal!(core.remove(&e), false);
    }

    #[test]
    fn consume_migrates_every_event_and_preserves_pop_order() {
        let mut old = CalendarCore::new(0, 1, 0).unwrap();
        for t in [3, 1, 4, 1, 5, 9, 2, 6] {
            push(&mut old, t);
        }

        let mut new = CalendarCore::new(2, 3, old.current_time()).unwrap();
        new.consume(&mut old);

        k9::assert_equal!(old.num_events(), 0);
        k9::assert_equal!(new.num_events(), 8);
        k9::assert_equal!(pop_times(&mut new), vec![1, 1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn geometry_overflowing_time_bits_is_rejected() {
        let err = CalendarCore::<Event<()>>::new(40, 40, 0).unwrap_err();
        match err {
            CalendarQueueError::GeometryOverflow { .. } => {}
        }
    }

    #[test]
    fn log_num_bins_must_fit_a_u32_shift() {
        let err = CalendarCore::<Event<()>>::new(0, 32, 0).unwrap_err();
        match err {
            CalendarQueueError::GeometryOverflow { .. } => {}
        }
    }
}
