use crate::core::CalendarCore;
use crate::error::CalendarQueueError;
use crate::event::{Linked, Scheduled};
use crate::Time;
use std::rc::Rc;

/// The minimum bin-size log this queue will ever resize down to: a bin
/// size of `2^0 = 1`, i.e. one time unit per bucket.
const MIN_LOG_BIN_SIZE: i32 = 0;

/// The minimum bucket-count log this queue will ever resize down to: two
/// buckets. The distilled spec's "minimum-sized geometry" boundary test
/// requires `log_num_bins = 1` to keep working, so that is the floor here
/// rather than zero.
const MIN_LOG_NUM_BINS: i32 = 1;

/// A [`CalendarCore`] wrapped with auto-tuning geometry.
///
/// `DynamicQueue` meters every pop (how many empty/future buckets the
/// cursor had to skip, how many future-year events it saw along the way)
/// and, once every `num_bins` pops, decides whether the current geometry
/// still keeps roughly two live events per bucket near "now". When it
/// doesn't, the wrapper builds a fresh [`CalendarCore`] with adjusted
/// `log_bin_size`/`log_num_bins`, migrates every event across via
/// [`CalendarCore::consume`], and swaps it in. This happens transparently
/// to callers: the popped event order is identical to what a
/// never-resized core of any single fixed geometry would have produced.
pub struct DynamicQueue<E: Scheduled + Linked> {
    core: CalendarCore<E>,
    pop_probe_len_sum: u64,
    pop_future_event_sum: u64,
    pop_counter: u32,
}

impl<E: Scheduled + Linked> DynamicQueue<E> {
    /// Creates a queue starting at `start_time`, sized for roughly
    /// `2^init_log_num_events` concurrently-live events.
    ///
    /// Internally this builds a [`CalendarCore`] with `log_bin_size = 0`
    /// and `log_num_bins = init_log_num_events + 1`.
    pub fn new(start_time: Time, init_log_num_events: u32) -> Result<Self, CalendarQueueError> {
        let log_num_bins = init_log_num_events + 1;
        let core = CalendarCore::new(0, log_num_bins, start_time)?;
        Ok(Self {
            core,
            pop_probe_len_sum: 0,
            pop_future_event_sum: 0,
            pop_counter: 0,
        })
    }

    /// As [`DynamicQueue::new`], but panics instead of returning an error.
    ///
    /// Useful for the common case of small, caller-controlled hints where
    /// the geometry is known by inspection to be representable; see
    /// `DESIGN.md` for why construction is the one fallible operation in
    /// this crate's surface.
    pub fn new_unchecked(start_time: Time, init_log_num_events: u32) -> Self {
        Self::new(start_time, init_log_num_events)
            .expect("requested initial calendar queue geometry does not fit the time type")
    }

    /// Inserts `e`, returning the new total number of queued events.
    pub fn push(&mut self, e: Rc<E>) -> u64 {
        self.core.push(e);
        self.core.num_events()
    }

    /// Pops the time-minimum event, or `None` if the queue is empty.
    ///
    /// Every `num_bins` pops this also runs the resize check and clears
    /// the statistics accumulators, regardless of whether a resize
    /// occurred.
    pub fn pop(&mut self) -> Option<Rc<E>> {
        let popped = self
            .core
            .pop(&mut self.pop_probe_len_sum, &mut self.pop_future_event_sum);

        self.pop_counter += 1;
        if self.pop_counter == self.core.num_bins() {
            self.maybe_resize();
            self.pop_probe_len_sum = 0;
            self.pop_future_event_sum = 0;
            self.pop_counter = 0;
        }

        popped
    }

    /// Unlinks `e`, returning whether it was found.
    pub fn remove(&mut self, e: &Rc<E>) -> bool {
        self.core.remove(e)
    }

    pub fn num_events(&self) -> u64 {
        self.core.num_events()
    }

    pub fn current_time(&self) -> Time {
        self.core.current_time()
    }

    /// Current number of buckets. Exposed mainly so tests and callers can
    /// observe that a resize happened.
    pub fn num_bins(&self) -> u32 {
        self.core.num_bins()
    }

    pub fn log_bin_size(&self) -> u32 {
        self.core.log_bin_size()
    }

    pub fn log_num_bins(&self) -> u32 {
        self.core.log_num_bins()
    }

    fn maybe_resize(&mut self) {
        let probe_sum = self.pop_probe_len_sum;
        let future_sum = self.pop_future_event_sum;
        let log_num_bins = self.core.log_num_bins();
        let log_bin_size = self.core.log_bin_size();

        // `P/B` targets a probe length of ~2 per pop, tuned by changing
        // bin width. `F/B` targets ~1/2 future-year sightings per pop,
        // tuned by changing year length; since bin width is tuned
        // independently, a year-length change implies a bucket-count
        // change once the bin-size change is subtracted back out.
        let bin_size_log_change = log_adjustment(probe_sum, log_num_bins as i32);
        let year_len_log_change = log_adjustment(future_sum, log_num_bins as i32 - 2);
        let num_bins_log_change = year_len_log_change - bin_size_log_change;

        let new_log_bin_size =
            clamp_log(log_bin_size as i32 + bin_size_log_change, MIN_LOG_BIN_SIZE);
        let new_log_num_bins = clamp_log(
            log_num_bins as i32 + num_bins_log_change,
            MIN_LOG_NUM_BINS,
        );

        if new_log_bin_size == log_bin_size && new_log_num_bins == log_num_bins {
            return;
        }

        let current_time = self.core.current_time();
        let mut new_core = match CalendarCore::new(new_log_bin_size, new_log_num_bins, current_time)
        {
            Ok(core) => core,
            Err(err) => {
                tracing::debug!(?err, "skipping calendar queue resize: geometry unrepresentable");
                return;
            }
        };

        tracing::debug!(
            old_log_bin_size = log_bin_size,
            old_log_num_bins = log_num_bins,
            new_log_bin_size,
            new_log_num_bins,
            probe_sum,
            future_sum,
            "resizing calendar queue"
        );

        new_core.consume(&mut self.core);
        self.core = new_core;
    }
}

fn clamp_log(value: i32, floor: i32) -> u32 {
    value.max(floor) as u32
}

/// Finds the unique `k` such that `1 <= (sum >> (base_shift + k)) <= 3`,
/// by increasing `k` while the quotient exceeds 3 and decreasing it while
/// the quotient is 0. `k` may be negative (and `base_shift + k` may go
/// negative, which is treated as a left shift).
///
/// When `sum` is zero the quotient is zero at every shift, so the search
/// has no natural floor; the open question this resolves is documented in
/// `DESIGN.md`. We return a very small sentinel so the caller's `clamp_log`
/// drives the corresponding geometry log down to its documented floor
/// instead of looping forever.
fn log_adjustment(sum: u64, base_shift: i32) -> i32 {
    if sum == 0 {
        return i32::MIN / 2;
    }

    let mut k = 0i32;
    loop {
        let quotient = shifted(sum, base_shift + k);
        if quotient > 3 {
            k += 1;
        } else if quotient == 0 {
            k -= 1;
        } else {
            return k;
        }
    }
}

/// `sum` shifted right by `shift` (or left, if `shift` is negative),
/// saturating instead of wrapping so callers can compare the result
/// against small thresholds without worrying about overflow.
fn shifted(sum: u64, shift: i32) -> u128 {
    let sum = sum as u128;
    if shift >= 0 {
        if shift >= 128 {
            0
        } else {
            sum >> shift
        }
    } else {
        let left = (-shift) as u32;
        if left > 64 {
            u128::MAX
        } else {
            sum << left
        }
    }
}
