//! `calqueue` is a dynamic calendar priority queue for discrete-event
//! simulation.
//!
//! Simulation drivers repeatedly [`DynamicQueue::pop`] the event with the
//! smallest scheduled time, process it, and [`DynamicQueue::push`] zero or
//! more new events whose times are greater than or equal to the time just
//! popped. The queue is a bucketed time wheel (a "calendar") with a cursor
//! that advances bucket by bucket, wrapping once per "year"
//! (`bin_size * num_bins` time units), combined with a wrapper that watches
//! how much work each pop does and periodically resizes the wheel to keep
//! roughly two live events per bucket near the current time.
//!
//! The crate does not own or allocate the event payload: callers implement
//! [`Scheduled`] and [`Linked`] on their own event type (or use the
//! provided [`Event<T>`] wrapper) so that the queue can thread an intrusive
//! singly-linked list through events sharing a bucket without a separate
//! node allocation per push.
//!
//! This is a single-threaded, synchronous data structure: there is no
//! blocking, no async support, and no internal synchronisation. Callers
//! wanting parallelism should shard by event key and run independent
//! queues.
//!
//! ```
//! use calqueue::{DynamicQueue, Event, Scheduled};
//! use std::rc::Rc;
//!
//! let mut queue = DynamicQueue::new(0, /* init_log_num_events */ 0).unwrap();
//! queue.push(Rc::new(Event::new(5, "wake up")));
//! queue.push(Rc::new(Event::new(1, "boot")));
//! queue.push(Rc::new(Event::new(9, "shut down")));
//!
//! while let Some(event) = queue.pop() {
//!     println!("t={}: {}", event.time(), event.payload());
//! }
//! ```

mod core;
mod error;
mod event;
mod list;
mod queue;

pub use crate::core::CalendarCore;
pub use crate::error::CalendarQueueError;
pub use crate::event::{Event, Linked, Scheduled};
pub use crate::list::EventList;
pub use crate::queue::DynamicQueue;

/// The time type used throughout the queue.
///
/// Fixed at 64 bits: wide enough for any simulation horizon a calendar
/// queue is suited to, and the type the rest of the workspace uses for
/// wall/simulation time arithmetic.
pub type Time = u64;

/// Bit width of [`Time`], used to validate requested geometries.
pub(crate) const TIME_BITS: u32 = Time::BITS;
