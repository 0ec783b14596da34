use crate::Time;
use std::cell::RefCell;
use std::rc::Rc;

/// Exposes the scheduled firing time of an event.
///
/// The time must not change while the event is queued; the queue never
/// calls this after an event has been linked into a bucket other than to
/// read it back, so a caller-side mutation while queued would silently
/// desynchronise the event from its bucket.
pub trait Scheduled {
    fn time(&self) -> Time;
}

/// Exposes the intrusive "next" link the queue threads through events that
/// land in the same calendar bucket.
///
/// A queued event is held by the queue (and by any caller-retained clone)
/// as an `Rc<Self>`; [`EventList::remove`](crate::EventList::remove)
/// identifies an event by pointer identity (`Rc::ptr_eq`), not by value, so
/// distinct events that compare equal by time or payload are never
/// confused with one another.
pub trait Linked: Sized {
    /// The storage for the link. Implementors typically add a
    /// `RefCell<Option<Rc<Self>>>` field and return a reference to it.
    fn link(&self) -> &RefCell<Option<Rc<Self>>>;

    /// Hardware prefetch hint for an event about to be visited. Defaults
    /// to a no-op; implementors on real hardware may issue a prefetch
    /// instruction for the payload here.
    fn prefetch(&self) {}
}

/// A ready-made event node: a time, a caller payload, and the link slot
/// the queue needs.
///
/// Most callers can push `Rc::new(Event::new(time, payload))` rather than
/// implementing [`Scheduled`] and [`Linked`] on their own type.
pub struct Event<T> {
    time: Time,
    payload: T,
    link: RefCell<Option<Rc<Event<T>>>>,
}

impl<T> Event<T> {
    pub fn new(time: Time, payload: T) -> Self {
        Self {
            time,
            payload,
            link: RefCell::new(None),
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T> Scheduled for Event<T> {
    fn time(&self) -> Time {
        self.time
    }
}

impl<T> Linked for Event<T> {
    fn link(&self) -> &RefCell<Option<Rc<Event<T>>>> {
        &self.link
    }
}
