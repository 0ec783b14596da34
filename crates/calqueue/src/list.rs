use crate::event::{Linked, Scheduled};
use crate::Time;
use std::rc::Rc;

/// A singly-linked list of events sharing one calendar bucket, kept sorted
/// by non-decreasing time.
///
/// There is no sentinel node; an empty list is represented by a `None`
/// head. The list never allocates: nodes are the caller's own `Rc<E>`
/// handles, linked through the `link` field each `E` exposes via
/// [`Linked`].
pub struct EventList<E: Scheduled + Linked> {
    head: Option<Rc<E>>,
}

impl<E: Scheduled + Linked> EventList<E> {
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Whether the list holds no events.
    pub fn empty(&self) -> bool {
        self.head.is_none()
    }

    /// The time of the head event.
    ///
    /// Requires the list to be non-empty; checking `empty()` first is the
    /// caller's responsibility, as with the rest of this crate's hot-path
    /// operations.
    pub fn min_time(&self) -> Time {
        self.head
            .as_ref()
            .expect("min_time called on an empty EventList")
            .time()
    }

    /// Issues the head event's prefetch hint, if any, without removing it.
    pub(crate) fn prefetch_head(&self) {
        if let Some(head) = &self.head {
            head.prefetch();
        }
    }

    /// Inserts `e` into the sorted list.
    ///
    /// If `e`'s time is less than or equal to the current head's time, `e`
    /// becomes the new head — this is an intentional bias that makes
    /// repeated equal-time pushes at the front of an otherwise-empty
    /// window LIFO with respect to one another, even though ties deeper in
    /// the list are FIFO (a new event is inserted after all
    /// strictly-earlier-or-equal entries it walks past). See the crate's
    /// `DESIGN.md` for why this asymmetry is preserved rather than
    /// "fixed".
    pub fn push(&mut self, e: Rc<E>) {
        debug_assert!(!self.contains(&e), "event is already queued");

        let replace_head = match &self.head {
            None => true,
            Some(head) => e.time() <= head.time(),
        };

        if replace_head {
            *e.link().borrow_mut() = self.head.take();
            self.head = Some(e);
            return;
        }

        let mut prev = Rc::clone(self.head.as_ref().unwrap());
        loop {
            let next = prev.link().borrow().clone();
            match next {
                Some(n) if n.time() <= e.time() => {
                    prev = n;
                }
                Some(n) => {
                    *e.link().borrow_mut() = Some(n);
                    *prev.link().borrow_mut() = Some(e);
                    return;
                }
                None => {
                    *prev.link().borrow_mut() = Some(e);
                    return;
                }
            }
        }
    }

    /// Removes and returns the head event, or `None` if the list is empty.
    pub fn pop(&mut self) -> Option<Rc<E>> {
        let head = self.head.take()?;
        self.head = head.link().borrow_mut().take();
        Some(head)
    }

    /// Unlinks `e` if it is present, identified by pointer identity.
    /// Returns whether it was found.
    pub fn remove(&mut self, e: &Rc<E>) -> bool {
        match &self.head {
            None => false,
            Some(head) if Rc::ptr_eq(head, e) => {
                self.head = head.link().borrow_mut().take();
                true
            }
            Some(head) => {
                let mut prev = Rc::clone(head);
                loop {
                    let next = prev.link().borrow().clone();
                    match next {
                        None => return false,
                        Some(n) if Rc::ptr_eq(&n, e) => {
                            let after = n.link().borrow_mut().take();
                            *prev.link().borrow_mut() = after;
                            return true;
                        }
                        // Always advance on a miss: a version of this scan
                        // that re-examined `prev` without moving forward
                        // would never terminate on a list that doesn't
                        // contain `e`.
                        Some(n) => prev = n,
                    }
                }
            }
        }
    }

    fn contains(&self, e: &Rc<E>) -> bool {
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            if Rc::ptr_eq(&node, e) {
                return true;
            }
            cursor = node.link().borrow().clone();
        }
        false
    }
}

impl<E: Scheduled + Linked> Default for EventList<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropping a long chain by relying on `Rc<E>`'s recursive `Drop` would
/// overflow the stack for bucket lists holding millions of events,
/// something this queue is explicitly sized for. Unlink iteratively
/// instead so only the final owning `Rc` for each node is ever dropped at
/// a time.
impl<E: Scheduled + Linked> Drop for EventList<E> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            cursor = node.link().borrow_mut().take();
        }
    }
}
