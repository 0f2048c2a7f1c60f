//! Listener bookkeeping shared by every event source in the crate.
//!
//! Stores, preference signals and the in-context [`EventBus`](crate::EventBus)
//! all hand out [`Subscription`]s from a [`ListenerSet`]. Dropping (or calling
//! [`Subscription::detach`] on) the handle removes the registration, so a
//! mount/unmount cycle can never leave dead listeners behind.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A registered callback. Shared so delivery can run on a snapshot.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Ordered registry of listeners for events of type `E`.
///
/// Clones share the same registry.
pub struct ListenerSet<E> {
    inner: Rc<RefCell<Registry<E>>>,
}

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

impl<E: 'static> ListenerSet<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers `listener`, returning the handle that removes it.
    pub fn add(&self, listener: Listener<E>) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                // The listener is dropped after the borrow ends: it may own
                // subscriptions on this same registry.
                let removed = {
                    let mut registry = registry.borrow_mut();
                    registry
                        .entries
                        .iter()
                        .position(|(entry_id, _)| *entry_id == id)
                        .map(|index| registry.entries.remove(index))
                };
                drop(removed);
            }
        })
    }

    /// Delivers `event` to every listener registered at call time, in
    /// registration order.
    ///
    /// Listeners may add or detach registrations while being called; changes
    /// take effect from the next `emit`.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ListenerSet<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.inner.borrow().entries.len())
            .finish()
    }
}

/// Handle to one or more listener registrations.
///
/// The registrations stay active until the handle is detached or dropped.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps a detach action.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A handle with nothing to detach, for sources that never fire.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Combines several handles into one that detaches them all.
    pub fn join(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let subscriptions: Vec<Subscription> = subscriptions.into_iter().collect();
        Self::new(move || {
            for subscription in subscriptions {
                subscription.detach();
            }
        })
    }

    /// Removes the registration now.
    pub fn detach(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Leaves the registration in place for the lifetime of its source.
    pub fn forget(mut self) {
        self.detach.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
