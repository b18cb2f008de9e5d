//! Listener registry with cancelable registrations

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
}

/// A set of callbacks notified with `&T`. Cloning shares the set.
pub struct Listeners<T> {
    inner: Rc<Registry<T>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            inner: Rc::new(Registry {
                next_id: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// subscription is unsubscribed or dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let registry = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Call every listener. Listeners may subscribe or unsubscribe while
    /// being notified; changes apply from the next notification.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Listeners {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Handle for a registered callback. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Subscription {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn empty() -> Subscription {
        Subscription { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_reaches_all_listeners() {
        let listeners = Listeners::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            listeners.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        let b = {
            let seen = seen.clone();
            listeners.subscribe(move |v| seen.borrow_mut().push(("b", *v)))
        };

        listeners.notify(&1);
        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1)]);

        a.unsubscribe();
        listeners.notify(&2);
        assert_eq!(seen.borrow().last(), Some(&("b", 2)));
        assert_eq!(listeners.len(), 1);

        drop(b);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let listeners = Listeners::<()>::new();
        let sub = listeners.subscribe(|_| {});
        drop(listeners);
        sub.unsubscribe();
    }

    #[test]
    fn test_listener_can_unsubscribe_during_notify() {
        let listeners = Listeners::<()>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let sub = {
            let slot = slot.clone();
            let count = count.clone();
            listeners.subscribe(move |_| {
                count.set(count.get() + 1);
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(sub);

        listeners.notify(&());
        listeners.notify(&());
        assert_eq!(count.get(), 1);
    }
}
