#![forbid(unsafe_code)]

//! Discrete event streams.
//!
//! A [`Signal<T>`] carries events rather than state: there is no current
//! value, no equality filter, and every [`emit`](Signal::emit) reaches every
//! live subscriber. Signals are not affected by [`BatchScope`](crate::BatchScope).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::observable::Subscription;

type Callback<T> = dyn Fn(&T);

struct SignalInner<T> {
    subscribers: RefCell<Vec<Weak<Callback<T>>>>,
    emitted: Cell<u64>,
}

/// A shared event stream.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("emitted", &self.inner.emitted.get())
            .finish()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    /// Create a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                subscribers: RefCell::new(Vec::new()),
                emitted: Cell::new(0),
            }),
        }
    }

    /// Deliver `value` to every live subscriber, in registration order.
    pub fn emit(&self, value: T) {
        self.inner.emitted.set(self.inner.emitted.get() + 1);
        let callbacks: Vec<Rc<Callback<T>>> = {
            let mut subs = self.inner.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Register `callback` for every subsequent emission.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .subscribers
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription::new(strong)
    }

    /// Whether anyone is currently listening.
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .any(|w| w.strong_count() > 0)
    }

    /// Total number of emissions since creation.
    #[must_use]
    pub fn emission_count(&self) -> u64 {
        self.inner.emitted.get()
    }
}
