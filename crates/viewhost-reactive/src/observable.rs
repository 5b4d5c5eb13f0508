#![forbid(unsafe_code)]

//! Version-tracked observable values.
//!
//! An [`Observable<T>`] is a cheap-to-clone handle to a shared value. Every
//! clone sees the same value and the same subscriber list.
//!
//! # Usage
//!
//! ```
//! use viewhost_reactive::Observable;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = Observable::new(0);
//! let seen = Rc::new(Cell::new(0));
//! let s = Rc::clone(&seen);
//! let _sub = count.subscribe(move |v| s.set(*v));
//!
//! count.set(5);
//! assert_eq!(seen.get(), 5);
//! ```
//!
//! # Failure Modes
//!
//! - Subscriber panic: propagates to the caller of `set()`; remaining
//!   subscribers for that cycle are skipped.
//! - Subscription dropped mid-cycle: the callback may still run for the
//!   cycle already in progress, never for a later one.
//! - Subscriber sets a new value mid-cycle: the nested cycle notifies every
//!   subscriber with the newer value and the outer cycle stops, so no
//!   subscriber receives a superseded value after a newer one.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::batch;

type Callback<T> = dyn Fn(&T);

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, version-tracked value with change notification.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not call `set()` on this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }

        if batch::is_batching() {
            let this = self.clone();
            batch::defer(self.key(), move || this.notify());
        } else {
            self.notify();
        }
    }

    /// Mutate a copy of the value in place, then `set()` it.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Register `callback` to run after every value change.
    ///
    /// The callback is not invoked for the current value. Dropping the
    /// returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription::new(strong)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Whether two handles share the same underlying value.
    #[must_use]
    pub fn same_source(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn key(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    fn notify(&self) {
        let (value, version, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), inner.version, callbacks)
        };
        for callback in callbacks {
            // A newer value has its own cycle (nested or batched).
            if self.inner.borrow().version != version {
                tracing::trace!("superseded during notification, stopping cycle");
                break;
            }
            callback(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Holds the only strong reference to the callback; the source keeps a weak
/// one. Dropping the guard therefore unsubscribes. A `Subscription` can also
/// wrap several inner guards (see [`Subscription::merge`]).
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn new<G: Any>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }

    /// A subscription that holds nothing.
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Combine several subscriptions into one guard.
    ///
    /// Inner subscriptions are released in order when the result drops.
    pub fn merge(subscriptions: Vec<Subscription>) -> Self {
        Self::new(subscriptions)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_and_set() {
        let obs = Observable::new(1);
        assert_eq!(obs.get(), 1);
        obs.set(2);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn version_bumps_only_on_change() {
        let obs = Observable::new("a".to_string());
        assert_eq!(obs.version(), 0);
        obs.set("a".to_string());
        assert_eq!(obs.version(), 0);
        obs.set("b".to_string());
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_value_does_not_notify() {
        let obs = Observable::new(7);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));

        obs.set(7);
        assert_eq!(hits.get(), 0);
        obs.set(8);
        obs.set(8);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscribers_notified_in_registration_order() {
        let obs = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let _a = obs.subscribe(move |_| o1.borrow_mut().push("a"));
        let o2 = Rc::clone(&order);
        let _b = obs.subscribe(move |_| o2.borrow_mut().push("b"));

        obs.set(1);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| s.set(*v));

        obs.set(1);
        drop(sub);
        obs.set(2);
        assert_eq!(seen.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_read_its_source() {
        let obs = Observable::new(0);
        let probe = obs.clone();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |_| s.set(probe.get() * 10));

        obs.set(3);
        assert_eq!(seen.get(), 30);
    }

    #[test]
    fn callback_may_write_its_source() {
        let obs = Observable::new(0);
        let writer = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                writer.set(v + 1);
            }
        });

        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn later_subscribers_never_see_value_superseded_mid_cycle() {
        let obs = Observable::new(0);
        let normalize = obs.clone();
        let _first = obs.subscribe(move |v| {
            if *v == 1 {
                normalize.set(2);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _later = obs.subscribe(move |v| s.borrow_mut().push(*v));

        obs.set(1);
        assert_eq!(obs.get(), 2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn update_applies_in_place_mutation() {
        let obs = Observable::new(vec![1, 2]);
        obs.update(|v| v.push(3));
        assert_eq!(obs.get(), vec![1, 2, 3]);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new(1);
        let b = a.clone();
        b.set(9);
        assert_eq!(a.get(), 9);
        assert!(a.same_source(&b));
        assert!(!a.same_source(&Observable::new(9)));
    }

    #[test]
    fn merged_subscription_releases_all() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let sub = Subscription::merge(vec![a.subscribe(|_| {}), b.subscribe(|_| {})]);
        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 1);
        drop(sub);
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn debug_shows_value_and_version() {
        let obs = Observable::new(4);
        obs.set(5);
        let debug = format!("{obs:?}");
        assert!(debug.contains("value: 5"));
        assert!(debug.contains("version: 1"));
    }

    mod property {
        use super::*;
        use crate::BatchScope;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn notifications_track_distinct_consecutive_sets(values in proptest::collection::vec(0u8..4, 0..40)) {
                let obs = Observable::new(0u8);
                let seen = Rc::new(RefCell::new(Vec::new()));
                let s = Rc::clone(&seen);
                let _sub = obs.subscribe(move |v| s.borrow_mut().push(*v));

                let mut expected = Vec::new();
                let mut last = 0u8;
                for v in values {
                    obs.set(v);
                    if v != last {
                        expected.push(v);
                        last = v;
                    }
                }
                prop_assert_eq!(obs.version(), expected.len() as u64);
                prop_assert_eq!(&*seen.borrow(), &expected);
            }

            #[test]
            fn clamping_subscriber_hides_out_of_range_values(values in proptest::collection::vec(0u8..20, 1..40), cap in 1u8..10) {
                let obs = Observable::new(0u8);
                let clamp = obs.clone();
                let _first = obs.subscribe(move |v| {
                    if *v > cap {
                        clamp.set(cap);
                    }
                });
                let seen = Rc::new(RefCell::new(Vec::new()));
                let s = Rc::clone(&seen);
                let _later = obs.subscribe(move |v| s.borrow_mut().push(*v));

                for v in values {
                    obs.set(v);
                    prop_assert!(obs.get() <= cap);
                    if let Some(last) = seen.borrow().last() {
                        prop_assert_eq!(*last, obs.get());
                    }
                }
                prop_assert!(seen.borrow().iter().all(|v| *v <= cap));
            }

            #[test]
            fn batch_delivers_final_value_once(values in proptest::collection::vec(0u8..4, 1..20)) {
                let obs = Observable::new(0u8);
                let seen = Rc::new(RefCell::new(Vec::new()));
                let s = Rc::clone(&seen);
                let _sub = obs.subscribe(move |v| s.borrow_mut().push(*v));

                {
                    let _batch = BatchScope::new();
                    for v in &values {
                        obs.set(*v);
                    }
                    prop_assert!(BatchScope::pending() <= 1);
                }
                let changed = values.iter().any(|v| *v != 0);
                let expected: Vec<u8> = if changed { vec![obs.get()] } else { Vec::new() };
                prop_assert_eq!(&*seen.borrow(), &expected);
            }
        }
    }
}
