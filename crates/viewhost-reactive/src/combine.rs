#![forbid(unsafe_code)]

//! "Combine latest" over two observables.
//!
//! [`combine_latest`] calls back with the *current* value of both inputs
//! whenever either one changes. Because both values are read at callback
//! time, a consumer never sees a new value of one input paired with a
//! superseded value of the other.
//!
//! Since observables always hold a value, the combination is defined from
//! the moment it is created; it does not fire until an input changes or
//! [`Combined::emit_current`] is called.

use std::cell::RefCell;
use std::rc::Rc;

use crate::observable::{Observable, Subscription};

type PairCallback<A, B> = dyn Fn(&A, &B);

/// A live combination of two observables.
///
/// Dropping it unsubscribes from both inputs.
#[must_use = "dropping a Combined unsubscribes from both inputs"]
pub struct Combined<A: Clone + PartialEq + 'static, B: Clone + PartialEq + 'static> {
    first: Observable<A>,
    second: Observable<B>,
    callback: Rc<PairCallback<A, B>>,
    _subscriptions: [Subscription; 2],
}

impl<A, B> Combined<A, B>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
{
    /// Invoke the callback with the inputs' current values.
    pub fn emit_current(&self) {
        let a = self.first.get();
        let b = self.second.get();
        (self.callback)(&a, &b);
    }
}

impl<A, B> std::fmt::Debug for Combined<A, B>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combined").finish_non_exhaustive()
    }
}

/// Subscribe to both `first` and `second`, calling `callback` with both
/// current values whenever either changes.
pub fn combine_latest<A, B>(
    first: &Observable<A>,
    second: &Observable<B>,
    callback: impl Fn(&A, &B) + 'static,
) -> Combined<A, B>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
{
    let callback: Rc<PairCallback<A, B>> = Rc::new(callback);

    let other = second.clone();
    let cb = Rc::clone(&callback);
    let sub_first = first.subscribe(move |a| {
        let b = other.get();
        cb(a, &b);
    });

    let other = first.clone();
    let cb = Rc::clone(&callback);
    let sub_second = second.subscribe(move |b| {
        let a = other.get();
        cb(&a, b);
    });

    Combined {
        first: first.clone(),
        second: second.clone(),
        callback,
        _subscriptions: [sub_first, sub_second],
    }
}

/// Wrap a pair callback so identical consecutive pairs are dropped.
pub fn distinct_pairs<A, B>(callback: impl Fn(&A, &B) + 'static) -> impl Fn(&A, &B) + 'static
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
{
    let last: RefCell<Option<(A, B)>> = RefCell::new(None);
    move |a, b| {
        {
            let mut last = last.borrow_mut();
            if last.as_ref().is_some_and(|(la, lb)| la == a && lb == b) {
                tracing::trace!("dropping repeated pair");
                return;
            }
            *last = Some((a.clone(), b.clone()));
        }
        callback(a, b);
    }
}
