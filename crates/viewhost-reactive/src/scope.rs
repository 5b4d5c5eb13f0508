#![forbid(unsafe_code)]

//! Lifetime containers for subscriptions and other RAII guards.
//!
//! A [`BindingScope`] collects everything a logical owner (a host, a view's
//! activation) holds on to, so that releasing the owner releases it all at
//! once. A [`SerialHandle`] holds exactly one replaceable guard.
//!
//! # Invariants
//!
//! 1. Guards are released in reverse registration order on `clear()` or drop.
//! 2. After release, no callbacks held by the scope will fire.
//! 3. `clear()` leaves the scope empty and reusable.
//! 4. Replacing a `SerialHandle`'s guard drops the previous guard after the
//!    new one is installed, and with no internal borrow held.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

use crate::observable::{Observable, Subscription};

/// Collects subscriptions and guards for one logical owner.
pub struct BindingScope {
    guards: Vec<Box<dyn Any>>,
}

impl BindingScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Keep `guard` alive until the scope is cleared or dropped.
    pub fn hold<G: Any>(&mut self, guard: G) -> &mut Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Subscribe to an observable within this scope.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub: Subscription = source.subscribe(callback);
        self.hold(sub)
    }

    /// Number of guards held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Release all guards now, newest first.
    pub fn clear(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("len", &self.guards.len())
            .finish()
    }
}

/// Holds at most one guard at a time.
#[derive(Default)]
pub struct SerialHandle {
    current: RefCell<Option<Box<dyn Any>>>,
}

impl SerialHandle {
    /// Create an empty handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `guard`, then release the previous one.
    pub fn replace<G: Any>(&self, guard: G) {
        let previous = self.current.borrow_mut().replace(Box::new(guard));
        drop(previous);
    }

    /// Release the current guard, if any.
    pub fn clear(&self) {
        let previous = self.current.borrow_mut().take();
        drop(previous);
    }

    /// Whether a guard is installed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.borrow().is_some()
    }
}

impl fmt::Debug for SerialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialHandle")
            .field("is_set", &self.is_set())
            .finish()
    }
}
