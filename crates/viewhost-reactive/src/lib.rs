#![forbid(unsafe_code)]

//! Reactive primitives for viewhost.
//!
//! This crate provides the change-tracking building blocks the view hosts
//! are wired with:
//!
//! - [`Observable`]: A shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Signal`]: A discrete event stream with no stored value.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Combined`]: The "combine latest" of two observables.
//! - [`BindingScope`]: Owns the subscriptions and guards of one logical owner.
//! - [`SerialHandle`]: Holds at most one guard; replacing it releases the old one.
//! - [`BatchScope`]: RAII guard that defers all `Observable` notifications
//!   until the scope exits.
//!
//! # Architecture
//!
//! Everything here is single-threaded. `Observable<T>` and `Signal<T>` use
//! `Rc<RefCell<..>>` for shared ownership. Subscribers are stored as `Weak`
//! function pointers and cleaned up lazily during notification; the strong
//! side lives in the returned [`Subscription`].
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. No internal borrow is held while a subscriber runs, so callbacks may
//!    read or write the source they are subscribed to.
//! 6. Within a `BatchScope`, values are updated immediately but notifications
//!    are deferred until the outermost scope exits.

pub mod batch;
pub mod combine;
pub mod observable;
pub mod scope;
pub mod signal;

pub use batch::BatchScope;
pub use combine::{Combined, combine_latest, distinct_pairs};
pub use observable::{Observable, Subscription};
pub use scope::{BindingScope, SerialHandle};
pub use signal::Signal;
