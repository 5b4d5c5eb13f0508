#![forbid(unsafe_code)]

//! View activation lifecycle.
//!
//! Activation is the window during which a hosted view may hold live
//! subscriptions and other resources. The state machine has two states and
//! two transitions:
//!
//! ```text
//! Inactive --activate()--> Active --release()--> Inactive
//! ```
//!
//! [`ActivationLifecycle::activate`] returns an [`ActivationHandle`];
//! releasing the handle (explicitly or by dropping it) is the only way back
//! to `Inactive`. Resources registered with
//! [`ActivationLifecycle::when_activated`] are acquired on every activation
//! and released synchronously on every deactivation.
//!
//! # Invariants
//!
//! 1. `activated()` and `deactivated()` fire exactly once per transition and
//!    strictly alternate, starting with `activated()`.
//! 2. Activating an active lifecycle fails with
//!    [`ActivationViolation::AlreadyActive`] and changes nothing.
//! 3. Resources from `when_activated` blocks are released, newest first,
//!    before `deactivated()` fires.
//! 4. A handle belongs to exactly one activation; releasing it after that
//!    activation has ended reports [`ActivationViolation::NotActive`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use viewhost_reactive::{BindingScope, Signal};

use crate::error::{ActivationViolation, ViewError};

type ActivationBlock = dyn Fn(&mut BindingScope);

struct LifecycleInner {
    owner: &'static str,
    active: Cell<bool>,
    generation: Cell<u64>,
    blocks: RefCell<Vec<Rc<ActivationBlock>>>,
    resources: RefCell<BindingScope>,
    activated: Signal<()>,
    deactivated: Signal<()>,
}

/// Activation state for one view.
///
/// Clones share state, so a view can hand a clone to its host while keeping
/// one for its own `when_activated` wiring.
#[derive(Clone)]
pub struct ActivationLifecycle {
    inner: Rc<LifecycleInner>,
}

impl ActivationLifecycle {
    /// Create an inactive lifecycle. `owner` names the view in logs and errors.
    #[must_use]
    pub fn new(owner: &'static str) -> Self {
        Self {
            inner: Rc::new(LifecycleInner {
                owner,
                active: Cell::new(false),
                generation: Cell::new(0),
                blocks: RefCell::new(Vec::new()),
                resources: RefCell::new(BindingScope::new()),
                activated: Signal::new(),
                deactivated: Signal::new(),
            }),
        }
    }

    /// Name of the owning view.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.inner.owner
    }

    /// Whether the lifecycle is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Fires after each `Inactive -> Active` transition.
    #[must_use]
    pub fn activated(&self) -> &Signal<()> {
        &self.inner.activated
    }

    /// Fires after each `Active -> Inactive` transition.
    #[must_use]
    pub fn deactivated(&self) -> &Signal<()> {
        &self.inner.deactivated
    }

    /// Register a block that runs on every activation.
    ///
    /// Whatever the block puts into the scope is held until the activation
    /// ends. Registering while active does not run the block until the next
    /// activation.
    pub fn when_activated(&self, block: impl Fn(&mut BindingScope) + 'static) {
        self.inner.blocks.borrow_mut().push(Rc::new(block));
    }

    /// Enter the active state.
    pub fn activate(&self) -> Result<ActivationHandle, ViewError> {
        let inner = &self.inner;
        if inner.active.get() {
            return Err(ViewError::ActivationProtocolViolation {
                view: inner.owner,
                reason: ActivationViolation::AlreadyActive,
            });
        }

        inner.active.set(true);
        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);

        let blocks: Vec<Rc<ActivationBlock>> = inner.blocks.borrow().clone();
        let mut scope = BindingScope::new();
        for block in blocks {
            block(&mut scope);
        }
        *inner.resources.borrow_mut() = scope;

        tracing::debug!(view = inner.owner, generation, "activated");
        inner.activated.emit(());

        Ok(ActivationHandle {
            binding: Some((self.clone(), generation)),
        })
    }

    fn deactivate(&self, generation: u64) -> Result<(), ViewError> {
        let inner = &self.inner;
        if !inner.active.get() || inner.generation.get() != generation {
            return Err(ViewError::ActivationProtocolViolation {
                view: inner.owner,
                reason: ActivationViolation::NotActive,
            });
        }

        let resources = std::mem::take(&mut *inner.resources.borrow_mut());
        drop(resources);
        inner.active.set(false);

        tracing::debug!(view = inner.owner, generation, "deactivated");
        inner.deactivated.emit(());
        Ok(())
    }
}

impl fmt::Debug for ActivationLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationLifecycle")
            .field("owner", &self.inner.owner)
            .field("active", &self.inner.active.get())
            .field("generation", &self.inner.generation.get())
            .finish()
    }
}

/// Proof of one activation. Releasing it deactivates the view.
///
/// Dropping the handle releases it; use [`release`](Self::release) to
/// observe protocol errors instead of having them logged.
#[must_use = "dropping an ActivationHandle deactivates the view immediately"]
pub struct ActivationHandle {
    binding: Option<(ActivationLifecycle, u64)>,
}

impl ActivationHandle {
    /// A handle for a view that does not support activation.
    pub fn empty() -> Self {
        Self { binding: None }
    }

    /// Whether this handle is the no-op handle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binding.is_none()
    }

    /// Deactivate now.
    pub fn release(mut self) -> Result<(), ViewError> {
        match self.binding.take() {
            Some((lifecycle, generation)) => lifecycle.deactivate(generation),
            None => Ok(()),
        }
    }
}

impl Drop for ActivationHandle {
    fn drop(&mut self) {
        let Some((lifecycle, generation)) = self.binding.take() else {
            return;
        };
        if let Err(error) = lifecycle.deactivate(generation) {
            tracing::error!(%error, "activation handle dropped out of protocol");
            debug_assert!(false, "{error}");
        }
    }
}

impl fmt::Debug for ActivationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some((lifecycle, generation)) => f
                .debug_struct("ActivationHandle")
                .field("owner", &lifecycle.owner())
                .field("generation", generation)
                .finish(),
            None => f.write_str("ActivationHandle(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use viewhost_reactive::Observable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Transition {
        Activated,
        Deactivated,
    }

    fn record(lifecycle: &ActivationLifecycle) -> (Rc<RefCell<Vec<Transition>>>, BindingScope) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scope = BindingScope::new();
        let l = Rc::clone(&log);
        scope.hold(
            lifecycle
                .activated()
                .subscribe(move |_| l.borrow_mut().push(Transition::Activated)),
        );
        let l = Rc::clone(&log);
        scope.hold(
            lifecycle
                .deactivated()
                .subscribe(move |_| l.borrow_mut().push(Transition::Deactivated)),
        );
        (log, scope)
    }

    #[test]
    fn activate_then_release() {
        let lifecycle = ActivationLifecycle::new("probe");
        let (log, _scope) = record(&lifecycle);

        let handle = lifecycle.activate().unwrap();
        assert!(lifecycle.is_active());
        handle.release().unwrap();
        assert!(!lifecycle.is_active());
        assert_eq!(
            *log.borrow(),
            vec![Transition::Activated, Transition::Deactivated]
        );
    }

    #[test]
    fn double_activation_is_reported() {
        let lifecycle = ActivationLifecycle::new("probe");
        let (log, _scope) = record(&lifecycle);
        let _handle = lifecycle.activate().unwrap();

        let err = lifecycle.activate().unwrap_err();
        assert_eq!(
            err,
            ViewError::ActivationProtocolViolation {
                view: "probe",
                reason: ActivationViolation::AlreadyActive,
            }
        );
        assert!(lifecycle.is_active());
        assert_eq!(log.borrow().len(), 1, "failed activation emits nothing");
    }

    #[test]
    fn drop_releases() {
        let lifecycle = ActivationLifecycle::new("probe");
        {
            let _handle = lifecycle.activate().unwrap();
            assert!(lifecycle.is_active());
        }
        assert!(!lifecycle.is_active());
        assert!(lifecycle.activate().is_ok());
    }

    #[test]
    fn when_activated_resources_live_for_one_activation() {
        let lifecycle = ActivationLifecycle::new("probe");
        let source = Observable::new(0);
        let seen = Rc::new(Cell::new(0));

        let src = source.clone();
        let s = Rc::clone(&seen);
        lifecycle.when_activated(move |scope| {
            let s = Rc::clone(&s);
            scope.subscribe(&src, move |v| s.set(*v));
        });

        source.set(1);
        assert_eq!(seen.get(), 0, "not subscribed before activation");

        let handle = lifecycle.activate().unwrap();
        source.set(2);
        assert_eq!(seen.get(), 2);
        assert_eq!(source.subscriber_count(), 1);

        drop(handle);
        source.set(3);
        assert_eq!(seen.get(), 2, "released synchronously on deactivation");
        assert_eq!(source.subscriber_count(), 0);

        let _again = lifecycle.activate().unwrap();
        assert_eq!(source.subscriber_count(), 1, "re-acquired on reactivation");
    }

    #[test]
    fn resources_released_before_deactivated_fires() {
        let lifecycle = ActivationLifecycle::new("probe");
        let source = Observable::new(0);
        let src = source.clone();
        lifecycle.when_activated(move |scope| {
            scope.subscribe(&src, |_| {});
        });

        let probe = source.clone();
        let count_at_deactivate = Rc::new(Cell::new(usize::MAX));
        let c = Rc::clone(&count_at_deactivate);
        let _sub = lifecycle
            .deactivated()
            .subscribe(move |_| c.set(probe.subscriber_count()));

        lifecycle.activate().unwrap().release().unwrap();
        assert_eq!(count_at_deactivate.get(), 0);
    }

    #[test]
    fn empty_handle_is_noop() {
        let handle = ActivationHandle::empty();
        assert!(handle.is_empty());
        assert!(handle.release().is_ok());
    }

    #[test]
    fn reactivation_from_deactivated_callback() {
        let lifecycle = ActivationLifecycle::new("probe");
        let (log, _scope) = record(&lifecycle);
        let slot: Rc<RefCell<Option<ActivationHandle>>> = Rc::new(RefCell::new(None));

        let lc = lifecycle.clone();
        let sl = Rc::clone(&slot);
        let once = Cell::new(true);
        let _sub = lifecycle.deactivated().subscribe(move |_| {
            if once.replace(false) {
                *sl.borrow_mut() = Some(lc.activate().unwrap());
            }
        });

        lifecycle.activate().unwrap().release().unwrap();
        assert!(lifecycle.is_active());
        assert_eq!(
            *log.borrow(),
            vec![
                Transition::Activated,
                Transition::Deactivated,
                Transition::Activated
            ]
        );
        slot.borrow_mut().take();
    }

    proptest! {
        #[test]
        fn transitions_strictly_alternate(ops in proptest::collection::vec(any::<bool>(), 1..40)) {
            let lifecycle = ActivationLifecycle::new("probe");
            let (log, _scope) = record(&lifecycle);
            let mut handle: Option<ActivationHandle> = None;

            for activate in ops {
                if activate {
                    match lifecycle.activate() {
                        Ok(h) => handle = Some(h),
                        Err(_) => prop_assert!(handle.is_some()),
                    }
                } else if let Some(h) = handle.take() {
                    prop_assert!(h.release().is_ok());
                }
            }
            drop(handle);

            let log = log.borrow();
            for pair in log.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
            if let Some(first) = log.first() {
                prop_assert_eq!(*first, Transition::Activated);
            }
        }
    }
}
