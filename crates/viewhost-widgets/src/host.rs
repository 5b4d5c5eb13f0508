#![forbid(unsafe_code)]

//! Single-slot view host.
//!
//! [`ViewModelViewHost`] owns one content slot and keeps it showing the view
//! for its current view-model. It watches the *combined latest* of its
//! view-model and its contract; whenever the pair changes it recomputes:
//!
//! 1. No view-model: show the default content and release the activation of
//!    whatever view was installed. The locator is not consulted.
//! 2. Otherwise: resolve a view through the [`ViewLocator`], bind the
//!    view-model to it, activate it (no-op for views without an
//!    [`ActivationLifecycle`]), release the previous view's activation, then
//!    install the new view in the slot.
//!
//! # Invariants
//!
//! 1. The slot holds exactly one view and exactly one activation handle;
//!    replacing the view replaces the handle.
//! 2. At every point where the slot's content is observable, at most one
//!    resolved view is active.
//! 3. The slot never shows a view bound to a superseded view-model.
//! 4. An identical consecutive `(view-model, contract)` pair performs no swap.
//! 5. A failed resolution leaves the slot's content and activation untouched.
//!
//! # Lifecycle
//!
//! The host is itself an activatable [`View`]. Its subscriptions, including
//! the link to an external contract source, exist only while it is active.
//! Activating it performs the initial resolution; releasing the handle
//! unsubscribes and releases the installed view's activation, synchronously.
//! The displayed content is kept across deactivation.
//!
//! # Failure Modes
//!
//! | Failure | Surfaced as |
//! |---------|-------------|
//! | No registration for the view-model | `ViewNotFound` from the triggering call |
//! | Resolved view is not an element | `ViewTypeMismatch` from the triggering call |
//! | Resolved view is already active | `ActivationProtocolViolation` |
//! | Error while reacting to an external contract stream | [`ViewModelViewHost::thrown_errors`] |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use viewhost_core::{
    ActivationHandle, ActivationLifecycle, Contract, ErrorChannel, PlatformOperations, Surface,
    View, ViewError, ViewLocator, ViewModelRef, ViewRef,
};
use viewhost_reactive::{
    Observable, SerialHandle, Signal, Subscription, combine_latest, distinct_pairs,
};

const SOURCE: &str = "ViewModelViewHost";

struct HostInner {
    locator: ViewLocator,
    platform: Option<Rc<dyn PlatformOperations>>,
    view_model: Observable<Option<ViewModelRef>>,
    contract: Observable<Contract>,
    contract_source: RefCell<Option<Observable<Contract>>>,
    contract_link: SerialHandle,
    default_content: RefCell<Option<ViewRef>>,
    content: Observable<Option<ViewRef>>,
    current_activation: SerialHandle,
    lifecycle: ActivationLifecycle,
    errors: ErrorChannel,
    swaps: Cell<u64>,
}

impl HostInner {
    fn reconcile(
        &self,
        view_model: Option<ViewModelRef>,
        contract: &Contract,
    ) -> Result<(), ViewError> {
        let Some(view_model) = view_model else {
            self.current_activation.clear();
            let default = self.default_content.borrow().clone();
            tracing::debug!(
                has_default = default.is_some(),
                "no view model, showing default content"
            );
            self.content.set(default);
            return Ok(());
        };

        let view = self
            .locator
            .resolve_for(&view_model, contract, Surface::Element)?;
        view.set_view_model(Some(view_model.clone()));

        // The locator may hand back the instance already in the slot.
        let reinstalling = self
            .content
            .with(|current| current.as_ref().is_some_and(|c| c.ptr_eq(&view)));
        if reinstalling {
            self.current_activation.clear();
        }

        let handle = match view.activation() {
            Some(lifecycle) => lifecycle.activate()?,
            None => ActivationHandle::empty(),
        };
        self.current_activation.replace(handle);
        self.content.set(Some(view.clone()));
        self.swaps.set(self.swaps.get() + 1);

        tracing::debug!(
            view = view.type_name(),
            view_model = view_model.type_name(),
            %contract,
            "swapped hosted view"
        );
        Ok(())
    }

    fn link_contract(&self) {
        let source = self.contract_source.borrow().clone();
        match source {
            Some(source) if self.lifecycle.is_active() => {
                self.contract.set(source.get());
                let target = self.contract.clone();
                let link: Subscription = source.subscribe(move |c| target.set(c.clone()));
                self.contract_link.replace(link);
            }
            _ => self.contract_link.clear(),
        }
    }

    fn wire(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.lifecycle.when_activated(move |scope| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.link_contract();

            let w = Weak::clone(&weak);
            let combined = combine_latest(
                &inner.view_model,
                &inner.contract,
                distinct_pairs(move |vm: &Option<ViewModelRef>, contract: &Contract| {
                    let Some(inner) = w.upgrade() else {
                        return;
                    };
                    if let Err(error) = inner.reconcile(vm.clone(), contract) {
                        inner.errors.report(SOURCE, error);
                    }
                }),
            );
            combined.emit_current();
            scope.hold(combined);
            scope.hold(SlotRelease(Weak::clone(&weak)));
        });
    }
}

/// Releases the slot's activation and the contract link when the host's
/// own activation ends.
struct SlotRelease(Weak<HostInner>);

impl Drop for SlotRelease {
    fn drop(&mut self) {
        if let Some(inner) = self.0.upgrade() {
            inner.contract_link.clear();
            inner.current_activation.clear();
        }
    }
}

/// Hosts the view for a single, changeable view-model.
#[derive(Clone)]
pub struct ViewModelViewHost {
    inner: Rc<HostInner>,
}

impl ViewModelViewHost {
    /// Start building a host.
    #[must_use]
    pub fn builder() -> ViewModelViewHostBuilder {
        ViewModelViewHostBuilder::default()
    }

    /// Activate the host, performing the initial resolution.
    ///
    /// If the initial resolution fails the host is left inactive and the
    /// error is returned.
    pub fn activate(&self) -> Result<ActivationHandle, ViewError> {
        self.inner
            .errors
            .capture(|| self.inner.lifecycle.activate())?
    }

    /// Whether the host is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.is_active()
    }

    /// Replace the view-model.
    ///
    /// While active, this resolves and swaps synchronously and returns any
    /// resolution error. Inside a `BatchScope` the swap happens when the
    /// batch flushes and errors go to [`thrown_errors`](Self::thrown_errors).
    pub fn set_view_model(&self, view_model: Option<ViewModelRef>) -> Result<(), ViewError> {
        self.inner
            .errors
            .capture(|| self.inner.view_model.set(view_model))
    }

    /// Follow `source` for the contract instead of the device orientation.
    pub fn set_contract(&self, source: &Observable<Contract>) -> Result<(), ViewError> {
        *self.inner.contract_source.borrow_mut() = Some(source.clone());
        self.inner.errors.capture(|| {
            self.inner.contract.set(source.get());
            self.inner.link_contract();
        })
    }

    /// Replace the content shown while there is no view-model.
    pub fn set_default_content(&self, view: Option<ViewRef>) -> Result<(), ViewError> {
        check_default_content(view.as_ref())?;
        *self.inner.default_content.borrow_mut() = view.clone();
        if self.inner.view_model.with(Option::is_none) {
            self.inner.content.set(view);
        }
        Ok(())
    }

    /// Re-sample the orientation after the host's size changed.
    ///
    /// No-op when the contract comes from an explicit source.
    pub fn notify_size_changed(&self) -> Result<(), ViewError> {
        if self.inner.contract_source.borrow().is_some() {
            return Ok(());
        }
        let Some(platform) = self.inner.platform.as_ref() else {
            return Err(ViewError::MissingCollaborator("PlatformOperations"));
        };
        let contract = Contract::from(platform.orientation());
        self.inner.errors.capture(|| self.inner.contract.set(contract))
    }

    /// The view currently in the slot.
    #[must_use]
    pub fn content(&self) -> Option<ViewRef> {
        self.inner.content.get()
    }

    /// Observe slot changes.
    pub fn subscribe_content(&self, callback: impl Fn(&Option<ViewRef>) + 'static) -> Subscription {
        self.inner.content.subscribe(callback)
    }

    /// The current contract.
    #[must_use]
    pub fn contract(&self) -> Contract {
        self.inner.contract.get()
    }

    /// The content shown while there is no view-model.
    #[must_use]
    pub fn default_content(&self) -> Option<ViewRef> {
        self.inner.default_content.borrow().clone()
    }

    /// Number of resolved views installed so far.
    #[must_use]
    pub fn swap_count(&self) -> u64 {
        self.inner.swaps.get()
    }

    /// Errors raised while reacting to upstream changes.
    #[must_use]
    pub fn thrown_errors(&self) -> &Signal<ViewError> {
        self.inner.errors.errors()
    }

    /// Take the most recent unreturned error.
    pub fn take_error(&self) -> Option<ViewError> {
        self.inner.errors.take()
    }

    /// This host as a [`ViewRef`], for nesting inside another host.
    #[must_use]
    pub fn as_view(&self) -> ViewRef {
        ViewRef::new(self.clone())
    }
}

impl View for ViewModelViewHost {
    fn surface(&self) -> Surface {
        Surface::Element
    }

    fn view_model(&self) -> Option<ViewModelRef> {
        self.inner.view_model.get()
    }

    /// Binding through the trait has no caller to return an error to, so a
    /// failed resolution stays on this host: it is emitted on
    /// [`thrown_errors`](ViewModelViewHost::thrown_errors) and left latched
    /// for [`take_error`](ViewModelViewHost::take_error).
    fn set_view_model(&self, view_model: Option<ViewModelRef>) {
        self.inner.view_model.set(view_model);
    }

    fn activation(&self) -> Option<&ActivationLifecycle> {
        Some(&self.inner.lifecycle)
    }
}

impl fmt::Debug for ViewModelViewHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelViewHost")
            .field("view_model", &self.inner.view_model.get())
            .field("contract", &self.inner.contract.get())
            .field("content", &self.inner.content.get())
            .field("active", &self.inner.lifecycle.is_active())
            .field("swaps", &self.inner.swaps.get())
            .finish()
    }
}

fn check_default_content(view: Option<&ViewRef>) -> Result<(), ViewError> {
    match view {
        Some(view) if view.surface() != Surface::Element => Err(ViewError::ViewTypeMismatch {
            expected: Surface::Element,
            actual: view.type_name(),
        }),
        _ => Ok(()),
    }
}

/// Builder for [`ViewModelViewHost`].
///
/// The locator is required. The platform collaborator is required unless an
/// explicit contract source is supplied, since the default contract is the
/// device orientation.
#[derive(Default)]
pub struct ViewModelViewHostBuilder {
    locator: Option<ViewLocator>,
    platform: Option<Rc<dyn PlatformOperations>>,
    contract: Option<Observable<Contract>>,
    default_content: Option<ViewRef>,
    view_model: Option<ViewModelRef>,
}

impl ViewModelViewHostBuilder {
    /// Set the view locator.
    #[must_use]
    pub fn locator(mut self, locator: ViewLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Set the platform collaborator.
    #[must_use]
    pub fn platform(mut self, platform: Rc<dyn PlatformOperations>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Follow an explicit contract source instead of the orientation.
    #[must_use]
    pub fn contract(mut self, source: Observable<Contract>) -> Self {
        self.contract = Some(source);
        self
    }

    /// Set the content shown while there is no view-model.
    #[must_use]
    pub fn default_content(mut self, view: ViewRef) -> Self {
        self.default_content = Some(view);
        self
    }

    /// Set the initial view-model.
    #[must_use]
    pub fn view_model(mut self, view_model: ViewModelRef) -> Self {
        self.view_model = Some(view_model);
        self
    }

    /// Build the host. It starts inactive, showing the default content.
    pub fn build(self) -> Result<ViewModelViewHost, ViewError> {
        let locator = self
            .locator
            .ok_or(ViewError::MissingCollaborator("ViewLocator"))?;
        let contract = match (&self.contract, &self.platform) {
            (Some(source), _) => source.get(),
            (None, Some(platform)) => Contract::from(platform.orientation()),
            (None, None) => return Err(ViewError::MissingCollaborator("PlatformOperations")),
        };
        check_default_content(self.default_content.as_ref())?;

        let inner = Rc::new(HostInner {
            locator,
            platform: self.platform,
            view_model: Observable::new(self.view_model),
            contract: Observable::new(contract),
            contract_source: RefCell::new(self.contract),
            contract_link: SerialHandle::new(),
            content: Observable::new(self.default_content.clone()),
            default_content: RefCell::new(self.default_content),
            current_activation: SerialHandle::new(),
            lifecycle: ActivationLifecycle::new(SOURCE),
            errors: ErrorChannel::new(),
            swaps: Cell::new(0),
        });
        inner.wire();
        Ok(ViewModelViewHost { inner })
    }
}

impl fmt::Debug for ViewModelViewHostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelViewHostBuilder")
            .field("locator", &self.locator.is_some())
            .field("platform", &self.platform.is_some())
            .field("contract", &self.contract.is_some())
            .field("default_content", &self.default_content.is_some())
            .finish()
    }
}
