#![forbid(unsafe_code)]

//! Navigation-stack synchronizer.
//!
//! # Invariants
//!
//! 1. Every pop the host performs runs with the router-instigated flag set,
//!    and the flag is restored as soon as the pop returns.
//! 2. A native pop observed while the flag is clear removes exactly one
//!    router entry. A pop observed while it is set changes nothing.
//! 3. A forward navigation either pushes one fully bound page or pushes
//!    nothing and removes the entry from the router again.
//! 4. Pushed pages carry their view-model's path segment as title, sampled
//!    at push time.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use viewhost_core::{
    ActivationHandle, ActivationLifecycle, Contract, ErrorChannel, Surface, ViewError,
    ViewLocator, ViewModelRef, ViewRef,
};
use viewhost_reactive::{Observable, Signal};

use super::navigation::{NavigationController, NavigationOptions};
use super::state::{RoutingState, StackChange};

const SOURCE: &str = "RoutedViewHost";

/// Marks pops as router-instigated while alive.
struct RouterInstigated<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> RouterInstigated<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for RouterInstigated<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

struct RoutedInner {
    router: RoutingState,
    navigation: Rc<dyn NavigationController>,
    locator: ViewLocator,
    options: NavigationOptions,
    contract: RefCell<Observable<Contract>>,
    router_instigated: Cell<bool>,
    lifecycle: ActivationLifecycle,
    errors: ErrorChannel,
}

impl RoutedInner {
    fn resolve_page(&self, view_model: &ViewModelRef) -> Result<ViewRef, ViewError> {
        let contract = self.contract.borrow().get();
        let view = self
            .locator
            .resolve_for(view_model, &contract, Surface::Page)?;
        view.set_view_model(Some(view_model.clone()));
        view.set_title(view_model.url_path_segment());
        Ok(view)
    }

    fn push(&self, view_model: &ViewModelRef) {
        match self.resolve_page(view_model) {
            Ok(view) => {
                tracing::debug!(
                    view = view.type_name(),
                    view_model = view_model.type_name(),
                    depth = self.navigation.depth() + 1,
                    "pushing page"
                );
                self.navigation.push(view, self.options.animated);
            }
            Err(error) => {
                let top_is_failed = self
                    .router
                    .current_view_model()
                    .is_some_and(|vm| vm == *view_model);
                if top_is_failed {
                    self.router.remove_last();
                }
                self.errors.report(SOURCE, error);
            }
        }
    }

    fn pop_one(&self) {
        let _instigated = RouterInstigated::enter(&self.router_instigated);
        let popped = self.navigation.pop(self.options.animated);
        tracing::debug!(
            popped = popped.is_some(),
            depth = self.navigation.depth(),
            "popped page for back navigation"
        );
    }

    fn pop_to_root(&self) {
        let _instigated = RouterInstigated::enter(&self.router_instigated);
        let popped = self.navigation.pop_to_root(self.options.animated);
        tracing::debug!(
            popped = popped.len(),
            depth = self.navigation.depth(),
            "router reset, popped to root"
        );
    }

    fn on_native_pop(&self, view: &ViewRef) {
        if self.router_instigated.get() {
            tracing::trace!(view = view.type_name(), "ignoring router-instigated pop");
            return;
        }
        let removed = self.router.remove_last();
        tracing::debug!(
            view = view.type_name(),
            removed = removed.is_some(),
            "native pop, removed router entry"
        );
    }

    fn sync_initial(&self) -> Result<(), ViewError> {
        if !self.options.sync_on_activate || self.navigation.depth() > 0 {
            return Ok(());
        }
        let pages = self
            .router
            .stack()
            .iter()
            .map(|vm| self.resolve_page(vm))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = pages.len(), "initial navigation sync");
        for page in pages {
            self.navigation.push(page, false);
        }
        Ok(())
    }

    fn wire(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.lifecycle.when_activated(move |scope| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let w = Weak::clone(&weak);
            scope.hold(inner.router.changed().subscribe(move |change| {
                if matches!(change, StackChange::Reset) {
                    if let Some(inner) = w.upgrade() {
                        inner.pop_to_root();
                    }
                }
            }));

            let w = Weak::clone(&weak);
            scope.hold(inner.router.navigated().subscribe(move |vm| {
                if let Some(inner) = w.upgrade() {
                    inner.push(vm);
                }
            }));

            let w = Weak::clone(&weak);
            scope.hold(inner.router.navigated_back().subscribe(move |_| {
                if let Some(inner) = w.upgrade() {
                    inner.pop_one();
                }
            }));

            let w = Weak::clone(&weak);
            scope.hold(inner.navigation.popped().subscribe(move |view| {
                if let Some(inner) = w.upgrade() {
                    inner.on_native_pop(view);
                }
            }));

            if let Err(error) = inner.sync_initial() {
                inner.errors.report(SOURCE, error);
            }
        });
    }
}

/// Keeps a native navigation stack in step with a [`RoutingState`].
///
/// Like the slot host, it only reacts while active.
#[derive(Clone)]
pub struct RoutedViewHost {
    inner: Rc<RoutedInner>,
}

impl RoutedViewHost {
    /// Create a host with default options.
    pub fn new(
        router: RoutingState,
        navigation: Rc<dyn NavigationController>,
        locator: ViewLocator,
    ) -> Self {
        Self::with_options(router, navigation, locator, NavigationOptions::default())
    }

    /// Create a host with explicit options.
    pub fn with_options(
        router: RoutingState,
        navigation: Rc<dyn NavigationController>,
        locator: ViewLocator,
        options: NavigationOptions,
    ) -> Self {
        let inner = Rc::new(RoutedInner {
            router,
            navigation,
            locator,
            options,
            contract: RefCell::new(Observable::new(Contract::none())),
            router_instigated: Cell::new(false),
            lifecycle: ActivationLifecycle::new(SOURCE),
            errors: ErrorChannel::new(),
        });
        inner.wire();
        Self { inner }
    }

    /// Resolve pages under the contract held by `source`.
    ///
    /// The contract is read at each push; pages already on the stack are
    /// not replaced when it changes.
    pub fn set_contract(&self, source: &Observable<Contract>) {
        *self.inner.contract.borrow_mut() = source.clone();
    }

    /// The contract pages are currently resolved with.
    #[must_use]
    pub fn contract(&self) -> Contract {
        self.inner.contract.borrow().get()
    }

    /// Start synchronizing.
    ///
    /// With [`NavigationOptions::sync_on_activate`] and an empty native
    /// stack, pushes a page for each router entry. If any of them fails to
    /// resolve nothing is pushed, the host stays inactive, and the error is
    /// returned.
    pub fn activate(&self) -> Result<ActivationHandle, ViewError> {
        self.inner
            .errors
            .capture(|| self.inner.lifecycle.activate())?
    }

    /// Whether the host is synchronizing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.is_active()
    }

    /// The router being followed.
    #[must_use]
    pub fn router(&self) -> &RoutingState {
        &self.inner.router
    }

    /// The activation lifecycle, for hosting environments that drive it.
    #[must_use]
    pub fn lifecycle(&self) -> &ActivationLifecycle {
        &self.inner.lifecycle
    }

    /// Errors raised while reacting to router or native events.
    #[must_use]
    pub fn thrown_errors(&self) -> &Signal<ViewError> {
        self.inner.errors.errors()
    }

    /// Take the most recent unreturned error.
    pub fn take_error(&self) -> Option<ViewError> {
        self.inner.errors.take()
    }
}

impl fmt::Debug for RoutedViewHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedViewHost")
            .field("router", &self.inner.router)
            .field("depth", &self.inner.navigation.depth())
            .field("options", &self.inner.options)
            .field("active", &self.inner.lifecycle.is_active())
            .finish()
    }
}
