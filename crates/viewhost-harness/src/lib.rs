#![forbid(unsafe_code)]

//! Test fixtures for viewhost.
//!
//! - [`ProbeViewModel`] / [`OtherViewModel`]: view-models with and without a
//!   path segment.
//! - [`RecordingNavigation`]: an in-memory [`NavigationController`] that logs
//!   every operation and can simulate a back gesture.
//! - [`FixedPlatform`]: a [`PlatformOperations`] with a settable orientation.
//! - [`ActivationLog`]: records activation transitions of watched views.
//! - [`counting`]: wraps a view factory with a call counter.
//! - [`init_test_logging`]: installs a `tracing` subscriber for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use viewhost_core::{Orientation, PlatformOperations, ViewModel, ViewModelRef, ViewRef};
use viewhost_reactive::{BindingScope, Signal};
use viewhost_widgets::{NavigationController, ReactiveView};

// ============================================================================
// View-models
// ============================================================================

/// View-model with a path segment.
#[derive(Debug)]
pub struct ProbeViewModel {
    segment: String,
}

impl ProbeViewModel {
    /// Create a probe with `segment` as its path segment.
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
        }
    }

    /// Create and wrap a probe.
    pub fn shared(segment: impl Into<String>) -> ViewModelRef {
        ViewModelRef::new(Self::new(segment))
    }

    /// The path segment.
    pub fn segment(&self) -> &str {
        &self.segment
    }
}

impl ViewModel for ProbeViewModel {
    fn url_path_segment(&self) -> Option<String> {
        Some(self.segment.clone())
    }
}

/// A second view-model type, without a path segment.
#[derive(Debug, Default)]
pub struct OtherViewModel;

impl ViewModel for OtherViewModel {}

// ============================================================================
// Views
// ============================================================================

/// An activatable element view for `VM`.
pub fn element<VM: ViewModel>() -> ViewRef {
    ReactiveView::<VM>::element().with_activation().into_view()
}

/// An activatable page view for `VM`.
pub fn page<VM: ViewModel>() -> ViewRef {
    ReactiveView::<VM>::page().with_activation().into_view()
}

/// Wrap `factory` so each call is counted.
pub fn counting(
    factory: impl Fn() -> ViewRef + 'static,
) -> (impl Fn() -> ViewRef + 'static, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    let counted = move || {
        c.set(c.get() + 1);
        factory()
    };
    (counted, calls)
}

/// One activation transition of a watched view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The view was activated.
    Activated(&'static str),
    /// The view was deactivated.
    Deactivated(&'static str),
}

/// Records activation transitions across several views in order.
#[derive(Default)]
pub struct ActivationLog {
    events: Rc<RefCell<Vec<Transition>>>,
    watching: BindingScope,
}

impl ActivationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record transitions of `view` under `label`.
    ///
    /// Views without an activation lifecycle are ignored.
    pub fn watch(&mut self, view: &ViewRef, label: &'static str) {
        let Some(lifecycle) = view.activation() else {
            return;
        };
        let events = Rc::clone(&self.events);
        self.watching.hold(
            lifecycle
                .activated()
                .subscribe(move |_| events.borrow_mut().push(Transition::Activated(label))),
        );
        let events = Rc::clone(&self.events);
        self.watching.hold(
            lifecycle
                .deactivated()
                .subscribe(move |_| events.borrow_mut().push(Transition::Deactivated(label))),
        );
    }

    /// Transitions so far.
    pub fn events(&self) -> Vec<Transition> {
        self.events.borrow().clone()
    }

    /// Forget recorded transitions.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Whether `view` has a lifecycle and it is active.
pub fn is_active(view: &ViewRef) -> bool {
    view.activation().is_some_and(|lifecycle| lifecycle.is_active())
}

// ============================================================================
// Collaborators
// ============================================================================

/// One operation seen by a [`RecordingNavigation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavOp {
    /// `push`, with the pushed view's title at push time.
    Push {
        /// Title of the pushed view.
        title: Option<String>,
        /// Whether the push was animated.
        animated: bool,
    },
    /// `pop`.
    Pop {
        /// Whether the pop was animated.
        animated: bool,
    },
    /// `pop_to_root`.
    PopToRoot {
        /// Number of views popped.
        popped: usize,
    },
    /// A simulated back gesture.
    UserPop,
}

/// In-memory navigation stack.
#[derive(Default)]
pub struct RecordingNavigation {
    views: RefCell<Vec<ViewRef>>,
    ops: RefCell<Vec<NavOp>>,
    popped: Signal<ViewRef>,
    keep_root: bool,
}

impl RecordingNavigation {
    /// A stack whose `pop_to_root` empties it.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A stack whose `pop_to_root` keeps the bottom view.
    pub fn keeping_root() -> Rc<Self> {
        Rc::new(Self {
            keep_root: true,
            ..Self::default()
        })
    }

    /// Pop the top view as if the user pressed the native back button.
    pub fn user_pop(&self) -> Option<ViewRef> {
        self.ops.borrow_mut().push(NavOp::UserPop);
        self.pop_and_notify()
    }

    /// Views on the stack, bottom first.
    pub fn views(&self) -> Vec<ViewRef> {
        self.views.borrow().clone()
    }

    /// The top view.
    pub fn top(&self) -> Option<ViewRef> {
        self.views.borrow().last().cloned()
    }

    /// Titles of the views on the stack, bottom first.
    pub fn titles(&self) -> Vec<Option<String>> {
        self.views.borrow().iter().map(|v| v.title()).collect()
    }

    /// Operations so far.
    pub fn ops(&self) -> Vec<NavOp> {
        self.ops.borrow().clone()
    }

    /// Number of pops requested through the trait.
    pub fn programmatic_pops(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, NavOp::Pop { .. } | NavOp::PopToRoot { .. }))
            .count()
    }

    fn pop_and_notify(&self) -> Option<ViewRef> {
        let view = self.views.borrow_mut().pop()?;
        self.popped.emit(view.clone());
        Some(view)
    }
}

impl NavigationController for RecordingNavigation {
    fn push(&self, view: ViewRef, animated: bool) {
        self.ops.borrow_mut().push(NavOp::Push {
            title: view.title(),
            animated,
        });
        self.views.borrow_mut().push(view);
    }

    fn pop(&self, animated: bool) -> Option<ViewRef> {
        self.ops.borrow_mut().push(NavOp::Pop { animated });
        self.pop_and_notify()
    }

    fn pop_to_root(&self, _animated: bool) -> Vec<ViewRef> {
        let floor = usize::from(self.keep_root);
        let mut popped = Vec::new();
        while self.views.borrow().len() > floor {
            match self.pop_and_notify() {
                Some(view) => popped.push(view),
                None => break,
            }
        }
        self.ops.borrow_mut().push(NavOp::PopToRoot {
            popped: popped.len(),
        });
        popped
    }

    fn depth(&self) -> usize {
        self.views.borrow().len()
    }

    fn popped(&self) -> &Signal<ViewRef> {
        &self.popped
    }
}

/// Platform whose orientation tests set directly.
#[derive(Debug, Default)]
pub struct FixedPlatform {
    orientation: Cell<Option<Orientation>>,
}

impl FixedPlatform {
    /// Create a platform reporting `orientation`.
    pub fn new(orientation: Option<Orientation>) -> Rc<Self> {
        Rc::new(Self {
            orientation: Cell::new(orientation),
        })
    }

    /// Change the reported orientation.
    pub fn set_orientation(&self, orientation: Option<Orientation>) {
        self.orientation.set(orientation);
    }
}

impl PlatformOperations for FixedPlatform {
    fn orientation(&self) -> Option<Orientation> {
        self.orientation.get()
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Install a `tracing` subscriber writing to the test output.
///
/// Honors `RUST_LOG`, defaulting to debug output for the hosts. Safe to
/// call from every test.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("viewhost_core=debug,viewhost_widgets=debug,viewhost_reactive=info")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_navigation_keeps_root_when_asked() {
        let nav = RecordingNavigation::keeping_root();
        nav.push(page::<OtherViewModel>(), false);
        nav.push(page::<OtherViewModel>(), false);
        assert_eq!(nav.pop_to_root(true).len(), 1);
        assert_eq!(nav.depth(), 1);

        let nav = RecordingNavigation::new();
        nav.push(page::<OtherViewModel>(), false);
        assert_eq!(nav.pop_to_root(true).len(), 1);
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn every_pop_is_announced() {
        let nav = RecordingNavigation::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = nav.popped().subscribe(move |_| c.set(c.get() + 1));

        for _ in 0..3 {
            nav.push(page::<OtherViewModel>(), true);
        }
        nav.pop(true);
        nav.user_pop();
        nav.pop_to_root(false);
        assert_eq!(count.get(), 3);
        assert_eq!(nav.programmatic_pops(), 2);
    }

    #[test]
    fn counting_factory_counts() {
        let (factory, calls) = counting(element::<OtherViewModel>);
        let _ = factory();
        let _ = factory();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn activation_log_records_in_order() {
        let view = element::<OtherViewModel>();
        let mut log = ActivationLog::new();
        log.watch(&view, "a");

        let lifecycle = view.activation().unwrap();
        lifecycle.activate().unwrap().release().unwrap();
        assert_eq!(
            log.events(),
            vec![Transition::Activated("a"), Transition::Deactivated("a")]
        );
    }
}
