#![forbid(unsafe_code)]

//! Router navigation history.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use viewhost_core::ViewModelRef;
use viewhost_reactive::{Observable, Signal};

/// A structural change to a [`RoutingState`] stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackChange {
    /// An entry was appended.
    Added(ViewModelRef),
    /// The last entry was removed.
    Removed(ViewModelRef),
    /// The stack was cleared wholesale.
    Reset,
}

#[derive(Default)]
struct RoutingInner {
    stack: RefCell<Vec<ViewModelRef>>,
    current: Observable<Option<ViewModelRef>>,
    navigated: Signal<ViewModelRef>,
    navigated_back: Signal<ViewModelRef>,
    changed: Signal<StackChange>,
}

/// Ordered navigation history of view-models.
///
/// The last entry is the current view-model. Clones share the same stack.
///
/// Besides [`changed`](Self::changed), which reports every structural
/// change, there are two navigation streams: [`navigated`](Self::navigated)
/// fires for forward navigation and [`navigated_back`](Self::navigated_back)
/// for programmatic back navigation. [`remove_last`](Self::remove_last) is
/// not navigation; it only fires `changed`.
#[derive(Clone, Default)]
pub struct RoutingState {
    inner: Rc<RoutingInner>,
}

impl RoutingState {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `view_model` and navigate to it.
    pub fn navigate(&self, view_model: ViewModelRef) {
        self.inner.stack.borrow_mut().push(view_model.clone());
        self.sync_current();
        self.inner
            .changed
            .emit(StackChange::Added(view_model.clone()));
        self.inner.navigated.emit(view_model);
    }

    /// Whether [`navigate_back`](Self::navigate_back) would do anything.
    ///
    /// The root entry is never navigated away from.
    #[must_use]
    pub fn can_navigate_back(&self) -> bool {
        self.inner.stack.borrow().len() > 1
    }

    /// Pop the current view-model, returning it.
    pub fn navigate_back(&self) -> Option<ViewModelRef> {
        if !self.can_navigate_back() {
            return None;
        }
        let removed = self.inner.stack.borrow_mut().pop()?;
        self.sync_current();
        self.inner
            .changed
            .emit(StackChange::Removed(removed.clone()));
        self.inner.navigated_back.emit(removed.clone());
        Some(removed)
    }

    /// Clear the stack, then navigate to `view_model`.
    pub fn navigate_and_reset(&self, view_model: ViewModelRef) {
        self.reset();
        self.navigate(view_model);
    }

    /// Clear the stack.
    pub fn reset(&self) {
        self.inner.stack.borrow_mut().clear();
        self.sync_current();
        self.inner.changed.emit(StackChange::Reset);
    }

    /// Remove the last entry without navigating.
    ///
    /// Used to follow a back navigation that already happened elsewhere.
    pub fn remove_last(&self) -> Option<ViewModelRef> {
        let removed = self.inner.stack.borrow_mut().pop()?;
        self.sync_current();
        self.inner
            .changed
            .emit(StackChange::Removed(removed.clone()));
        Some(removed)
    }

    /// The current (last) view-model.
    #[must_use]
    pub fn current_view_model(&self) -> Option<ViewModelRef> {
        self.inner.stack.borrow().last().cloned()
    }

    /// Observable of the current view-model.
    #[must_use]
    pub fn current(&self) -> &Observable<Option<ViewModelRef>> {
        &self.inner.current
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.stack.borrow().len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.stack.borrow().is_empty()
    }

    /// Snapshot of the stack, root first.
    #[must_use]
    pub fn stack(&self) -> Vec<ViewModelRef> {
        self.inner.stack.borrow().clone()
    }

    /// Fires with the new current view-model on forward navigation.
    #[must_use]
    pub fn navigated(&self) -> &Signal<ViewModelRef> {
        &self.inner.navigated
    }

    /// Fires with the removed view-model on programmatic back navigation.
    #[must_use]
    pub fn navigated_back(&self) -> &Signal<ViewModelRef> {
        &self.inner.navigated_back
    }

    /// Fires on every structural change.
    #[must_use]
    pub fn changed(&self) -> &Signal<StackChange> {
        &self.inner.changed
    }

    fn sync_current(&self) {
        let current = self.current_view_model();
        self.inner.current.set(current);
    }
}

impl fmt::Debug for RoutingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.inner.stack.borrow();
        let segments: Vec<String> = stack
            .iter()
            .map(|vm| {
                vm.url_path_segment()
                    .unwrap_or_else(|| vm.type_name().to_string())
            })
            .collect();
        f.debug_struct("RoutingState")
            .field("len", &stack.len())
            .field("stack", &segments)
            .finish()
    }
}
