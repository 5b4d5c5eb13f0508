#![forbid(unsafe_code)]

//! Native navigation seam and synchronizer options.

use viewhost_core::ViewRef;
use viewhost_reactive::Signal;

/// A native push/pop navigation stack.
///
/// Implementations own the pushed views. Every pop, whether requested
/// through this trait or performed by the user through native chrome,
/// must fire [`popped`](Self::popped) synchronously, before the pop call
/// returns.
pub trait NavigationController {
    /// Push `view` on top of the stack.
    fn push(&self, view: ViewRef, animated: bool);

    /// Pop the top view.
    fn pop(&self, animated: bool) -> Option<ViewRef>;

    /// Pop everything above the root, returning the popped views top first.
    ///
    /// Whether the root itself is kept is up to the implementation.
    fn pop_to_root(&self, animated: bool) -> Vec<ViewRef>;

    /// Number of views on the stack.
    fn depth(&self) -> usize;

    /// Fires with each popped view.
    fn popped(&self) -> &Signal<ViewRef>;
}

/// Options for [`RoutedViewHost`](super::RoutedViewHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationOptions {
    /// Animate pushes and pops that follow router events.
    pub animated: bool,
    /// On activation, push a view for each entry already in the router when
    /// the native stack is empty.
    pub sync_on_activate: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            animated: true,
            sync_on_activate: true,
        }
    }
}
