#![forbid(unsafe_code)]

//! Router-driven navigation.
//!
//! [`RoutingState`] is the router's view-model history. A
//! [`RoutedViewHost`] keeps a native [`NavigationController`] stack in step
//! with it in both directions:
//!
//! - Router to native: a reset pops to root, a forward navigation resolves a
//!   page and pushes it, a programmatic back navigation pops one.
//! - Native to router: a pop the host did not perform itself (a back gesture
//!   or button in native chrome) removes the router's last entry.
//!
//! The host marks its own pops as router-instigated for their duration so
//! the native "did pop" notification is not fed back into the router.

mod host;
mod navigation;
mod state;

pub use host::RoutedViewHost;
pub use navigation::{NavigationController, NavigationOptions};
pub use state::{RoutingState, StackChange};
