#![forbid(unsafe_code)]

//! View hosts for viewhost.
//!
//! - [`host`]: [`ViewModelViewHost`], a single content slot that shows the
//!   view for its current view-model.
//! - [`reactive_view`]: [`ReactiveView`], a ready-made typed view for
//!   elements and pages.
//! - [`routing`]: [`RoutingState`] and [`RoutedViewHost`], which keeps a
//!   native navigation stack in step with the router.

pub mod host;
pub mod reactive_view;
pub mod routing;

pub use host::{ViewModelViewHost, ViewModelViewHostBuilder};
pub use reactive_view::ReactiveView;
pub use routing::{
    NavigationController, NavigationOptions, RoutedViewHost, RoutingState, StackChange,
};
