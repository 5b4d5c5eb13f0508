#![forbid(unsafe_code)]

//! viewhost public facade.
//!
//! Shows the view for a changeable view-model and keeps a native navigation
//! stack in step with a router. Most applications only need the
//! [`prelude`].
//!
//! ```
//! use std::rc::Rc;
//! use viewhost::prelude::*;
//!
//! struct Login;
//! impl ViewModel for Login {}
//!
//! let mut views = ViewRegistrations::new();
//! views.register::<Login>(Contract::none(), || ReactiveView::<Login>::element().into_view());
//!
//! let host = ViewModelViewHost::builder()
//!     .locator(ViewLocator::new(views))
//!     .contract(Observable::new(Contract::none()))
//!     .build()?;
//! let _active = host.activate()?;
//!
//! let login = ViewModelRef::new(Login);
//! host.set_view_model(Some(login.clone()))?;
//! assert!(host.content().is_some_and(|view| view.is_bound_to(&login)));
//! # Ok::<(), ViewError>(())
//! ```

pub use viewhost_core::{
    ActivationHandle, ActivationLifecycle, ActivationViolation, Contract, ErrorChannel,
    Orientation, PlatformOperations, Surface, View, ViewError, ViewFactory, ViewLocator,
    ViewModel, ViewModelRef, ViewRef, ViewRegistrations, ViewRegistry,
};
pub use viewhost_reactive::{
    BatchScope, BindingScope, Observable, SerialHandle, Signal, Subscription, combine_latest,
};
pub use viewhost_widgets::{
    NavigationController, NavigationOptions, ReactiveView, RoutedViewHost, RoutingState,
    StackChange, ViewModelViewHost, ViewModelViewHostBuilder,
};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        ActivationHandle, BatchScope, Contract, NavigationController, NavigationOptions,
        Observable, PlatformOperations, ReactiveView, RoutedViewHost, RoutingState, Surface,
        View, ViewError, ViewLocator, ViewModel, ViewModelRef, ViewModelViewHost, ViewRef,
        ViewRegistrations,
    };
}
