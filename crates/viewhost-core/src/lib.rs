#![forbid(unsafe_code)]

//! Core model for viewhost: view-models, views, contracts, view resolution,
//! and the activation lifecycle.
//!
//! - [`view`]: The identity-significant [`ViewModelRef`] and [`ViewRef`]
//!   handles and the [`View`] capability trait.
//! - [`contract`]: The optional [`Contract`] tag that selects between views
//!   registered for the same view-model type.
//! - [`locator`]: [`ViewLocator`] resolves a view for a (view-model, contract)
//!   pair with a mandatory fallback to the default contract.
//! - [`activation`]: [`ActivationLifecycle`] and its RAII [`ActivationHandle`].
//! - [`platform`]: The [`PlatformOperations`] collaborator.
//! - [`error`]: [`ViewError`] and the [`ErrorChannel`] hosts report through.

pub mod activation;
pub mod contract;
pub mod error;
pub mod locator;
pub mod platform;
pub mod view;

pub use activation::{ActivationHandle, ActivationLifecycle};
pub use contract::Contract;
pub use error::{ActivationViolation, ErrorChannel, ViewError};
pub use locator::{ViewFactory, ViewLocator, ViewRegistrations, ViewRegistry};
pub use platform::{Orientation, PlatformOperations};
pub use view::{AsAny, Surface, View, ViewModel, ViewModelRef, ViewRef};
