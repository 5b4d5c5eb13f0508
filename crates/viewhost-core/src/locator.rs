#![forbid(unsafe_code)]

//! View resolution.
//!
//! The registration table is owned by application start-up code and is
//! consumed here through the [`ViewRegistry`] trait. [`ViewRegistrations`]
//! is the stock table. [`ViewLocator`] adds the resolution policy on top:
//!
//! 1. Look up the exact `(view-model type, contract)` registration.
//! 2. If that misses and the contract was not the default, look up
//!    `(view-model type, default)`.
//! 3. If both miss, fail with [`ViewError::ViewNotFound`].
//!
//! The fallback lives here and nowhere else; hosts call the locator and
//! never retry with a different contract themselves.
//!
//! Resolution is a pure lookup followed by a factory call. The locator does
//! not bind the view-model to the view; that is the host's job.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::contract::Contract;
use crate::error::ViewError;
use crate::view::{Surface, ViewModel, ViewModelRef, ViewRef};

/// Creates a fresh (or shared) view instance.
pub type ViewFactory = Rc<dyn Fn() -> ViewRef>;

/// A view registration table.
pub trait ViewRegistry {
    /// Exact lookup, no fallback.
    fn lookup(&self, view_model: TypeId, contract: &Contract) -> Option<ViewFactory>;
}

/// In-memory registration table keyed by `(view-model type, contract)`.
#[derive(Default)]
pub struct ViewRegistrations {
    table: AHashMap<(TypeId, Contract), ViewFactory>,
}

impl ViewRegistrations {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for view-model type `VM` under `contract`.
    ///
    /// A later registration for the same key replaces the earlier one.
    pub fn register<VM: ViewModel>(
        &mut self,
        contract: impl Into<Contract>,
        factory: impl Fn() -> ViewRef + 'static,
    ) -> &mut Self {
        let key = (TypeId::of::<VM>(), contract.into());
        if self.table.insert(key, Rc::new(factory)).is_some() {
            tracing::debug!(
                view_model = std::any::type_name::<VM>(),
                "replaced existing view registration"
            );
        }
        self
    }

    /// Whether an exact registration exists.
    #[must_use]
    pub fn contains<VM: ViewModel>(&self, contract: &Contract) -> bool {
        self.table
            .contains_key(&(TypeId::of::<VM>(), contract.clone()))
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ViewRegistry for ViewRegistrations {
    fn lookup(&self, view_model: TypeId, contract: &Contract) -> Option<ViewFactory> {
        self.table.get(&(view_model, contract.clone())).cloned()
    }
}

impl fmt::Debug for ViewRegistrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistrations")
            .field("len", &self.table.len())
            .finish()
    }
}

/// Resolves views for view-models with contract fallback.
#[derive(Clone)]
pub struct ViewLocator {
    registry: Rc<dyn ViewRegistry>,
}

impl ViewLocator {
    /// Create a locator over `registry`.
    pub fn new(registry: impl ViewRegistry + 'static) -> Self {
        Self {
            registry: Rc::new(registry),
        }
    }

    /// Create a locator over a shared registry.
    pub fn from_rc(registry: Rc<dyn ViewRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a view for `view_model` under `contract`.
    pub fn resolve(
        &self,
        view_model: &ViewModelRef,
        contract: &Contract,
    ) -> Result<ViewRef, ViewError> {
        let type_id = view_model.view_model_type();
        let factory = self.registry.lookup(type_id, contract).or_else(|| {
            if contract.is_default() {
                None
            } else {
                tracing::trace!(
                    view_model = view_model.type_name(),
                    %contract,
                    "no exact registration, falling back to default contract"
                );
                self.registry.lookup(type_id, &Contract::none())
            }
        });

        match factory {
            Some(factory) => Ok(factory()),
            None => Err(ViewError::ViewNotFound {
                view_model: view_model.type_name(),
                contract: contract.clone(),
            }),
        }
    }

    /// Resolve a view and require that it can be displayed on `surface`.
    pub fn resolve_for(
        &self,
        view_model: &ViewModelRef,
        contract: &Contract,
        surface: Surface,
    ) -> Result<ViewRef, ViewError> {
        let view = self.resolve(view_model, contract)?;
        if view.surface() != surface {
            return Err(ViewError::ViewTypeMismatch {
                expected: surface,
                actual: view.type_name(),
            });
        }
        Ok(view)
    }
}

impl fmt::Debug for ViewLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewLocator").finish_non_exhaustive()
    }
}
