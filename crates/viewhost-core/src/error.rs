#![forbid(unsafe_code)]

//! Error taxonomy and reporting.
//!
//! Every error here comes from a configuration or programming defect (a
//! missing registration, a wrongly-typed view, a missing collaborator, a
//! misused activation handle), so nothing is retried. Operations a caller
//! invokes directly return `Result<_, ViewError>`. Reactions to upstream
//! streams have no caller to return to; they report through an
//! [`ErrorChannel`] instead.
//!
//! # Failure Modes
//!
//! | Error | Cause | Surfaced by |
//! |-------|-------|-------------|
//! | `ViewNotFound` | No registration with or without the contract | Locator, both hosts |
//! | `ViewTypeMismatch` | Resolved view cannot live on the required surface | Locator, both hosts |
//! | `MissingCollaborator` | Builder missing a required service | Host builders |
//! | `ActivationProtocolViolation` | Double activation, release while inactive | Activation lifecycle |

use std::cell::RefCell;
use std::fmt;

use viewhost_reactive::{Signal, Subscription};

use crate::contract::Contract;
use crate::view::Surface;

/// How the activation protocol was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationViolation {
    /// `activate()` while already active.
    AlreadyActive,
    /// A handle was released while its lifecycle was not active.
    NotActive,
}

impl fmt::Display for ActivationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("activated while already active"),
            Self::NotActive => f.write_str("released while not active"),
        }
    }
}

/// Errors from view resolution, host construction, and activation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// No view registered for the view-model type, with or without contract.
    #[error("couldn't find a view for view model '{view_model}' (contract {contract})")]
    ViewNotFound {
        /// View-model type name.
        view_model: &'static str,
        /// Contract that was requested before falling back.
        contract: Contract,
    },
    /// The resolved view cannot be displayed on the required surface.
    #[error("view '{actual}' is not a {expected}")]
    ViewTypeMismatch {
        /// Surface the host requires.
        expected: Surface,
        /// Type name of the resolved view.
        actual: &'static str,
    },
    /// A required collaborator was not supplied at construction.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    /// The activation state machine was driven illegally.
    #[error("activation protocol violation on '{view}': {reason}")]
    ActivationProtocolViolation {
        /// Owner of the lifecycle.
        view: &'static str,
        /// What went wrong.
        reason: ActivationViolation,
    },
}

/// Reports errors raised inside reactive callbacks.
///
/// Each reported error is logged, emitted on [`ErrorChannel::errors`], and
/// latched until [`ErrorChannel::take`] collects it. Only the most recent
/// error is latched.
#[derive(Default)]
pub struct ErrorChannel {
    errors: Signal<ViewError>,
    latched: RefCell<Option<ViewError>>,
}

impl ErrorChannel {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `error` from `source`.
    pub fn report(&self, source: &'static str, error: ViewError) {
        tracing::error!(source, %error, "view host error");
        *self.latched.borrow_mut() = Some(error.clone());
        self.errors.emit(error);
    }

    /// The stream of reported errors.
    #[must_use]
    pub fn errors(&self) -> &Signal<ViewError> {
        &self.errors
    }

    /// Subscribe to reported errors.
    pub fn subscribe(&self, callback: impl Fn(&ViewError) + 'static) -> Subscription {
        self.errors.subscribe(callback)
    }

    /// Take the latched error, if any.
    pub fn take(&self) -> Option<ViewError> {
        self.latched.borrow_mut().take()
    }

    /// Run `f`, returning the first error reported while it ran.
    ///
    /// An error latched before the call is discarded (it was already
    /// logged and emitted).
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> Result<R, ViewError> {
        self.latched.borrow_mut().take();
        let result = f();
        match self.take() {
            Some(error) => Err(error),
            None => Ok(result),
        }
    }
}

impl fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("reported", &self.errors.emission_count())
            .field("latched", &self.latched.borrow().is_some())
            .finish()
    }
}
