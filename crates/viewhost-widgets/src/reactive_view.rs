#![forbid(unsafe_code)]

//! A typed, general-purpose [`View`] implementation.
//!
//! [`ReactiveView<VM>`] is the view an application writes when it only needs
//! a typed handle on its view-model plus the standard capabilities:
//!
//! ```
//! use viewhost_core::{ViewModel, ViewModelRef, View};
//! use viewhost_widgets::ReactiveView;
//!
//! struct Login;
//! impl ViewModel for Login {}
//!
//! let page = ReactiveView::<Login>::page().with_activation();
//! page.set_view_model(Some(ViewModelRef::new(Login)));
//! assert!(page.typed_view_model().is_some());
//! assert!(page.activation().is_some());
//! ```
//!
//! The bound view-model is held in an [`Observable`], so the view's own
//! bindings can follow it with [`ReactiveView::view_model_changes`].

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use viewhost_core::{ActivationLifecycle, Surface, View, ViewModel, ViewModelRef, ViewRef};
use viewhost_reactive::Observable;

/// A view for view-models of type `VM`.
pub struct ReactiveView<VM> {
    surface: Surface,
    view_model: Observable<Option<ViewModelRef>>,
    title: RefCell<Option<String>>,
    lifecycle: Option<ActivationLifecycle>,
    _marker: PhantomData<fn() -> VM>,
}

impl<VM: ViewModel> ReactiveView<VM> {
    fn with_surface(surface: Surface) -> Self {
        Self {
            surface,
            view_model: Observable::new(None),
            title: RefCell::new(None),
            lifecycle: None,
            _marker: PhantomData,
        }
    }

    /// A view that goes in a content slot.
    #[must_use]
    pub fn element() -> Self {
        Self::with_surface(Surface::Element)
    }

    /// A view that goes on a navigation stack.
    #[must_use]
    pub fn page() -> Self {
        Self::with_surface(Surface::Page)
    }

    /// Give the view an activation lifecycle.
    #[must_use]
    pub fn with_activation(mut self) -> Self {
        self.lifecycle = Some(ActivationLifecycle::new(std::any::type_name::<Self>()));
        self
    }

    /// The bound view-model as `VM`, if one is bound and it is a `VM`.
    #[must_use]
    pub fn typed_view_model(&self) -> Option<Rc<VM>> {
        self.view_model.get().and_then(|vm| vm.downcast::<VM>())
    }

    /// Observable of the bound view-model.
    #[must_use]
    pub fn view_model_changes(&self) -> &Observable<Option<ViewModelRef>> {
        &self.view_model
    }

    /// Wrap into a shared [`ViewRef`].
    #[must_use]
    pub fn into_view(self) -> ViewRef {
        ViewRef::new(self)
    }
}

impl<VM: ViewModel> View for ReactiveView<VM> {
    fn surface(&self) -> Surface {
        self.surface
    }

    fn view_model(&self) -> Option<ViewModelRef> {
        self.view_model.get()
    }

    fn set_view_model(&self, view_model: Option<ViewModelRef>) {
        let unexpected = view_model
            .as_ref()
            .filter(|vm| vm.downcast_ref::<VM>().is_none());
        if let Some(vm) = unexpected {
            tracing::warn!(
                view = std::any::type_name::<Self>(),
                view_model = vm.type_name(),
                "binding a view-model of an unexpected type"
            );
        }
        self.view_model.set(view_model);
    }

    fn activation(&self) -> Option<&ActivationLifecycle> {
        self.lifecycle.as_ref()
    }

    fn title(&self) -> Option<String> {
        match self.surface {
            Surface::Page => self.title.borrow().clone(),
            Surface::Element => None,
        }
    }

    fn set_title(&self, title: Option<String>) {
        if self.surface == Surface::Page {
            *self.title.borrow_mut() = title;
        }
    }
}

impl<VM> fmt::Debug for ReactiveView<VM> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveView")
            .field("surface", &self.surface)
            .field("bound", &self.view_model.with(Option::is_some))
            .field("title", &self.title.borrow())
            .field("activatable", &self.lifecycle.is_some())
            .finish()
    }
}
