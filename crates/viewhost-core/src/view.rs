#![forbid(unsafe_code)]

//! View-models, views, and the handles the hosts pass around.
//!
//! Both [`ViewModelRef`] and [`ViewRef`] compare by *identity* (the address
//! of the shared allocation), never by content. Two structurally equal
//! view-models are different view-models if they are different objects.
//!
//! # Capabilities
//!
//! A [`View`] advertises what it can do through its methods rather than
//! through a type hierarchy:
//!
//! - [`View::surface`] says where it can be displayed (inside a content slot
//!   or as a navigation page). Hosts check it after resolution.
//! - [`View::activation`] returns `Some` when the view wants activation
//!   callbacks; hosts treat `None` as a no-op activation.
//! - [`View::set_title`] is honored by page-like views only.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::activation::ActivationLifecycle;

/// Type-erasure helper implemented for every `'static` type.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into `Rc<dyn Any>` for downcasting.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Presentation-agnostic state object.
///
/// The only optional shape is a URL-path-segment-like identifier, which the
/// navigation synchronizer uses as the page title.
pub trait ViewModel: AsAny {
    /// Short identifier for this view-model, used as a display title.
    fn url_path_segment(&self) -> Option<String> {
        None
    }

    /// Concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared, identity-compared handle to a view-model.
#[derive(Clone)]
pub struct ViewModelRef(Rc<dyn ViewModel>);

impl ViewModelRef {
    /// Wrap a view-model in a new shared handle.
    pub fn new<VM: ViewModel>(view_model: VM) -> Self {
        Self(Rc::new(view_model))
    }

    /// Wrap an existing shared view-model.
    pub fn from_rc<VM: ViewModel>(view_model: Rc<VM>) -> Self {
        Self(view_model)
    }

    /// `TypeId` of the concrete view-model type (the locator's lookup key).
    #[must_use]
    pub fn view_model_type(&self) -> TypeId {
        Any::type_id(AsAny::as_any(&*self.0))
    }

    /// Concrete type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// See [`ViewModel::url_path_segment`].
    #[must_use]
    pub fn url_path_segment(&self) -> Option<String> {
        self.0.url_path_segment()
    }

    /// Borrow the view-model as a concrete type.
    #[must_use]
    pub fn downcast_ref<VM: ViewModel>(&self) -> Option<&VM> {
        AsAny::as_any(&*self.0).downcast_ref::<VM>()
    }

    /// Get a typed shared handle to the view-model.
    #[must_use]
    pub fn downcast<VM: ViewModel>(&self) -> Option<Rc<VM>> {
        AsAny::into_any_rc(Rc::clone(&self.0)).downcast::<VM>().ok()
    }

    /// Whether `self` and `other` are the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for ViewModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ViewModelRef {}

impl fmt::Debug for ViewModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelRef")
            .field("type", &self.type_name())
            .field("segment", &self.url_path_segment())
            .finish()
    }
}

/// Where a view can be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Surface {
    /// A node that can be placed in a content slot.
    Element,
    /// A page that can be pushed onto a navigation stack.
    Page,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => f.write_str("element"),
            Self::Page => f.write_str("page"),
        }
    }
}

/// A resolved UI object bound to at most one view-model at a time.
///
/// Methods take `&self`; implementations use interior mutability because
/// views are shared between a host and the native tree.
pub trait View: AsAny {
    /// Display surface this view satisfies.
    fn surface(&self) -> Surface;

    /// The currently bound view-model.
    fn view_model(&self) -> Option<ViewModelRef>;

    /// Bind `view_model` (or unbind with `None`).
    fn set_view_model(&self, view_model: Option<ViewModelRef>);

    /// Activation capability, if the view supports it.
    fn activation(&self) -> Option<&ActivationLifecycle> {
        None
    }

    /// Displayed title, for views that have one.
    fn title(&self) -> Option<String> {
        None
    }

    /// Set the displayed title. Ignored by views without one.
    fn set_title(&self, _title: Option<String>) {}

    /// Concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared, identity-compared handle to a view.
#[derive(Clone)]
pub struct ViewRef(Rc<dyn View>);

impl ViewRef {
    /// Wrap a view in a new shared handle.
    pub fn new<V: View>(view: V) -> Self {
        Self(Rc::new(view))
    }

    /// Wrap an existing shared view.
    pub fn from_rc<V: View>(view: Rc<V>) -> Self {
        Self(view)
    }

    /// Borrow the view as a concrete type.
    #[must_use]
    pub fn downcast_ref<V: View>(&self) -> Option<&V> {
        AsAny::as_any(&*self.0).downcast_ref::<V>()
    }

    /// Whether `self` and `other` are the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// Whether this view is bound to exactly `view_model` (by identity).
    #[must_use]
    pub fn is_bound_to(&self, view_model: &ViewModelRef) -> bool {
        self.0
            .view_model()
            .is_some_and(|bound| bound.ptr_eq(view_model))
    }
}

impl std::ops::Deref for ViewRef {
    type Target = dyn View;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for ViewRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ViewRef {}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRef")
            .field("type", &self.0.type_name())
            .field("surface", &self.0.surface())
            .finish()
    }
}
