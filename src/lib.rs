#![forbid(unsafe_code)]

//!
//! The subview crate gives DOM views explicit ownership of their children.
//!
//! A view "assigns" child views to placeholder regions (selectors) of its
//! rendered markup. The owner keeps the children in a per-instance registry,
//! and closing the owner tears every child down first, then detaches the
//! owner's own listeners and releases its DOM references.
//!

use std::rc::Rc;

pub mod assign;
pub mod config;
pub mod error;
pub mod notify;
pub mod prelude;
pub mod registry;
pub mod server;
pub mod view;

#[cfg(feature = "web")]
pub mod web;

pub use assign::{Assign, AssignOptions, Assignment, ChildRef};
pub use config::Config;
pub use error::Error;
pub use notify::{Notification, Notifier, ObserverId, Subscription};
pub use registry::Registry;
pub use view::{live_views, View, ViewCore, ViewId};

/// A DOM event handler.
pub type Handler = Rc<dyn Fn()>;

///
/// Abstraction over the DOM that views are rendered into.
///
/// Every operation is an associated function working directly on elements,
/// so views never need to hold on to a document object.
///
pub trait Dom: Sized + 'static {
    type Element: Clone;

    /// Handle for a bound event listener, needed to remove it again.
    type Listener;

    /// Find the first descendant of `root` matching `selector`, in document order.
    /// The root itself is never a match.
    fn query(root: &Self::Element, selector: &str) -> Option<Self::Element>;

    /// Remove all children of the element.
    fn empty(element: &Self::Element);

    fn append_element(parent: &Self::Element, tag_name: &str) -> Result<Self::Element, Error>;

    fn append_text(parent: &Self::Element, text: &str) -> Result<(), Error>;

    fn set_attribute(element: &Self::Element, name: &str, value: &str) -> Result<(), Error>;

    fn add_listener(
        element: &Self::Element,
        event: &str,
        handler: Handler,
    ) -> Result<Self::Listener, Error>;

    fn remove_listener(element: &Self::Element, listener: Self::Listener);
}
