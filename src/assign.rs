//!
//! Assigning sub-views to selectors, and closing them again.
//!
//! Every [`View`] gets these operations through the [`Assign`] trait.
//! An owner assigns children to placeholder regions of its markup:
//!
//! ```ignore
//! owner.assign(("#list", ListView::new()));
//! owner.assign(
//!     Assignment::new()
//!         .view("#header", Header::new())
//!         .view("#footer", Footer::new()),
//! );
//! ```
//!
//! and closing the owner closes every child first.
//!

use std::fmt;

use crate::notify::Notification;
use crate::registry::Registry;
use crate::view::{View, ViewId};
use crate::Dom;

/// Names a child either by the selector it is assigned to, or by identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildRef {
    Selector(String),
    Id(ViewId),
}

impl From<&str> for ChildRef {
    fn from(selector: &str) -> Self {
        ChildRef::Selector(selector.to_string())
    }
}

impl From<String> for ChildRef {
    fn from(selector: String) -> Self {
        ChildRef::Selector(selector)
    }
}

impl From<&String> for ChildRef {
    fn from(selector: &String) -> Self {
        ChildRef::Selector(selector.clone())
    }
}

impl From<ViewId> for ChildRef {
    fn from(id: ViewId) -> Self {
        ChildRef::Id(id)
    }
}

impl fmt::Display for ChildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildRef::Selector(selector) => f.write_str(selector),
            ChildRef::Id(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssignOptions {
    /// Bind the children to their elements without rendering them.
    pub no_render: bool,
}

impl AssignOptions {
    pub fn no_render() -> Self {
        Self { no_render: true }
    }
}

///
/// An ordered batch of (selector, view) pairs.
///
/// Pairs are attached in the order they were added. Nothing is reordered or
/// deduplicated: a selector given twice is assigned twice.
///
pub struct Assignment<D: Dom> {
    pairs: Vec<(String, Box<dyn View<D>>)>,
}

impl<D: Dom> Assignment<D> {
    pub fn new() -> Self {
        Self { pairs: vec![] }
    }

    pub fn view(self, selector: impl Into<String>, view: impl View<D> + 'static) -> Self {
        self.boxed(selector, Box::new(view))
    }

    pub fn boxed(mut self, selector: impl Into<String>, view: Box<dyn View<D>>) -> Self {
        self.pairs.push((selector.into(), view));
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<D: Dom> Default for Assignment<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom, S: Into<String>, V: View<D> + 'static> From<(S, V)> for Assignment<D> {
    fn from((selector, view): (S, V)) -> Self {
        Self::new().view(selector, view)
    }
}

impl<D: Dom, S: Into<String>, V: View<D> + 'static> From<Vec<(S, V)>> for Assignment<D> {
    fn from(pairs: Vec<(S, V)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |assignment, (selector, view)| {
                assignment.view(selector, view)
            })
    }
}

impl<D: Dom, S: Into<String>> std::iter::FromIterator<(S, Box<dyn View<D>>)> for Assignment<D> {
    fn from_iter<I: IntoIterator<Item = (S, Box<dyn View<D>>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |assignment, (selector, view)| {
                assignment.boxed(selector, view)
            })
    }
}

///
/// Sub-view ownership for views.
///
/// Implemented for every [`View`], including `dyn View`. All operations
/// return the owner, so they chain. None of them fail: irregularities are
/// logged and skipped, so that a teardown cascade always runs to completion.
///
pub trait Assign<D: Dom>: View<D> {
    /// This view's registry, created empty on first access.
    fn sub_views(&mut self) -> &Registry<D> {
        self.core_mut().registry_mut()
    }

    /// Whether the child is registered under its own recorded selector.
    fn has_sub_view(&self, child: impl Into<ChildRef>) -> bool {
        resolve(self, &child.into()).is_some()
    }

    fn sub_view(&self, child: impl Into<ChildRef>) -> Option<&dyn View<D>> {
        let selector = resolve(self, &child.into())?;
        self.core().registry()?.get(&selector)
    }

    fn sub_view_mut(&mut self, child: impl Into<ChildRef>) -> Option<&mut (dyn View<D> + 'static)> {
        let selector = resolve(self, &child.into())?;
        let view = self.core_mut().existing_registry_mut()?.get_mut(&selector)?;
        Some(view.as_mut())
    }

    fn assign(&mut self, views: impl Into<Assignment<D>>) -> &mut Self {
        self.assign_with(views, AssignOptions::default())
    }

    ///
    /// Assign each view to its selector within this view.
    ///
    /// Per pair: a view already assigned to the selector is closed first,
    /// then the incoming view is bound to the element matching the selector,
    /// rendered (unless `no_render`), and registered.
    ///
    fn assign_with(&mut self, views: impl Into<Assignment<D>>, options: AssignOptions) -> &mut Self {
        let assignment = views.into();

        if self.core().is_closed() {
            tracing::warn!(
                cid = %self.core().id(),
                views = assignment.len(),
                "attempt to assign to a closed view"
            );
            return self;
        }

        for (selector, view) in assignment.pairs {
            attach(self, selector, view, options);
        }

        self
    }

    /// Close one sub-view and remove it from the registry.
    fn close_sub_view(&mut self, child: impl Into<ChildRef>) -> &mut Self {
        close_child(self, child.into());
        self
    }

    /// Close every sub-view, in registration order.
    fn close_sub_views(&mut self) -> &mut Self {
        close_children(self);
        self
    }

    ///
    /// Close this view.
    ///
    /// 1. `onBeforeClose` is emitted.
    /// 2. [`View::on_close`] is called.
    /// 3. Sub-views are closed in turn.
    /// 4. Subscriptions and DOM listeners are detached.
    /// 5. The element is emptied and released, along with the registry.
    /// 6. `onClose` is emitted.
    ///
    /// Closing a closed view does nothing.
    ///
    fn close(&mut self) -> &mut Self {
        if self.core().is_closed() {
            tracing::debug!(
                cid = %self.core().id(),
                "attempt to close view that was already closed"
            );
            return self;
        }

        let _close = tracing::debug_span!(
            "close",
            cid = %self.core().id(),
            selector = ?self.core().selector()
        )
        .entered();

        self.core().notify(Notification::BeforeClose);
        self.on_close();
        close_children(self);

        let core = self.core_mut();
        core.stop_listening();
        core.undelegate_events();
        core.release();
        core.set_closed(true);
        core.profile("close");
        core.notify(Notification::Close);

        self
    }
}

impl<D: Dom, V: View<D> + ?Sized> Assign<D> for V {}

fn resolve<D: Dom, V: View<D> + ?Sized>(owner: &V, child: &ChildRef) -> Option<String> {
    owner.core().registry()?.resolve(child)
}

fn attach<D: Dom, V: View<D> + ?Sized>(
    owner: &mut V,
    selector: String,
    mut view: Box<dyn View<D>>,
    options: AssignOptions,
) {
    let _open = tracing::debug_span!(
        "open",
        cid = %view.core().id(),
        selector = %selector
    )
    .entered();

    if resolve(owner, &ChildRef::Selector(selector.clone())).is_some() {
        close_child(owner, ChildRef::Selector(selector.clone()));
    }

    let element = owner
        .core()
        .element()
        .and_then(|root| D::query(root, &selector));

    if element.is_none() {
        tracing::warn!(
            owner = %owner.core().id(),
            selector = %selector,
            "no element matches selector"
        );
    }

    view.core_mut().set_element(element);

    if !options.no_render {
        owner.core().notify(Notification::BeforeRender);
        view.core_mut().set_closed(false);
        if let Err(error) = view.render() {
            tracing::warn!(cid = %view.core().id(), ?error, "render failed");
        }
        owner.core().notify(Notification::Render);
    }

    view.core_mut().set_selector(selector.clone());

    let core = owner.core_mut();
    core.registry_mut().insert(selector, view);
    core.profile("assign");
}

fn close_child<D: Dom, V: View<D> + ?Sized>(owner: &mut V, child: ChildRef) {
    let selector = match resolve(owner, &child) {
        Some(selector) => selector,
        None => {
            tracing::debug!(owner = %owner.core().id(), child = %child, "no sub-view to close");
            return;
        }
    };

    let core = owner.core_mut();

    if let Some(registry) = core.existing_registry_mut() {
        if let Some(view) = registry.get_mut(&selector) {
            view.close();
        }
        registry.remove(&selector);
    }

    core.profile("close sub-view");
}

fn close_children<D: Dom, V: View<D> + ?Sized>(owner: &mut V) {
    let selectors = match owner.core().registry() {
        Some(registry) => registry.selectors(),
        None => return,
    };

    for selector in selectors {
        close_child(owner, ChildRef::Selector(selector));
    }
}
