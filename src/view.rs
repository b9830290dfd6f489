use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::error::Error;
use crate::notify::{Notification, Notifier, ObserverId, Subscription};
use crate::registry::Registry;
use crate::{Dom, Handler};

thread_local! {
    static NEXT_VIEW_ID: Cell<u64> = Cell::new(1);
    static LIVE_VIEWS: Cell<usize> = Cell::new(0);
}

/// Number of view cores currently alive on this thread.
pub fn live_views() -> usize {
    LIVE_VIEWS.with(|live| live.get())
}

/// Identity tag of a view, unique per thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    pub(crate) fn next() -> Self {
        NEXT_VIEW_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ViewId(id)
        })
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view{}", self.0)
    }
}

///
/// A view component.
///
/// The implementor owns a [`ViewCore`] and exposes it; everything the
/// lifecycle needs lives there. The assign/close operations come from the
/// [`Assign`](crate::Assign) trait, implemented for every view.
///
pub trait View<D: Dom> {
    fn core(&self) -> &ViewCore<D>;

    fn core_mut(&mut self) -> &mut ViewCore<D>;

    /// Render into the view's element.
    /// Called by the owner when the view is assigned, unless rendering was skipped.
    fn render(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Called once when the view starts closing, before its children are closed.
    fn on_close(&mut self) {}
}

struct DelegatedEvent {
    event: String,
    handler: Handler,
}

///
/// Lifecycle state of one view.
///
/// The core owns the view's root element reference, its registry of assigned
/// children, its DOM listeners and its subscriptions to other views.
///
pub struct ViewCore<D: Dom> {
    id: ViewId,
    element: Option<D::Element>,
    selector: Option<String>,
    closed: bool,
    registry: Option<Registry<D>>,
    events: Vec<DelegatedEvent>,
    listeners: Vec<D::Listener>,
    subscriptions: Vec<Subscription>,
    notifier: Notifier,
    config: Config,
}

impl<D: Dom> ViewCore<D> {
    /// A view core not yet bound to any element.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        LIVE_VIEWS.with(|live| live.set(live.get() + 1));

        Self {
            id: ViewId::next(),
            element: None,
            selector: None,
            closed: false,
            registry: None,
            events: vec![],
            listeners: vec![],
            subscriptions: vec![],
            notifier: Notifier::new(),
            config,
        }
    }

    /// A view core bound to an existing element, typically a root view.
    pub fn with_element(element: D::Element) -> Self {
        let mut core = Self::new();
        core.element = Some(element);
        core
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn element(&self) -> Option<&D::Element> {
        self.element.as_ref()
    }

    /// The selector this view is assigned to within its owner.
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The registry of assigned children, if one was ever created.
    pub fn registry(&self) -> Option<&Registry<D>> {
        self.registry.as_ref()
    }

    /// Rebind the view to another element, moving its delegated events along.
    pub fn set_element(&mut self, element: Option<D::Element>) {
        self.undelegate_events();
        self.element = element;
        self.delegate_events();
    }

    /// Declare a DOM event handler on the view's root element.
    ///
    /// The declaration survives rebinding: the handler follows the view to
    /// whatever element it is bound to next.
    pub fn delegate(&mut self, event: impl Into<String>, handler: impl Fn() + 'static) {
        let delegated = DelegatedEvent {
            event: event.into(),
            handler: Rc::new(handler),
        };

        if let Some(element) = &self.element {
            bind_listener::<D>(element, &delegated, &mut self.listeners);
        }

        self.events.push(delegated);
    }

    /// Bind every declared event handler to the current element.
    pub fn delegate_events(&mut self) {
        self.undelegate_events();

        if let Some(element) = &self.element {
            for delegated in &self.events {
                bind_listener::<D>(element, delegated, &mut self.listeners);
            }
        }
    }

    /// Remove every bound DOM listener. Declarations are kept.
    pub fn undelegate_events(&mut self) {
        let listeners = std::mem::take(&mut self.listeners);

        if let Some(element) = &self.element {
            for listener in listeners {
                D::remove_listener(element, listener);
            }
        }
    }

    pub fn bound_listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Subscribe to the notifications of another view.
    /// The subscription is detached by [`stop_listening`](Self::stop_listening).
    pub fn listen_to(
        &mut self,
        notifier: &Notifier,
        observer: impl Fn(Notification, ViewId) + 'static,
    ) {
        self.subscriptions.push(notifier.subscribe(observer));
    }

    pub fn stop_listening(&mut self) {
        self.subscriptions.clear();
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Observe this view's own lifecycle notifications.
    pub fn observe(&self, observer: impl Fn(Notification, ViewId) + 'static) -> ObserverId {
        self.notifier.observe(observer)
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.notifier.unobserve(id)
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.emit(notification, self.id);
    }

    pub(crate) fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub(crate) fn set_selector(&mut self, selector: String) {
        self.selector = Some(selector);
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry<D> {
        self.registry.get_or_insert_with(Registry::new)
    }

    pub(crate) fn existing_registry_mut(&mut self) -> Option<&mut Registry<D>> {
        self.registry.as_mut()
    }

    /// Empty the DOM subtree, then drop the element and the registry.
    pub(crate) fn release(&mut self) {
        if let Some(element) = self.element.take() {
            D::empty(&element);
        }
        self.registry = None;
    }

    pub(crate) fn profile(&self, operation: &'static str) {
        if self.config.memory_profile {
            tracing::debug!(
                target: "subview::memory_profile",
                cid = %self.id,
                sub_views = self.registry.as_ref().map(Registry::len).unwrap_or(0),
                live_views = live_views(),
                "{}",
                operation
            );
        }
    }
}

impl<D: Dom> Default for ViewCore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom> Drop for ViewCore<D> {
    fn drop(&mut self) {
        self.undelegate_events();
        let _ = LIVE_VIEWS.try_with(|live| live.set(live.get().saturating_sub(1)));
    }
}

impl<D: Dom> fmt::Debug for ViewCore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCore")
            .field("id", &self.id)
            .field("selector", &self.selector)
            .field("closed", &self.closed)
            .field("bound", &self.element.is_some())
            .field(
                "sub_views",
                &self.registry.as_ref().map(Registry::len).unwrap_or(0),
            )
            .finish()
    }
}

fn bind_listener<D: Dom>(
    element: &D::Element,
    delegated: &DelegatedEvent,
    listeners: &mut Vec<D::Listener>,
) {
    match D::add_listener(element, &delegated.event, delegated.handler.clone()) {
        Ok(listener) => listeners.push(listener),
        Err(error) => {
            tracing::warn!(event = %delegated.event, ?error, "failed to delegate event");
        }
    }
}
