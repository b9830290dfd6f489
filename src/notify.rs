//!
//! Lifecycle notifications.
//!
//! Each view owns a [`Notifier`]. Anyone holding the notifier may observe the
//! view's lifecycle; views themselves subscribe to other views' notifiers
//! through [`Subscription`]s, which are detached when the subscribing view
//! closes.
//!

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::view::ViewId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The view is about to close. Emitted before any teardown.
    BeforeClose,
    /// The view has closed.
    Close,
    /// A child is about to be rendered into the view.
    BeforeRender,
    /// A child was rendered into the view.
    Render,
}

impl Notification {
    /// Event name, as in `onBeforeClose`.
    pub fn name(self) -> &'static str {
        match self {
            Notification::BeforeClose => "onBeforeClose",
            Notification::Close => "onClose",
            Notification::BeforeRender => "onBeforeRender",
            Notification::Render => "onRender",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(Notification, ViewId)>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    list: Vec<(ObserverId, Observer)>,
}

impl Observers {
    fn remove(&mut self, id: ObserverId) -> bool {
        match self.list.iter().position(|(it, _)| *it == id) {
            Some(index) => {
                self.list.remove(index);
                true
            }
            None => false,
        }
    }
}

/// A shared list of observers. Clones share the same list.
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Rc<RefCell<Observers>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, observer: impl Fn(Notification, ViewId) + 'static) -> ObserverId {
        let mut observers = self.observers.borrow_mut();
        let id = ObserverId(observers.next_id);
        observers.next_id += 1;
        observers.list.push((id, Rc::new(observer)));
        id
    }

    /// Returns false if the observer was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.observers.borrow_mut().remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().list.len()
    }

    /// Call every observer, in registration order.
    ///
    /// Observers registered or removed while emitting take effect from the next emit.
    pub fn emit(&self, notification: Notification, source: ViewId) {
        let snapshot: Vec<Observer> = self
            .observers
            .borrow()
            .list
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in snapshot {
            observer(notification, source);
        }
    }

    /// Observe, returning a subscription which removes the observer when dropped.
    pub fn subscribe(&self, observer: impl Fn(Notification, ViewId) + 'static) -> Subscription {
        let id = self.observe(observer);
        Subscription {
            observers: Rc::downgrade(&self.observers),
            id,
        }
    }
}

///
/// An observer registered in some notifier.
///
/// Holds the notifier weakly: a subscription never keeps
/// the observed view's notifier alive.
///
pub struct Subscription {
    observers: Weak<RefCell<Observers>>,
    id: ObserverId,
}

impl Subscription {
    /// Remove the observer now, rather than when the subscription is dropped.
    pub fn detach(self) {
        drop(self);
    }

    pub fn is_attached(&self) -> bool {
        match self.observers.upgrade() {
            Some(observers) => observers.borrow().list.iter().any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.borrow_mut().remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn source() -> ViewId {
        ViewId::next()
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(Notification::BeforeClose.name(), "onBeforeClose");
        assert_eq!(Notification::Close.name(), "onClose");
        assert_eq!(Notification::BeforeRender.name(), "onBeforeRender");
        assert_eq!(Notification::Render.to_string(), "onRender");
    }

    #[test]
    fn emit_in_registration_order() {
        let notifier = Notifier::new();
        let log = Rc::new(RefCell::new(vec![]));

        for tag in &["a", "b", "c"] {
            let log = log.clone();
            let tag = *tag;
            notifier.observe(move |notification, _| {
                log.borrow_mut().push(format!("{} {}", tag, notification));
            });
        }

        notifier.emit(Notification::Close, source());

        assert_eq!(
            *log.borrow(),
            vec!["a onClose", "b onClose", "c onClose"]
        );
    }

    #[test]
    fn unobserve() {
        let notifier = Notifier::new();
        let count = Rc::new(Cell::new(0));

        let id = {
            let count = count.clone();
            notifier.observe(move |_, _| count.set(count.get() + 1))
        };

        notifier.emit(Notification::Render, source());
        assert!(notifier.unobserve(id));
        assert!(!notifier.unobserve(id));
        notifier.emit(Notification::Render, source());

        assert_eq!(count.get(), 1);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn observer_may_unobserve_itself_while_emitting() {
        let notifier = Notifier::new();
        let count = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let id = {
            let emitter = notifier.clone();
            let count = count.clone();
            let slot = slot.clone();
            notifier.observe(move |_, _| {
                count.set(count.get() + 1);
                if let Some(id) = slot.get() {
                    emitter.unobserve(id);
                }
            })
        };
        slot.set(Some(id));

        notifier.emit(Notification::Close, source());
        notifier.emit(Notification::Close, source());

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_detaches_on_drop() {
        let notifier = Notifier::new();

        let subscription = notifier.subscribe(|_, _| {});
        assert!(subscription.is_attached());
        assert_eq!(notifier.observer_count(), 1);

        subscription.detach();
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn subscription_outlives_notifier() {
        let notifier = Notifier::new();
        let subscription = notifier.subscribe(|_, _| {});

        drop(notifier);

        assert!(!subscription.is_attached());
        subscription.detach();
    }
}
