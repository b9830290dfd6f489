use crate::assign::ChildRef;
use crate::view::{View, ViewId};
use crate::Dom;

///
/// The sub-views of one owner, keyed by the selector each is assigned to.
///
/// Entries iterate in insertion order. Replacing the view under an existing
/// selector keeps that selector's position.
///
pub struct Registry<D: Dom> {
    entries: Vec<(String, Box<dyn View<D>>)>,
}

impl<D: Dom> Registry<D> {
    pub(crate) fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.position(selector).is_some()
    }

    pub fn get(&self, selector: &str) -> Option<&dyn View<D>> {
        self.position(selector)
            .map(|index| self.entries[index].1.as_ref())
    }

    pub(crate) fn get_mut(&mut self, selector: &str) -> Option<&mut Box<dyn View<D>>> {
        match self.position(selector) {
            Some(index) => Some(&mut self.entries[index].1),
            None => None,
        }
    }

    /// Selector of the registered view with the given identity.
    pub fn selector_of(&self, id: ViewId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, view)| view.core().id() == id)
            .map(|(selector, _)| selector.as_str())
    }

    /// Snapshot of the current selectors, in insertion order.
    pub fn selectors(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(selector, _)| selector.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn View<D>)> {
        self.entries
            .iter()
            .map(|(selector, view)| (selector.as_str(), view.as_ref()))
    }

    ///
    /// Resolve a child reference to the registry key of the child it names.
    ///
    /// The key is the selector recorded on the child itself, so a child only
    /// resolves while it is registered under its own selector.
    ///
    pub(crate) fn resolve(&self, child: &ChildRef) -> Option<String> {
        let view = match child {
            ChildRef::Selector(selector) => self.get(selector)?,
            ChildRef::Id(id) => {
                let selector = self.selector_of(*id)?;
                self.get(selector)?
            }
        };

        let recorded = view.core().selector()?;
        if self.contains(recorded) {
            Some(recorded.to_string())
        } else {
            None
        }
    }

    pub(crate) fn insert(
        &mut self,
        selector: String,
        view: Box<dyn View<D>>,
    ) -> Option<Box<dyn View<D>>> {
        match self.position(&selector) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, view)),
            None => {
                self.entries.push((selector, view));
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, selector: &str) -> Option<Box<dyn View<D>>> {
        let index = self.position(selector)?;
        Some(self.entries.remove(index).1)
    }

    fn position(&self, selector: &str) -> Option<usize> {
        self.entries.iter().position(|(it, _)| it == selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerDom;
    use crate::view::ViewCore;

    struct Blank(ViewCore<ServerDom>);

    impl View<ServerDom> for Blank {
        fn core(&self) -> &ViewCore<ServerDom> {
            &self.0
        }

        fn core_mut(&mut self) -> &mut ViewCore<ServerDom> {
            &mut self.0
        }
    }

    fn blank(selector: &str) -> Box<dyn View<ServerDom>> {
        let mut core = ViewCore::new();
        core.set_selector(selector.to_string());
        Box::new(Blank(core))
    }

    #[test]
    fn insertion_order() {
        let mut registry = Registry::new();
        registry.insert("#b".into(), blank("#b"));
        registry.insert("#a".into(), blank("#a"));
        registry.insert("#c".into(), blank("#c"));

        assert_eq!(registry.selectors(), vec!["#b", "#a", "#c"]);

        registry.remove("#a");
        registry.insert("#a".into(), blank("#a"));

        assert_eq!(registry.selectors(), vec!["#b", "#c", "#a"]);

        let listed: Vec<(&str, Option<&str>)> = registry
            .iter()
            .map(|(selector, view)| (selector, view.core().selector()))
            .collect();
        assert_eq!(
            listed,
            vec![("#b", Some("#b")), ("#c", Some("#c")), ("#a", Some("#a"))]
        );
    }

    #[test]
    fn replace_keeps_position() {
        let mut registry = Registry::new();
        registry.insert("#a".into(), blank("#a"));
        registry.insert("#b".into(), blank("#b"));

        let replacement = blank("#a");
        let replacement_id = replacement.core().id();
        let old = registry.insert("#a".into(), replacement).unwrap();

        assert_ne!(old.core().id(), replacement_id);
        assert_eq!(registry.selectors(), vec!["#a", "#b"]);
        assert_eq!(registry.get("#a").unwrap().core().id(), replacement_id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_by_selector_and_id() {
        let mut registry = Registry::new();
        let view = blank("#a");
        let id = view.core().id();
        registry.insert("#a".into(), view);

        assert_eq!(registry.resolve(&ChildRef::from("#a")).as_deref(), Some("#a"));
        assert_eq!(registry.resolve(&ChildRef::from(id)).as_deref(), Some("#a"));
        assert_eq!(registry.selector_of(id), Some("#a"));

        assert!(registry.resolve(&ChildRef::from("#missing")).is_none());

        let stranger = blank("#a");
        assert!(registry.resolve(&ChildRef::from(stranger.core().id())).is_none());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut registry: Registry<ServerDom> = Registry::new();
        assert!(registry.remove("#nothing").is_none());
        assert!(registry.is_empty());
    }
}
