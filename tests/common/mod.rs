#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use subview::prelude::*;
use subview::server::ServerDom;

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(vec![]))
}

/// Drain everything recorded so far.
pub fn take(journal: &Journal) -> Vec<String> {
    std::mem::take(&mut *journal.borrow_mut())
}

/// Entries ending with the given suffix, e.g. a notification name.
pub fn ending_with(journal: &Journal, suffix: &str) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|entry| entry.ends_with(suffix))
        .cloned()
        .collect()
}

///
/// A view which renders a placeholder `<div id=...>` per slot, assigns its
/// nested panels into them, and records its lifecycle into a journal.
///
pub struct Panel {
    core: ViewCore<ServerDom>,
    name: &'static str,
    slots: Vec<&'static str>,
    nested: Vec<(&'static str, Panel)>,
    journal: Journal,
    fail_render: bool,
}

impl Panel {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self::from_core(ViewCore::new(), name, journal)
    }

    /// A root panel rendering straight into the document body.
    pub fn root(name: &'static str, journal: &Journal, dom: &ServerDom) -> Self {
        Self::from_core(ViewCore::with_element(dom.body()), name, journal)
    }

    pub fn with_config(name: &'static str, journal: &Journal, config: Config) -> Self {
        Self::from_core(ViewCore::with_config(config), name, journal)
    }

    fn from_core(core: ViewCore<ServerDom>, name: &'static str, journal: &Journal) -> Self {
        let log = journal.clone();
        core.observe(move |notification, _| {
            log.borrow_mut().push(format!("{} {}", name, notification));
        });

        Self {
            core,
            name,
            slots: vec![],
            nested: vec![],
            journal: journal.clone(),
            fail_render: false,
        }
    }

    pub fn slots(mut self, slots: &[&'static str]) -> Self {
        self.slots.extend_from_slice(slots);
        self
    }

    /// Assign `child` to `selector` when this panel renders.
    pub fn child(mut self, selector: &'static str, child: Panel) -> Self {
        self.nested.push((selector, child));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_render = true;
        self
    }
}

impl View<ServerDom> for Panel {
    fn core(&self) -> &ViewCore<ServerDom> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore<ServerDom> {
        &mut self.core
    }

    fn render(&mut self) -> Result<(), Error> {
        self.journal
            .borrow_mut()
            .push(format!("render {}", self.name));

        if self.fail_render {
            return Err(Error::Render(format!("{} refused to render", self.name)));
        }

        if let Some(element) = self.core.element().cloned() {
            for slot in &self.slots {
                let placeholder = ServerDom::append_element(&element, "div")?;
                ServerDom::set_attribute(&placeholder, "id", slot)?;
            }
        }

        for (selector, child) in std::mem::take(&mut self.nested) {
            self.assign((selector, child));
        }

        Ok(())
    }

    fn on_close(&mut self) {
        self.journal
            .borrow_mut()
            .push(format!("on_close {}", self.name));
    }
}
