use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::Handler;

pub type RcNode = Rc<Node>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

thread_local! {
    static NEXT_LISTENER_ID: Cell<u64> = Cell::new(1);
}

pub struct Node {
    pub kind: NodeKind,

    links: RefCell<Links>,
}

pub enum NodeKind {
    Text(RefCell<String>),
    Element(Element),
}

pub struct Element {
    tag_name: String,
    attributes: RefCell<Vec<(String, String)>>,
    listeners: RefCell<Vec<(ListenerId, String, Handler)>>,
}

#[derive(Default)]
struct Links {
    parent: Option<Weak<Node>>,
    children: Vec<RcNode>,
}

impl Node {
    pub fn is(&self, other: &Node) -> bool {
        std::ptr::eq(self, other)
    }

    pub fn create_element(tag_name: &str) -> RcNode {
        Rc::new(Node {
            kind: NodeKind::Element(Element {
                tag_name: tag_name.to_string(),
                attributes: RefCell::new(vec![]),
                listeners: RefCell::new(vec![]),
            }),
            links: RefCell::new(Links::default()),
        })
    }

    pub fn create_text(text: String) -> RcNode {
        Rc::new(Node {
            kind: NodeKind::Text(RefCell::new(text)),
            links: RefCell::new(Links::default()),
        })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|element| element.tag_name.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let element = self.as_element()?;
        let attributes = element.attributes.borrow();
        attributes
            .iter()
            .find(|(it, _)| it == name)
            .map(|(_, value)| value.clone())
    }

    /// Returns false for text nodes, which have no attributes.
    pub fn set_attribute(&self, name: &str, value: &str) -> bool {
        match self.as_element() {
            Some(element) => {
                let mut attributes = element.attributes.borrow_mut();
                match attributes.iter_mut().find(|(it, _)| it == name) {
                    Some((_, old)) => *old = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                true
            }
            None => false,
        }
    }

    pub fn parent(&self) -> Option<RcNode> {
        self.links
            .borrow()
            .parent
            .as_ref()
            .and_then(|parent| parent.upgrade())
    }

    pub fn children(&self) -> Vec<RcNode> {
        self.links.borrow().children.clone()
    }

    pub fn first_child(&self) -> Option<RcNode> {
        self.links.borrow().children.first().cloned()
    }

    pub fn append_child(self: &Rc<Self>, child: RcNode) -> RcNode {
        child.unlink();

        child.links.borrow_mut().parent = Some(Rc::downgrade(self));
        self.links.borrow_mut().children.push(child.clone());

        child
    }

    pub fn remove_child(&self, child: RcNode) -> RcNode {
        child.unlink();
        child
    }

    /// Remove all children.
    pub fn empty(&self) {
        let children = std::mem::take(&mut self.links.borrow_mut().children);
        for child in children {
            child.links.borrow_mut().parent = None;
        }
    }

    /// Unlink from current child list
    fn unlink(&self) {
        let parent = self.links.borrow_mut().parent.take();

        if let Some(parent) = parent.and_then(|parent| parent.upgrade()) {
            parent
                .links
                .borrow_mut()
                .children
                .retain(|child| !child.is(self));
        }
    }

    /// Whether this node matches a simple selector: `tag`, `#id`, `.class`,
    /// or a compound of those like `ul#items.wide`.
    pub fn matches(&self, selector: &str) -> bool {
        let tag_name = match self.tag_name() {
            Some(tag_name) => tag_name,
            None => return false,
        };

        let selector = match SimpleSelector::parse(selector) {
            Some(selector) => selector,
            None => return false,
        };

        if let Some(tag) = selector.tag {
            if !tag.eq_ignore_ascii_case(tag_name) {
                return false;
            }
        }

        if let Some(id) = selector.id {
            if self.attribute("id").as_deref() != Some(id) {
                return false;
            }
        }

        if !selector.classes.is_empty() {
            let class = self.attribute("class").unwrap_or_default();
            if !selector
                .classes
                .iter()
                .all(|wanted| class.split_whitespace().any(|it| it == *wanted))
            {
                return false;
            }
        }

        true
    }

    /// First descendant matching the selector, in document order.
    pub fn query(&self, selector: &str) -> Option<RcNode> {
        for child in self.children() {
            if child.matches(selector) {
                return Some(child);
            }
            if let Some(found) = child.query(selector) {
                return Some(found);
            }
        }
        None
    }

    pub fn add_listener(&self, event: &str, handler: Handler) -> Option<ListenerId> {
        let element = self.as_element()?;
        let id = NEXT_LISTENER_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ListenerId(id)
        });
        element
            .listeners
            .borrow_mut()
            .push((id, event.to_string(), handler));
        Some(id)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        match self.as_element() {
            Some(element) => {
                let mut listeners = element.listeners.borrow_mut();
                let before = listeners.len();
                listeners.retain(|(it, _, _)| *it != id);
                listeners.len() != before
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.as_element()
            .map(|element| element.listeners.borrow().len())
            .unwrap_or(0)
    }

    /// Invoke the listeners for an event on this node.
    /// Returns the number of handlers called.
    pub fn dispatch(&self, event: &str) -> usize {
        let handlers: Vec<Handler> = match self.as_element() {
            Some(element) => element
                .listeners
                .borrow()
                .iter()
                .filter(|(_, it, _)| it == event)
                .map(|(_, _, handler)| handler.clone())
                .collect(),
            None => vec![],
        };

        for handler in &handlers {
            handler();
        }

        handlers.len()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Element(element) => {
                write!(f, "<{}", element.tag_name)?;

                for (name, value) in element.attributes.borrow().iter() {
                    write!(f, " {}=\"{}\"", name, escape(value))?;
                }

                let children = self.children();
                if children.is_empty() {
                    f.write_str("/>")
                } else {
                    f.write_str(">")?;
                    for child in children {
                        write!(f, "{}", child)?;
                    }
                    write!(f, "</{}>", element.tag_name)
                }
            }
            NodeKind::Text(text) => f.write_str(&escape(&text.borrow())),
        }
    }
}

fn escape(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            _ => buf.push(c),
        }
    }
    buf
}

#[derive(Default)]
struct SimpleSelector<'s> {
    tag: Option<&'s str>,
    id: Option<&'s str>,
    classes: Vec<&'s str>,
}

impl<'s> SimpleSelector<'s> {
    fn parse(selector: &'s str) -> Option<Self> {
        let selector = selector.trim();
        if selector.is_empty() || selector.contains(char::is_whitespace) {
            return None;
        }

        let is_marker = |c: char| c == '#' || c == '.';
        let mut parsed = SimpleSelector::default();

        let head = selector.find(is_marker).unwrap_or(selector.len());
        if head > 0 {
            parsed.tag = Some(&selector[..head]);
        }

        let mut rest = &selector[head..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(is_marker).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }

            match marker {
                '#' => parsed.id = Some(name),
                _ => parsed.classes.push(name),
            }

            rest = &body[end..];
        }

        Some(parsed)
    }
}
