//!
//! In-memory DOM, for rendering views without a browser.
//!

use crate::error::Error;
use crate::{Dom, Handler};

mod server_dom;

pub use server_dom::{ListenerId, Node, NodeKind, RcNode};

pub struct ServerDom {
    body: RcNode,
}

impl ServerDom {
    pub fn new() -> Self {
        Self {
            body: Node::create_element("body"),
        }
    }

    pub fn body(&self) -> RcNode {
        self.body.clone()
    }

    pub fn render(&self) -> String {
        self.body.to_string()
    }
}

impl Default for ServerDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for ServerDom {
    type Element = RcNode;
    type Listener = ListenerId;

    fn query(root: &RcNode, selector: &str) -> Option<RcNode> {
        root.query(selector)
    }

    fn empty(element: &RcNode) {
        element.empty();
    }

    fn append_element(parent: &RcNode, tag_name: &str) -> Result<RcNode, Error> {
        if parent.as_element().is_none() {
            return Err(Error::NotAnElement);
        }

        Ok(parent.append_child(Node::create_element(tag_name)))
    }

    fn append_text(parent: &RcNode, text: &str) -> Result<(), Error> {
        if parent.as_element().is_none() {
            return Err(Error::AppendChild);
        }

        parent.append_child(Node::create_text(text.to_string()));
        Ok(())
    }

    fn set_attribute(element: &RcNode, name: &str, value: &str) -> Result<(), Error> {
        if element.set_attribute(name, value) {
            Ok(())
        } else {
            Err(Error::SetAttribute)
        }
    }

    fn add_listener(element: &RcNode, event: &str, handler: Handler) -> Result<ListenerId, Error> {
        element.add_listener(event, handler).ok_or(Error::AddListener)
    }

    fn remove_listener(element: &RcNode, listener: ListenerId) {
        if !element.remove_listener(listener) {
            tracing::warn!(?listener, "listener was not bound");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_through_dom_trait() {
        let dom = ServerDom::new();
        let list = ServerDom::append_element(&dom.body(), "ul").unwrap();
        ServerDom::set_attribute(&list, "id", "items").unwrap();
        let item = ServerDom::append_element(&list, "li").unwrap();
        ServerDom::append_text(&item, "one").unwrap();

        assert_eq!(
            dom.render(),
            "<body><ul id=\"items\"><li>one</li></ul></body>"
        );

        let found = ServerDom::query(&dom.body(), "#items").unwrap();
        assert!(found.is(&list));

        ServerDom::empty(&found);
        assert_eq!(dom.render(), "<body><ul id=\"items\"/></body>");
    }

    #[test]
    fn text_nodes_reject_children() {
        let text = Node::create_text("plain".into());

        assert!(matches!(
            ServerDom::append_element(&text, "p"),
            Err(Error::NotAnElement)
        ));
        assert!(matches!(
            ServerDom::append_text(&text, "more"),
            Err(Error::AppendChild)
        ));
        assert!(matches!(
            ServerDom::set_attribute(&text, "id", "x"),
            Err(Error::SetAttribute)
        ));
    }
}
