//!
//! Browser DOM, through web-sys.
//!

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::Error;
use crate::{Dom, Handler};

pub struct WebDom;

impl WebDom {
    pub fn document() -> Result<web_sys::Document, Error> {
        let window = web_sys::window().ok_or(Error::NoDocument)?;
        window.document().ok_or(Error::NoDocument)
    }

    pub fn body() -> Result<web_sys::Element, Error> {
        let body = Self::document()?.body().ok_or(Error::NoDocument)?;
        Ok(body.into())
    }
}

/// A bound event listener. The closure must stay alive while it is registered.
pub struct WebListener {
    event: String,
    closure: Closure<dyn Fn(web_sys::Event)>,
}

impl Dom for WebDom {
    type Element = web_sys::Element;
    type Listener = WebListener;

    fn query(root: &web_sys::Element, selector: &str) -> Option<web_sys::Element> {
        match root.query_selector(selector) {
            Ok(found) => found,
            Err(_) => {
                tracing::warn!(selector, "invalid selector");
                None
            }
        }
    }

    fn empty(element: &web_sys::Element) {
        element.set_inner_html("");
    }

    fn append_element(parent: &web_sys::Element, tag_name: &str) -> Result<web_sys::Element, Error> {
        let document = parent.owner_document().ok_or(Error::NoDocument)?;
        let element = document.create_element(tag_name)?;
        parent
            .append_child(&element)
            .map_err(|_| Error::AppendChild)?;

        Ok(element)
    }

    fn append_text(parent: &web_sys::Element, text: &str) -> Result<(), Error> {
        let document = parent.owner_document().ok_or(Error::NoDocument)?;
        let node = document.create_text_node(text);
        parent.append_child(&node).map_err(|_| Error::AppendChild)?;

        Ok(())
    }

    fn set_attribute(element: &web_sys::Element, name: &str, value: &str) -> Result<(), Error> {
        element
            .set_attribute(name, value)
            .map_err(|_| Error::SetAttribute)
    }

    fn add_listener(
        element: &web_sys::Element,
        event: &str,
        handler: Handler,
    ) -> Result<WebListener, Error> {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            handler();
        }) as Box<dyn Fn(web_sys::Event)>);

        element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|_| Error::AddListener)?;

        Ok(WebListener {
            event: event.to_string(),
            closure,
        })
    }

    fn remove_listener(element: &web_sys::Element, listener: WebListener) {
        let result = element.remove_event_listener_with_callback(
            &listener.event,
            listener.closure.as_ref().unchecked_ref(),
        );

        if result.is_err() {
            tracing::warn!(event = %listener.event, "failed to remove listener");
        }
    }
}

impl From<wasm_bindgen::JsValue> for Error {
    fn from(_js_error: wasm_bindgen::JsValue) -> Self {
        Error::JsError
    }
}
