#[derive(Debug)]
pub enum Error {
    AppendChild,
    SetAttribute,
    AddListener,
    NoDocument,
    NotAnElement,
    JsError,
    /// A render hook failed.
    Render(String),
}
