//! Crate-level errors and the load-time error callback.

use thiserror::Error;

use crate::{
    element::{AttribLookup, Element},
    localization::{Localization, Message},
    types::Date,
};

/// Failures outside the entity layer: I/O, XML syntax and binary encodings.
#[derive(Error, Debug)]
pub enum ArbError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute.
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Text was not UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Bad base64 payload.
    #[error("base64 error: {0}")]
    Base64(#[from] base64ct::Error),

    /// Bad JSON action script.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structure the reader cannot represent.
    #[error("malformed document: {0}")]
    Format(String),

    /// The entity loader rejected the document; details went to the error callback.
    #[error("document failed to load")]
    Load,
}

/// Shorthand for results carrying [`ArbError`].
pub type ArbResult<T> = Result<T, ArbError>;

/// Receives diagnostics while a document loads.
pub trait ErrorCallback {
    /// Records a non-interactive message.
    fn log_message(&mut self, msg: &str);

    /// Asks whether to continue past a problem. Defaults to abort.
    fn on_error(&mut self, _msg: &str) -> bool {
        false
    }
}

/// Error callback that accumulates every logged line.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    /// Logged messages in order.
    pub messages: Vec<String>,
    /// Answer returned from [`ErrorCallback::on_error`].
    pub continue_on_error: bool,
}

impl ErrorLog {
    /// An empty log that aborts on errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages, one per line.
    pub fn text(&self) -> String {
        self.messages.join("\n")
    }
}

impl ErrorCallback for ErrorLog {
    fn log_message(&mut self, msg: &str) {
        tracing::debug!(msg, "load diagnostic");
        self.messages.push(msg.to_string());
    }

    fn on_error(&mut self, msg: &str) -> bool {
        self.messages.push(msg.to_string());
        self.continue_on_error
    }
}

/// Everything an entity loader needs besides the tree itself.
pub struct LoadContext<'a> {
    /// Source of user-facing text.
    pub loc: &'a dyn Localization,
    /// Receiver of diagnostics.
    pub errors: &'a mut dyn ErrorCallback,
}

impl<'a> LoadContext<'a> {
    /// Bundles a localization provider and an error sink.
    pub fn new(loc: &'a dyn Localization, errors: &'a mut dyn ErrorCallback) -> Self {
        Self { loc, errors }
    }

    /// Localizes and logs a message.
    pub fn log(&mut self, msg: Message<'_>) {
        let text = self.loc.message(&msg);
        self.errors.log_message(&text);
    }

    /// Logs a missing required attribute. Returns `None` so loaders can
    /// `return ctx.missing(..)`.
    pub fn missing<T>(&mut self, element: &str, attrib: &str) -> Option<T> {
        self.log(Message::MissingAttribute {
            element,
            attrib,
            detail: None,
        });
        None
    }

    /// Logs an unusable attribute value.
    pub fn invalid<T>(&mut self, element: &str, attrib: &str, detail: Option<&str>) -> Option<T> {
        self.log(Message::InvalidAttributeValue {
            element,
            attrib,
            detail,
        });
        None
    }

    /// Logs an unparsable date, quoting the raw text.
    pub fn invalid_date<T>(&mut self, tree: &Element, attrib: &str) -> Option<T> {
        let detail = format!(
            "{}{}",
            self.loc.message(&Message::InvalidDate),
            tree.raw_attrib(attrib).unwrap_or("")
        );
        self.invalid(tree.name(), attrib, Some(&detail))
    }

    /// Logs an invalid boolean.
    pub fn invalid_bool<T>(&mut self, element: &str, attrib: &str) -> Option<T> {
        let detail = self.loc.message(&Message::ValidValuesBool);
        self.invalid(element, attrib, Some(&detail))
    }

    /// Logs a value outside an enumerated set, listing the valid spellings.
    pub fn invalid_choice<T>(&mut self, element: &str, attrib: &str, valid: &[&str]) -> Option<T> {
        let detail = format!("{}{}", self.loc.message(&Message::ValidValues), valid.join(", "));
        self.invalid(element, attrib, Some(&detail))
    }

    /// Optional date: absent is `Some(None)`, unparsable logs and is `None`.
    pub fn opt_date(&mut self, tree: &Element, attrib: &str) -> Option<Option<Date>> {
        match tree.attrib::<Date>(attrib) {
            AttribLookup::Found(date) => Some(Some(date)),
            AttribLookup::NotFound => Some(None),
            AttribLookup::Invalid => self.invalid_date(tree, attrib),
        }
    }

    /// Required date.
    pub fn required_date(&mut self, tree: &Element, attrib: &str) -> Option<Date> {
        match tree.attrib::<Date>(attrib) {
            AttribLookup::Found(date) => Some(date),
            AttribLookup::NotFound => self.missing(tree.name(), attrib),
            AttribLookup::Invalid => self.invalid_date(tree, attrib),
        }
    }

    /// Optional boolean with a default; unparsable logs and is `None`.
    pub fn opt_bool(&mut self, tree: &Element, attrib: &str, default: bool) -> Option<bool> {
        match tree.attrib::<bool>(attrib) {
            AttribLookup::Found(value) => Some(value),
            AttribLookup::NotFound => Some(default),
            AttribLookup::Invalid => self.invalid_bool(tree.name(), attrib),
        }
    }

    /// Required non-empty string.
    pub fn required_name(&mut self, tree: &Element, attrib: &str) -> Option<String> {
        match tree.attrib::<String>(attrib) {
            AttribLookup::Found(name) if !name.is_empty() => Some(name),
            _ => self.missing(tree.name(), attrib),
        }
    }
}
