//! Detail handler contract
//!
//! Domain handlers (contact, medical report, mission package, ...) read the
//! fields they care about out of a parsed detail tree and write them back
//! into a fresh one. The parser never calls handlers; the
//! [`DetailHandlerRegistry`] is glue for consumers that keep several of them.
//!
//! Typed attribute access lives here rather than on [`DetailNode`] because
//! coercion rules belong to whoever interprets the values.

use crate::detail::DetailNode;
use crate::event::Event;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> attribute '{attribute}' has invalid value {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
}

/// Reads and writes one kind of detail element for a domain object `T`
pub trait DetailHandler<T>: Send + Sync {
    /// Name of the detail child this handler consumes (e.g. "contact")
    fn element_name(&self) -> &str;

    /// Copy fields from `detail` into `target`
    fn populate_from_detail(
        &self,
        event: &Event,
        detail: &DetailNode,
        target: &mut T,
    ) -> Result<(), HandlerError>;

    /// Produce the detail element describing `source`, or `None` when the
    /// object has nothing to say for this element
    fn populate_detail(&self, source: &T) -> Option<DetailNode>;
}

/// Handlers for a domain type, kept in registration order
pub struct DetailHandlerRegistry<T> {
    handlers: Vec<Box<dyn DetailHandler<T>>>,
}

impl<T> Default for DetailHandlerRegistry<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<T> DetailHandlerRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: impl DetailHandler<T> + 'static) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Offer every direct child of the event's detail root to the handlers
    /// claiming its element name. A failing handler does not stop the
    /// others; its error is logged and returned.
    pub fn apply(&self, event: &Event, target: &mut T) -> Vec<HandlerError> {
        let mut errors = Vec::new();
        let Some(detail) = event.detail.as_ref() else {
            return errors;
        };

        for child in detail.children() {
            for handler in self.handlers.iter().filter(|h| h.element_name() == child.name()) {
                if let Err(err) = handler.populate_from_detail(event, child, target) {
                    warn!(uid = %event.uid, error = %err, "Detail handler failed");
                    errors.push(err);
                }
            }
        }

        errors
    }

    /// Build a `<detail>` root from every handler's output
    pub fn build_detail(&self, source: &T) -> DetailNode {
        let mut detail = DetailNode::new("detail");
        for child in self.handlers.iter().filter_map(|h| h.populate_detail(source)) {
            detail.add_child(child);
        }
        detail
    }
}

/// Typed attribute accessors for handler implementations
pub trait AttributeExt {
    fn required_attribute(&self, name: &str) -> Result<&str, HandlerError>;
    fn attribute_f64(&self, name: &str) -> Result<Option<f64>, HandlerError>;
    fn attribute_i64(&self, name: &str) -> Result<Option<i64>, HandlerError>;
    fn attribute_bool(&self, name: &str) -> Result<Option<bool>, HandlerError>;
}

impl AttributeExt for DetailNode {
    fn required_attribute(&self, name: &str) -> Result<&str, HandlerError> {
        self.attribute(name)
            .ok_or_else(|| HandlerError::MissingAttribute {
                element: self.name().to_string(),
                attribute: name.to_string(),
            })
    }

    fn attribute_f64(&self, name: &str) -> Result<Option<f64>, HandlerError> {
        typed(self, name, |v| v.parse::<f64>().ok())
    }

    fn attribute_i64(&self, name: &str) -> Result<Option<i64>, HandlerError> {
        typed(self, name, |v| v.parse::<i64>().ok())
    }

    fn attribute_bool(&self, name: &str) -> Result<Option<bool>, HandlerError> {
        typed(self, name, |v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
    }
}

fn typed<V>(
    node: &DetailNode,
    name: &str,
    convert: impl Fn(&str) -> Option<V>,
) -> Result<Option<V>, HandlerError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => convert(raw.trim())
            .map(Some)
            .ok_or_else(|| HandlerError::InvalidAttribute {
                element: node.name().to_string(),
                attribute: name.to_string(),
                value: raw.to_string(),
            }),
    }
}
