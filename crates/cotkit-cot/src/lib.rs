//! Cursor on Target (CoT) message parser
//!
//! Turns one CoT XML message into an [`Event`]: the scalar `<event>` fields,
//! a [`Point`], and the open-ended `<detail>` payload as an order-preserving
//! [`DetailNode`] tree. Input comes from untrusted peers, so the parse entry
//! point is total: malformed messages are logged and come back as an
//! identity-less event instead of an error.
//!
//! # Features
//!
//! - Pull tokenizer over quick-xml feeding an explicit state machine
//! - Pooled parse contexts to avoid per-message scratch allocation
//! - Schema-less detail tree with attribute order and text preserved
//! - Detail handler contract for domain-specific extensions
//!
//! # Example
//!
//! ```rust
//! use cotkit_cot::parse_cot;
//!
//! let cot_xml = r#"<?xml version="1.0"?>
//! <event version="2.0" uid="test-1" type="a-f-G"
//!        time="2024-01-15T10:30:00Z"
//!        start="2024-01-15T10:30:00Z"
//!        stale="2024-01-15T10:35:00Z" how="h-e">
//!     <point lat="37.7749" lon="-122.4194" hae="100.0" ce="10.0" le="5.0"/>
//!     <detail><contact callsign="Alpha-1"/></detail>
//! </event>"#;
//!
//! let event = parse_cot(cot_xml);
//! assert!(event.is_valid());
//! assert_eq!(event.uid, "test-1");
//! assert_eq!(event.point.lat, 37.7749);
//! assert_eq!(
//!     event.detail_child("contact").and_then(|c| c.attribute("callsign")),
//!     Some("Alpha-1")
//! );
//! ```

pub mod context;
pub mod detail;
pub mod event;
pub mod handler;
pub mod parser;
pub mod token;
pub mod validate;

pub use cotkit_core::config::ParserConfig;
pub use context::{ContextPool, ParseContext, ParseState};
pub use detail::{Attribute, DetailNode};
pub use event::{Event, Point};
pub use handler::{AttributeExt, DetailHandler, DetailHandlerRegistry, HandlerError};
pub use parser::{parse_cot, parse_cot_bytes, try_parse_cot, CotParser, ParseError};
pub use validate::{validate_event, validate_point, ValidationError};
