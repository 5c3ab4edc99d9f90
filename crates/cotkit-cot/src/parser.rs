//! Pull-driven CoT parser
//!
//! [`CotParser::try_parse`] runs the state machine over the token stream and
//! reports why a message was rejected. [`CotParser::parse`] is the total
//! entry point used by the message pipeline: it never fails, logs the
//! diagnostic, and hands back an identity-less [`Event`] for rejected input.
//!
//! Field policy for `<event>`:
//! - `type`, `uid`: required, message rejected when missing or empty
//! - `time`, `start`, `stale`: current time when missing or unparsable
//! - `version`: `"2.0"` when missing, `how`: empty when missing
//! - `opex`, `qos`, `access`, `caveat`, `releasableTo`: absent when missing
//!
//! Field policy for `<point>`:
//! - `lat`, `lon`: required finite numbers, message rejected otherwise
//! - `hae`, `ce`, `le`: [`Point::UNKNOWN`] when missing, unparsable or not finite

use crate::context::{ContextPool, ParseContext, ParseState};
use crate::detail::{Attribute, DetailNode};
use crate::event::{Event, Point, DEFAULT_VERSION};
use crate::token::{Token, Tokenizer};
use chrono::{DateTime, NaiveDateTime, Utc};
use cotkit_core::config::ParserConfig;
use once_cell::sync::Lazy;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;
use tracing::{debug, warn};

/// Process-wide parser built from the default configuration
static DEFAULT_PARSER: Lazy<CotParser> = Lazy::new(CotParser::default);

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML parsing error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("Message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number for '{field}': {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Detail nesting exceeds {0} levels")]
    DetailTooDeep(usize),

    #[error("No <event> element found")]
    NoEvent,
}

/// Parse a CoT message with the shared default parser. Never fails; see
/// [`CotParser::parse`].
pub fn parse_cot(xml: &str) -> Event {
    DEFAULT_PARSER.parse(xml)
}

/// Parse a CoT message from bytes with the shared default parser
pub fn parse_cot_bytes(xml: &[u8]) -> Event {
    DEFAULT_PARSER.parse_bytes(xml)
}

/// Parse a CoT message with the shared default parser, reporting rejection
pub fn try_parse_cot(xml: &str) -> Result<Event, ParseError> {
    DEFAULT_PARSER.try_parse(xml)
}

/// CoT parser owning a pool of reusable parse contexts. Share it freely
/// between threads; every call leases its own context.
#[derive(Debug)]
pub struct CotParser {
    config: ParserConfig,
    pool: ContextPool,
}

impl Default for CotParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl CotParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            pool: ContextPool::new(config.pool_capacity),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    /// Parse a message, always producing an event.
    ///
    /// Rejected messages are logged (when `log_rejected` is set) and yield
    /// `Event::default()`: empty `type` and `uid`, so [`Event::is_valid`]
    /// reports them as unusable.
    pub fn parse(&self, xml: &str) -> Event {
        self.try_parse(xml)
            .unwrap_or_else(|err| self.rejected(err, xml.as_bytes()))
    }

    /// Byte variant of [`CotParser::parse`]
    pub fn parse_bytes(&self, xml: &[u8]) -> Event {
        self.try_parse_bytes(xml)
            .unwrap_or_else(|err| self.rejected(err, xml))
    }

    /// Parse a message, reporting why it was rejected
    pub fn try_parse(&self, xml: &str) -> Result<Event, ParseError> {
        let mut context = self.pool.lease();
        run(&mut context, xml, self.config.max_detail_depth)
    }

    /// Byte variant of [`CotParser::try_parse`]
    pub fn try_parse_bytes(&self, xml: &[u8]) -> Result<Event, ParseError> {
        self.try_parse(std::str::from_utf8(xml)?)
    }

    fn rejected(&self, err: ParseError, raw: &[u8]) -> Event {
        if self.config.log_rejected {
            let end = raw.len().min(self.config.max_logged_bytes);
            warn!(
                error = %err,
                raw = %String::from_utf8_lossy(&raw[..end]),
                truncated = end < raw.len(),
                "Rejected CoT message"
            );
        }
        Event::default()
    }
}

/// Drive the state machine over one message
fn run(context: &mut ParseContext, xml: &str, max_depth: usize) -> Result<Event, ParseError> {
    let mut tokens = Tokenizer::new(xml);

    loop {
        match tokens.next_token()? {
            Token::EndOfDocument => break,
            Token::StartTag { name, attributes } => start_tag(context, name, attributes, max_depth)?,
            Token::EndTag { name } => end_tag(context, &name),
            Token::Text(text) => {
                if context.state == ParseState::InDetail {
                    context.text.clear();
                    context.text.push_str(&text);
                }
            }
        }

        if context.state == ParseState::Finished {
            break;
        }
    }

    match context.state {
        ParseState::Outside => Err(ParseError::NoEvent),
        _ => {
            if !context.stack.is_empty() {
                debug!(depth = context.stack.len(), "Closing detail nodes left open at end of message");
                while !context.stack.is_empty() {
                    close_node(context);
                }
            }
            Ok(context.take_event())
        }
    }
}

fn start_tag(
    context: &mut ParseContext,
    name: String,
    attributes: Vec<Attribute>,
    max_depth: usize,
) -> Result<(), ParseError> {
    context.text.clear();

    match context.state {
        ParseState::Outside if name == "event" => begin_event(context, attributes),
        ParseState::InEvent if context.ignored > 0 => {
            context.ignored += 1;
            Ok(())
        }
        ParseState::InEvent => match name.as_str() {
            "point" => {
                context.event.point = read_point(attributes)?;
                context.event.has_point = true;
                Ok(())
            }
            "detail" if context.detail_closed => {
                debug!(uid = %context.event.uid, "Ignoring additional <detail> element");
                context.ignored = 1;
                Ok(())
            }
            "detail" => open_node(context, name, attributes, max_depth),
            _ => {
                context.ignored = 1;
                Ok(())
            }
        },
        ParseState::InDetail => open_node(context, name, attributes, max_depth),
        ParseState::Outside | ParseState::Finished => Ok(()),
    }
}

fn end_tag(context: &mut ParseContext, name: &str) {
    match context.state {
        ParseState::InDetail => close_node(context),
        ParseState::InEvent if context.ignored > 0 => context.ignored -= 1,
        ParseState::InEvent if name == "event" => context.state = ParseState::Finished,
        _ => {}
    }
    context.text.clear();
}

fn begin_event(context: &mut ParseContext, attributes: Vec<Attribute>) -> Result<(), ParseError> {
    context.state = ParseState::InEvent;
    let event = &mut context.event;
    let now = Utc::now();
    event.time = now;
    event.start = now;
    event.stale = now;

    for Attribute { name, value } in attributes {
        match name.as_str() {
            "type" => event.event_type = value,
            "version" => event.version = value,
            "uid" => event.uid = value,
            "time" => event.time = timestamp_or(&value, now, "time"),
            "start" => event.start = timestamp_or(&value, now, "start"),
            "stale" => event.stale = timestamp_or(&value, now, "stale"),
            "how" => event.how = value,
            "opex" => event.opex = Some(value),
            "qos" => event.qos = Some(value),
            "access" => event.access = Some(value),
            "caveat" => event.caveat = Some(value),
            "releasableTo" => event.releasable_to = Some(value),
            _ => {}
        }
    }

    if event.version.is_empty() {
        event.version.push_str(DEFAULT_VERSION);
    }

    if event.event_type.is_empty() {
        Err(ParseError::MissingField("type"))
    } else if event.uid.is_empty() {
        Err(ParseError::MissingField("uid"))
    } else {
        Ok(())
    }
}

fn read_point(attributes: Vec<Attribute>) -> Result<Point, ParseError> {
    let mut lat = None;
    let mut lon = None;
    let mut point = Point::ZERO;

    for Attribute { name, value } in attributes {
        match name.as_str() {
            "lat" => lat = Some(coordinate("lat", value)?),
            "lon" => lon = Some(coordinate("lon", value)?),
            "hae" => point.hae = figure(&value),
            "ce" => point.ce = figure(&value),
            "le" => point.le = figure(&value),
            _ => {}
        }
    }

    point.lat = lat.ok_or(ParseError::MissingField("lat"))?;
    point.lon = lon.ok_or(ParseError::MissingField("lon"))?;
    Ok(point)
}

fn open_node(
    context: &mut ParseContext,
    name: String,
    attributes: Vec<Attribute>,
    max_depth: usize,
) -> Result<(), ParseError> {
    if context.stack.len() >= max_depth {
        return Err(ParseError::DetailTooDeep(max_depth));
    }

    context.stack.push(DetailNode::with_attributes(name, attributes));
    context.state = ParseState::InDetail;
    Ok(())
}

/// Pop the innermost open node and attach it to its parent, or to the event
/// when it is the detail root.
fn close_node(context: &mut ParseContext) {
    let Some(mut node) = context.stack.pop() else {
        return;
    };

    if node.children().is_empty() {
        let text = context.text.trim();
        if !text.is_empty() {
            node.set_inner_text(text);
        }
    }
    context.text.clear();

    match context.stack.last_mut() {
        Some(parent) => parent.add_child(node),
        None => {
            context.event.detail = Some(node);
            context.detail_closed = true;
            context.state = ParseState::InEvent;
        }
    }
}

fn coordinate(field: &'static str, value: String) -> Result<f64, ParseError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber { field, value }),
    }
}

fn figure(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(Point::UNKNOWN)
}

fn timestamp_or(value: &str, fallback: DateTime<Utc>, field: &'static str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or_else(|| {
        debug!(field, value, "Unparsable timestamp, using current time");
        fallback
    })
}

/// Parse a CoT timestamp: RFC 3339, or a zone-less ISO 8601 form read as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    value.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    })
}
