//! Pull tokenizer over `quick_xml`
//!
//! Flattens the reader's event stream into the four tokens the parser state
//! machine understands. Self-closing elements become a start tag immediately
//! followed by an end tag; CDATA is delivered as text; declarations,
//! comments, processing instructions and doctypes are dropped.

use crate::detail::Attribute;
use crate::parser::ParseError;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;

/// A single tokenizer step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    EndTag {
        name: String,
    },
    Text(String),
    EndOfDocument,
}

/// Streaming tokenizer over an in-memory XML message
pub struct Tokenizer<'a> {
    reader: Reader<&'a [u8]>,
    pending_end: Option<String>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            pending_end: None,
            finished: false,
        }
    }

    /// Byte offset of the reader into the message
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Produce the next token. Once [`Token::EndOfDocument`] has been
    /// returned every further call returns it again.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Token::EndTag { name });
        }

        loop {
            if self.finished {
                return Ok(Token::EndOfDocument);
            }

            let event = self.reader.read_event().map_err(|e| self.xml_error(e))?;
            match event {
                XmlEvent::Start(e) => return self.start_tag(&e),
                XmlEvent::Empty(e) => {
                    let token = self.start_tag(&e)?;
                    if let Token::StartTag { name, .. } = &token {
                        self.pending_end = Some(name.clone());
                    }
                    return Ok(token);
                }
                XmlEvent::End(e) => {
                    return Ok(Token::EndTag {
                        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    })
                }
                XmlEvent::Text(t) => {
                    let text = t.unescape().map_err(|e| self.xml_error(e))?;
                    return Ok(Token::Text(text.into_owned()));
                }
                XmlEvent::CData(c) => {
                    return Ok(Token::Text(String::from_utf8_lossy(&c).into_owned()));
                }
                XmlEvent::Eof => self.finished = true,
                _ => {}
            }
        }
    }

    fn start_tag(&self, element: &BytesStart<'_>) -> Result<Token, ParseError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in element.attributes() {
            let attr = attr?;
            let value = attr.unescape_value().map_err(|e| self.xml_error(e))?;
            attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: value.into_owned(),
            });
        }

        Ok(Token::StartTag { name, attributes })
    }

    fn xml_error(&self, source: quick_xml::Error) -> ParseError {
        ParseError::Xml {
            position: self.reader.error_position() as u64,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Result<Vec<Token>, ParseError> {
        let mut tokenizer = Tokenizer::new(xml);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            let done = token == Token::EndOfDocument;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn start(name: &str, attrs: &[(&str, &str)]) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attrs.iter().map(|(n, v)| Attribute::new(*n, *v)).collect(),
        }
    }

    fn end(name: &str) -> Token {
        Token::EndTag {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_self_closing_expands() {
        let tokens = collect(r#"<?xml version="1.0"?><a x="1"><b/></a>"#).unwrap();
        assert_eq!(
            tokens,
            [
                start("a", &[("x", "1")]),
                start("b", &[]),
                end("b"),
                end("a"),
                Token::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_text_is_unescaped_and_trimmed() {
        let tokens = collect("<r>\n  fish &amp; chips\n</r>").unwrap();
        assert_eq!(tokens[1], Token::Text("fish & chips".to_string()));
    }

    #[test]
    fn test_cdata_and_comments() {
        let tokens = collect("<r><!-- note --><![CDATA[<raw>]]></r>").unwrap();
        assert_eq!(
            tokens,
            [
                start("r", &[]),
                Token::Text("<raw>".to_string()),
                end("r"),
                Token::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_attribute_entities() {
        let tokens = collect(r#"<r note="a &lt; b"/>"#).unwrap();
        assert_eq!(tokens[0], start("r", &[("note", "a < b")]));
    }

    #[test]
    fn test_mismatched_end_tag_fails() {
        assert!(matches!(
            collect("<a><b></a>"),
            Err(ParseError::Xml { .. })
        ));
    }

    #[test]
    fn test_duplicate_attribute_fails() {
        assert!(matches!(
            collect(r#"<a x="1" x="2"/>"#),
            Err(ParseError::Attribute(_))
        ));
    }

    #[test]
    fn test_end_of_document_repeats() {
        let mut tokenizer = Tokenizer::new("<a/>");
        assert!(matches!(tokenizer.next_token(), Ok(Token::StartTag { .. })));
        assert!(matches!(tokenizer.next_token(), Ok(Token::EndTag { .. })));
        assert_eq!(tokenizer.next_token().unwrap(), Token::EndOfDocument);
        assert_eq!(tokenizer.next_token().unwrap(), Token::EndOfDocument);
        assert!(tokenizer.position() > 0);
    }
}
