//! SOAP envelope parsing.
//!
//! Darwin answers with a SOAP envelope whose element namespaces change with
//! every schema revision (`lt4`, `lt5`, `lt7`, `lt8`...). The envelope is
//! read into a loosely-typed `serde_json::Value` tree so the board engine
//! can work with key lookups alone:
//!
//! - namespace prefixes are dropped, so `lt4:std` becomes `std`
//! - attributes become `@name` keys (`xmlns` declarations are skipped)
//! - an element with only text becomes a string, an empty element `null`
//! - text next to attributes or children is stored under `#text`
//! - a repeated child becomes an array, a lone child stays a single value
//!
//! The last rule is the source of Darwin's "one service is an object, two
//! are a list" quirk; [`one_or_many`] undoes it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use super::error::DarwinError;

/// Key of the fault element inside the SOAP body.
pub const FAULT_KEY: &str = "Fault";

/// Key under which mixed element text is stored.
pub const TEXT_KEY: &str = "#text";

/// Parse a SOAP response body into a value tree.
pub fn parse_envelope(xml: &str) -> Result<Value, DarwinError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // The bottom frame collects the document's top-level elements.
    let mut stack = vec![Frame::new(String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let frame = Frame::from_start(&start).map_err(|e| DarwinError::xml(e, xml))?;
                stack.push(frame);
            }
            Ok(Event::Empty(start)) => {
                let frame = Frame::from_start(&start).map_err(|e| DarwinError::xml(e, xml))?;
                let (name, value) = frame.finish();
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.children, name, value);
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| DarwinError::xml(e, xml))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                let data = data.into_inner();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(DarwinError::xml("unbalanced closing tag", xml));
                }
                if let Some(frame) = stack.pop() {
                    let (name, value) = frame.finish();
                    if let Some(parent) = stack.last_mut() {
                        insert_child(&mut parent.children, name, value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let message = format!("at byte {}: {e}", reader.buffer_position());
                return Err(DarwinError::xml(message, xml));
            }
        }
    }

    match stack.pop() {
        Some(root) if stack.is_empty() => {
            if root.children.is_empty() {
                return Err(DarwinError::xml("document has no root element", xml));
            }
            Ok(Value::Object(root.children))
        }
        _ => Err(DarwinError::xml("unexpected end of document", xml)),
    }
}

/// The contents of `Envelope/Body`, if present.
pub fn soap_body(tree: &Value) -> Option<&Value> {
    get_path(tree, &["Envelope", "Body"])
}

/// Whether the SOAP body carries a fault instead of a response.
pub fn is_fault(tree: &Value) -> bool {
    soap_body(tree).is_some_and(|body| body.get(FAULT_KEY).is_some())
}

/// The fault message, for logging.
pub fn fault_message(tree: &Value) -> Option<&str> {
    let fault = soap_body(tree)?.get(FAULT_KEY)?;
    text(fault, "faultstring")
}

/// Follow a sequence of keys through nested objects.
pub fn get_path<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, key| current.get(key))
}

/// Normalize a child that may be absent, a single object, or a list.
pub fn one_or_many(node: Option<&Value>) -> Vec<&Value> {
    match node {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(single) => vec![single],
    }
}

/// Text of the child element `key`, whether stored as a plain string or
/// alongside attributes. Blank text counts as absent.
pub fn text<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    let child = node.get(key)?;
    let s = match child {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get(TEXT_KEY)?.as_str()?,
        _ => return None,
    };
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Whether an element is missing, empty, or marked `xsi:nil="true"`.
pub fn is_nil(node: Option<&Value>) -> bool {
    match node {
        None | Some(Value::Null) => true,
        Some(value) => value.get("@nil").and_then(Value::as_str) == Some("true"),
    }
}

/// An element being built.
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut frame = Frame::new(local_name(start.local_name().as_ref()));

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = format!("@{}", local_name(attr.key.local_name().as_ref()));
            let value = attr.unescape_value()?;
            frame.children.insert(key, Value::String(value.into_owned()));
        }

        Ok(frame)
    }

    fn finish(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(self.text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Add a child, turning repeated names into an array.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}
