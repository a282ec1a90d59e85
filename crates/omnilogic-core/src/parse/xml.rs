// ── XML normalization ──
//
// Both payloads are XML. They are first flattened into a generic
// `serde_json::Value` tree so the typed decoders only deal with one
// shape:
//   - `-` in element and attribute names becomes `_`
//   - attributes and child elements become object keys
//   - repeated children collapse into an array
//   - text-only leaves become scalars, integers where they parse
//   - empty leaves are dropped

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

/// Key used for text content of an element that also has attributes.
pub(crate) const TEXT_KEY: &str = "#text";

/// A normalized document: root element name plus its body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    pub root: String,
    pub body: Value,
}

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn into_value(self) -> Option<Value> {
        let text = self.text.trim();
        if self.fields.is_empty() {
            if text.is_empty() {
                return None;
            }
            return Some(coerce(text));
        }
        let mut fields = self.fields;
        if !text.is_empty() {
            fields.insert(TEXT_KEY.into(), coerce(text));
        }
        Some(Value::Object(fields))
    }
}

pub(crate) fn normalize_key(raw: &str) -> String {
    raw.replace('-', "_")
}

/// Integers become numbers; everything else stays text.
pub(crate) fn coerce(raw: &str) -> Value {
    raw.parse::<i64>()
        .map_or_else(|_| Value::String(raw.to_owned()), Value::from)
}

pub(crate) fn normalize(input: &[u8]) -> Result<Document, String> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Document> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("malformed XML at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(start) => stack.push(open(&start)?),
            Event::Empty(start) => {
                let frame = open(&start)?;
                close(frame, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or("unbalanced closing tag")?;
                close(frame, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of document inside <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_owned())
}

fn open(start: &BytesStart<'_>) -> Result<Frame, String> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map(normalize_key)
        .map_err(|e| e.to_string())?;

    let mut fields = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map(normalize_key)
            .map_err(|e| e.to_string())?;
        if key == "xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        fields.insert(key, coerce(value.trim()));
    }

    Ok(Frame {
        name,
        fields,
        text: String::new(),
    })
}

fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Document>) -> Result<(), String> {
    let name = frame.name.clone();
    let value = frame.into_value();

    let Some(parent) = stack.last_mut() else {
        if root.is_some() {
            return Err("multiple root elements".into());
        }
        *root = Some(Document {
            root: name,
            body: value.unwrap_or_else(|| Value::Object(Map::new())),
        });
        return Ok(());
    };

    let Some(value) = value else {
        return Ok(());
    };
    match parent.fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.fields.insert(name, value);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn elements_and_attributes_are_normalized() {
        let doc = normalize(
            br#"<?xml version="1.0"?>
            <MSPConfig>
              <System><Msp-Vsp-Speed-Format>Percent</Msp-Vsp-Speed-Format></System>
              <Backyard>
                <System-Id>0</System-Id>
                <Name>My Backyard</Name>
                <Sensor><System-Id>3</System-Id></Sensor>
                <Sensor><System-Id>4</System-Id></Sensor>
              </Backyard>
            </MSPConfig>"#,
        )
        .unwrap();

        assert_eq!(doc.root, "MSPConfig");
        assert_eq!(
            doc.body,
            json!({
                "System": { "Msp_Vsp_Speed_Format": "Percent" },
                "Backyard": {
                    "System_Id": 0,
                    "Name": "My Backyard",
                    "Sensor": [{ "System_Id": 3 }, { "System_Id": 4 }],
                }
            })
        );
    }

    #[test]
    fn attribute_values_are_coerced() {
        let doc = normalize(
            br#"<STATUS version="1.11"><Filter systemId="3" filterSpeed="50" power="-1"/></STATUS>"#,
        )
        .unwrap();
        assert_eq!(
            doc.body,
            json!({
                "version": "1.11",
                "Filter": { "systemId": 3, "filterSpeed": 50, "power": -1 },
            })
        );
    }

    #[test]
    fn empty_leaves_are_dropped() {
        let doc = normalize(b"<Root><Name/><Id>1</Id></Root>").unwrap();
        assert_eq!(doc.body, json!({ "Id": 1 }));
    }

    #[test]
    fn mixed_text_and_attributes() {
        let doc = normalize(br#"<Root><Item unit="F">72</Item></Root>"#).unwrap();
        assert_eq!(doc.body, json!({ "Item": { "unit": "F", "#text": 72 } }));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(normalize(b"<Root><Open></Root>").is_err());
        assert!(normalize(b"<Root>").is_err());
        assert!(normalize(b"").is_err());
        assert!(normalize(b"<A/><B/>").is_err());
    }
}
