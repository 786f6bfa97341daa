//! XML export
//!
//! Each mapping level becomes a `<key name="…">` element, and each scope id
//! becomes a `<value>` leaf:
//!
//! ```xml
//! <config shape="flat">
//!   <key name="general/store_information/name">
//!     <key name="default">
//!       <value scope_id="0">Acme</value>
//!     </key>
//!   </key>
//! </config>
//! ```
//!
//! Keys are attributes, so paths and scope names never need to be valid
//! element names. NULL values are written as `<value scope_id="…" null="true"/>`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::FormatEncoder;
use crate::error::{ExportError, ExportResult};
use crate::models::{FlatDocument, HierarchicalDocument, ScopeValues, ShapedDocument};

const ROOT: &str = "config";
const KEY: &str = "key";
const VALUE: &str = "value";

/// XML encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEncoder;

impl FormatEncoder for XmlEncoder {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn file_extension(&self) -> &'static str {
        "xml"
    }

    fn encode(&self, document: &ShapedDocument) -> ExportResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;

        let mut root = BytesStart::new(ROOT);
        root.push_attribute((
            "shape",
            if document.is_hierarchical() {
                "hierarchical"
            } else {
                "flat"
            },
        ));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        match document {
            ShapedDocument::Flat(doc) => {
                for (path, scopes) in doc {
                    open_key(&mut writer, path)?;
                    write_scopes(&mut writer, scopes)?;
                    close_key(&mut writer)?;
                }
            }
            ShapedDocument::Hierarchical(doc) => {
                for (first, level1) in doc {
                    open_key(&mut writer, first)?;
                    for (second, level2) in level1 {
                        open_key(&mut writer, second)?;
                        for (third, scopes) in level2 {
                            open_key(&mut writer, third)?;
                            write_scopes(&mut writer, scopes)?;
                            close_key(&mut writer)?;
                        }
                        close_key(&mut writer)?;
                    }
                    close_key(&mut writer)?;
                }
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new(ROOT)))
            .map_err(xml_err)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> ExportResult<ShapedDocument> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut declared_hierarchical = None;
        let mut keys: Vec<String> = Vec::new();
        let mut current: Option<(String, String)> = None;
        let mut leaves: Vec<Leaf> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf).map_err(decode_err)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"config" => {
                        declared_hierarchical =
                            attribute(&e, "shape")?.map(|shape| shape == "hierarchical");
                    }
                    b"key" => keys.push(required_attribute(&e, "name")?),
                    b"value" => current = Some((required_attribute(&e, "scope_id")?, String::new())),
                    other => return Err(unexpected_element(other)),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"value" => {
                        let scope_id = required_attribute(&e, "scope_id")?;
                        let is_null = attribute(&e, "null")?.as_deref() == Some("true");
                        leaves.push(Leaf {
                            keys: keys.clone(),
                            scope_id,
                            value: (!is_null).then(String::new),
                        });
                    }
                    b"config" => {
                        declared_hierarchical =
                            attribute(&e, "shape")?.map(|shape| shape == "hierarchical");
                    }
                    b"key" => {}
                    other => return Err(unexpected_element(other)),
                },
                Event::Text(t) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&t.unescape().map_err(decode_err)?);
                    }
                }
                Event::CData(c) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"key" => {
                        keys.pop();
                    }
                    b"value" => {
                        if let Some((scope_id, text)) = current.take() {
                            leaves.push(Leaf {
                                keys: keys.clone(),
                                scope_id,
                                value: Some(text),
                            });
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        build_document(leaves, declared_hierarchical)
    }
}

/// A decoded `<value>` with the key path leading to it
struct Leaf {
    keys: Vec<String>,
    scope_id: String,
    value: Option<String>,
}

fn build_document(leaves: Vec<Leaf>, declared: Option<bool>) -> ExportResult<ShapedDocument> {
    let hierarchical = match (declared, leaves.first()) {
        (Some(h), _) => h,
        (None, Some(leaf)) => leaf.keys.len() == 4,
        (None, None) => false,
    };
    let depth = if hierarchical { 4 } else { 2 };

    if let Some(leaf) = leaves.iter().find(|leaf| leaf.keys.len() != depth) {
        return Err(ExportError::Decode(format!(
            "XML: value for scope id {} is nested {} keys deep, expected {}",
            leaf.scope_id,
            leaf.keys.len(),
            depth
        )));
    }

    if hierarchical {
        let mut doc = HierarchicalDocument::new();
        for Leaf { keys, scope_id, value } in leaves {
            let [first, second, third, scope]: [String; 4] =
                keys.try_into().map_err(|_| ExportError::Decode("XML: bad key depth".into()))?;
            doc.entry(first)
                .or_default()
                .entry(second)
                .or_default()
                .entry(third)
                .or_default()
                .entry(scope)
                .or_default()
                .insert(scope_id, value);
        }
        Ok(ShapedDocument::Hierarchical(doc))
    } else {
        let mut doc = FlatDocument::new();
        for Leaf { keys, scope_id, value } in leaves {
            let [path, scope]: [String; 2] =
                keys.try_into().map_err(|_| ExportError::Decode("XML: bad key depth".into()))?;
            doc.entry(path)
                .or_default()
                .entry(scope)
                .or_default()
                .insert(scope_id, value);
        }
        Ok(ShapedDocument::Flat(doc))
    }
}

fn open_key(writer: &mut Writer<Vec<u8>>, name: &str) -> ExportResult<()> {
    let mut key = BytesStart::new(KEY);
    key.push_attribute(("name", name));
    writer.write_event(Event::Start(key)).map_err(xml_err)
}

fn close_key(writer: &mut Writer<Vec<u8>>) -> ExportResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(KEY)))
        .map_err(xml_err)
}

fn write_scopes(writer: &mut Writer<Vec<u8>>, scopes: &ScopeValues) -> ExportResult<()> {
    for (scope, ids) in scopes {
        open_key(writer, scope)?;
        for (scope_id, value) in ids {
            let mut leaf = BytesStart::new(VALUE);
            leaf.push_attribute(("scope_id", scope_id.as_str()));
            match value {
                None => {
                    leaf.push_attribute(("null", "true"));
                    writer.write_event(Event::Empty(leaf)).map_err(xml_err)?;
                }
                Some(text) => {
                    writer.write_event(Event::Start(leaf)).map_err(xml_err)?;
                    writer
                        .write_event(Event::Text(BytesText::new(text)))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(VALUE)))
                        .map_err(xml_err)?;
                }
            }
        }
        close_key(writer)?;
    }
    Ok(())
}

fn attribute(element: &BytesStart<'_>, name: &str) -> ExportResult<Option<String>> {
    match element.try_get_attribute(name).map_err(decode_err)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(decode_err)?.into_owned())),
        None => Ok(None),
    }
}

fn required_attribute(element: &BytesStart<'_>, name: &str) -> ExportResult<String> {
    attribute(element, name)?.ok_or_else(|| {
        ExportError::Decode(format!(
            "XML: <{}> is missing the {} attribute",
            String::from_utf8_lossy(element.name().as_ref()),
            name
        ))
    })
}

fn unexpected_element(name: &[u8]) -> ExportError {
    ExportError::Decode(format!(
        "XML: unexpected element <{}>",
        String::from_utf8_lossy(name)
    ))
}

pub(crate) fn xml_err(err: impl ToString) -> ExportError {
    ExportError::Xml(err.to_string())
}

fn decode_err(err: impl ToString) -> ExportError {
    ExportError::Decode(format!("XML: {}", err.to_string()))
}
