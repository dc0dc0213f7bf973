//! The hierarchical record store: an XML document holding one node per
//! incident under a single root container.
//!
//! Node order is ingestion order, never priority order. The document is read
//! in full at the start of a session and rewritten in full on save; the save
//! goes through a sibling temp file plus rename so a failed write never
//! corrupts the previous content.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::StoreError;

/// Default root container tag, as produced by the converter.
pub const ROOT_TAG: &str = "incidencies";
/// Record node tag.
pub const RECORD_TAG: &str = "incidencia";
/// Identity attribute carried by every record node.
pub const ID_ATTR: &str = "id";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One record node: an identity attribute plus ordered `(tag, text)` children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordNode {
    pub id: String,
    pub fields: Vec<(String, String)>,
}

impl RecordNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Child text for a tag, if the child exists.
    pub fn field(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Set a child's text, creating the child if it did not exist.
    pub fn set_field(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(t, _)| t == tag) {
            Some((_, v)) => *v = value,
            None => self.fields.push((tag.to_string(), value)),
        }
    }
}

/// The parsed store document: root tag plus ordered record nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDocument {
    pub root: String,
    pub records: Vec<RecordNode>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreDocument {
    /// Empty document with the default root tag.
    pub fn new() -> Self {
        Self {
            root: ROOT_TAG.to_string(),
            records: Vec::new(),
        }
    }

    /// Read and parse the store document from disk.
    ///
    /// A missing file is reported as [`StoreError::Missing`]; anything that
    /// does not parse as a root container of record nodes is
    /// [`StoreError::Malformed`].
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::Missing {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let doc = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            records = doc.records.len(),
            "loaded record store"
        );
        Ok(doc)
    }

    /// Parse a store document from XML text.
    pub fn parse(xml: &str) -> StoreResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut root: Option<String> = None;
        let mut records: Vec<RecordNode> = Vec::new();
        let mut current_field: Option<(String, String)> = None;
        let mut depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    depth += 1;
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match depth {
                        1 => root = Some(name),
                        2 => records.push(record_node(&e)?),
                        3 => current_field = Some((name, String::new())),
                        _ => {
                            return Err(StoreError::Malformed {
                                message: format!("unexpected nested element <{name}>"),
                            });
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match depth {
                        0 => root = Some(name),
                        1 => records.push(record_node(&e)?),
                        2 => {
                            if let Some(node) = records.last_mut() {
                                node.fields.push((name, String::new()));
                            }
                        }
                        _ => {
                            return Err(StoreError::Malformed {
                                message: format!("unexpected element <{name}/>"),
                            });
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some((_, value)) = current_field.as_mut() {
                        let text = t.unescape().map_err(|e| StoreError::Malformed {
                            message: format!("bad text content: {e}"),
                        })?;
                        value.push_str(text.trim());
                    }
                }
                Ok(Event::CData(t)) => {
                    if let Some((_, value)) = current_field.as_mut() {
                        let text = String::from_utf8_lossy(&t);
                        value.push_str(text.trim());
                    }
                }
                Ok(Event::End(_)) => {
                    if depth == 3 {
                        if let (Some(field), Some(node)) =
                            (current_field.take(), records.last_mut())
                        {
                            node.fields.push(field);
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(StoreError::Malformed {
                        message: e.to_string(),
                    });
                }
            }
        }

        let root = root.ok_or_else(|| StoreError::Malformed {
            message: "document has no root element".to_string(),
        })?;
        Ok(Self { root, records })
    }

    /// Serialize the document as indented UTF-8 XML with a declaration.
    pub fn to_xml(&self) -> StoreResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        let xml_err = |e: quick_xml::Error| StoreError::Malformed {
            message: format!("failed to serialize store: {e}"),
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new(self.root.as_str())))
            .map_err(xml_err)?;

        for node in &self.records {
            let mut start = BytesStart::new(RECORD_TAG);
            start.push_attribute((ID_ATTR, node.id.as_str()));
            writer.write_event(Event::Start(start)).map_err(xml_err)?;

            for (tag, value) in &node.fields {
                if value.is_empty() {
                    writer
                        .write_event(Event::Empty(BytesStart::new(tag.as_str())))
                        .map_err(xml_err)?;
                } else {
                    writer
                        .write_event(Event::Start(BytesStart::new(tag.as_str())))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::Text(BytesText::new(value)))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(tag.as_str())))
                        .map_err(xml_err)?;
                }
            }

            writer
                .write_event(Event::End(BytesEnd::new(RECORD_TAG)))
                .map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.root.as_str())))
            .map_err(xml_err)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Persist the whole document, replacing the previous content atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let bytes = self.to_xml()?;
        write_atomic(path, &bytes).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            records = self.records.len(),
            "saved record store"
        );
        Ok(())
    }

    /// Look up a record node by identity.
    pub fn find_record(&self, id: &str) -> Option<&RecordNode> {
        self.records.iter().find(|n| n.id == id)
    }

    /// Mutable lookup of a record node by identity.
    pub fn find_record_mut(&mut self, id: &str) -> Option<&mut RecordNode> {
        self.records.iter_mut().find(|n| n.id == id)
    }
}

fn record_node(start: &BytesStart<'_>) -> StoreResult<RecordNode> {
    let mut node = RecordNode::default();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| StoreError::Malformed {
            message: format!("bad attribute: {e}"),
        })?;
        if attr.key.as_ref() == ID_ATTR.as_bytes() {
            let value = attr.unescape_value().map_err(|e| StoreError::Malformed {
                message: format!("bad id attribute: {e}"),
            })?;
            node.id = value.trim().to_string();
        }
    }
    Ok(node)
}

/// Whole-file replacement: write a sibling temp file, then rename over the
/// target. The previous content survives any failure before the rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_doc() -> StoreDocument {
        let mut a = RecordNode::new("1");
        a.set_field("Tipos_de_incidencia", "Red");
        a.set_field("Prioridad_del_problema", "Alta");
        a.set_field("Explica_el_problema_detalladamente", "");
        let mut b = RecordNode::new("2");
        b.set_field("Tipos_de_incidencia", "Hardware");
        b.set_field("Prioridad_del_problema", "");
        StoreDocument {
            root: ROOT_TAG.to_string(),
            records: vec![a, b],
        }
    }

    #[test]
    fn round_trip_preserves_records_and_order() {
        let doc = sample_doc();
        let xml = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        let parsed = StoreDocument::parse(&xml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn serialized_form_declares_utf8_and_indents() {
        let xml = String::from_utf8(sample_doc().to_xml().unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n  <incidencia id=\"1\">"));
        assert!(xml.contains("\n    <Tipos_de_incidencia>Red</Tipos_de_incidencia>"));
    }

    #[test]
    fn empty_fields_survive_round_trip() {
        let doc = sample_doc();
        let xml = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        let parsed = StoreDocument::parse(&xml).unwrap();
        assert_eq!(
            parsed.records[0].field("Explica_el_problema_detalladamente"),
            Some("")
        );
        assert_eq!(parsed.records[1].field("Prioridad_del_problema"), Some(""));
    }

    #[test]
    fn parse_trims_field_text() {
        let xml = "<incidencies><incidencia id=\"1\">\
                   <Hora>  10:30:00  </Hora></incidencia></incidencies>";
        let doc = StoreDocument::parse(xml).unwrap();
        assert_eq!(doc.records[0].field("Hora"), Some("10:30:00"));
    }

    #[test]
    fn parse_captures_cdata_field_content() {
        let xml = "<incidencies><incidencia id=\"1\">\
                   <Hora><![CDATA[10:00:00]]></Hora></incidencia></incidencies>";
        let doc = StoreDocument::parse(xml).unwrap();
        assert_eq!(doc.records[0].field("Hora"), Some("10:00:00"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            StoreDocument::parse("not xml at all <<<"),
            Err(StoreError::Malformed { .. })
        ));
        assert!(matches!(
            StoreDocument::parse(""),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn parse_rejects_overly_deep_nesting() {
        let xml = "<r><incidencia id=\"1\"><Hora><deep>x</deep></Hora></incidencia></r>";
        assert!(matches!(
            StoreDocument::parse(xml),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_root_element_is_an_empty_document() {
        let doc = StoreDocument::parse("<incidencies/>").unwrap();
        assert_eq!(doc.root, "incidencies");
        assert!(doc.records.is_empty());
    }

    #[test]
    fn load_missing_file_is_a_distinct_error() {
        let dir = TempDir::new().unwrap();
        let err = StoreDocument::load(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("incidencies.xml");
        let doc = sample_doc();
        doc.save(&path).unwrap();
        let loaded = StoreDocument::load(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("incidencies.xml");
        sample_doc().save(&path).unwrap();

        let mut smaller = sample_doc();
        smaller.records.truncate(1);
        smaller.save(&path).unwrap();

        let loaded = StoreDocument::load(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
    }

    #[test]
    fn set_field_creates_missing_child() {
        let mut node = RecordNode::new("7");
        assert_eq!(node.field("Prioridad_del_problema"), None);
        node.set_field("Prioridad_del_problema", "Media");
        assert_eq!(node.field("Prioridad_del_problema"), Some("Media"));
        node.set_field("Prioridad_del_problema", "Baja");
        assert_eq!(node.field("Prioridad_del_problema"), Some("Baja"));
        assert_eq!(node.fields.len(), 1);
    }
}
