//! In-memory record views derived from store nodes.
//!
//! The store document owns the canonical persisted text; a [`Record`] is a
//! derived copy used for ranking, filtering and aggregation. The mutator is
//! the only component that writes back to both representations.

use chrono::NaiveDateTime;

use crate::store::RecordNode;

/// Well-known field tags of the incident schema, as normalized from the
/// original spreadsheet headers.
pub mod fields {
    pub const TIMESTAMP_MARK: &str = "Marca_de_temps";
    pub const EMAIL: &str = "Ingresa__tu_correo_electrónico_";
    pub const DATE: &str = "Fecha_de_la_incidencia";
    pub const TIME: &str = "Hora";
    pub const EQUIPMENT_NAME: &str = "Nombre_del_equipo";
    pub const EQUIPMENT_KIND: &str = "Tipo_de_equipo";
    pub const EQUIPMENT_OTHER: &str = "En_caso_de_otros__pon_que_tipo_de_equipo_es_";
    pub const INCIDENT_TYPE: &str = "Tipos_de_incidencia";
    pub const DETAIL: &str = "Explica_el_problema_detalladamente";
    pub const PRIORITY: &str = "Prioridad_del_problema";
    pub const LOCATION: &str = "Ubicación";
}

/// One incident: an external identity, ordered field values, and the
/// timestamp resolved by temporal classification (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    fields: Vec<(String, String)>,
    pub timestamp: Option<NaiveDateTime>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Derive an in-memory view from a store node.
    pub fn from_node(node: &RecordNode) -> Self {
        Self {
            id: node.id.clone(),
            fields: node.fields.clone(),
            timestamp: None,
        }
    }

    /// Field value by tag; absent fields read as the empty string.
    pub fn field(&self, tag: &str) -> &str {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Field value, or the `(sin <label>)` placeholder when empty/absent.
    pub fn field_or_placeholder(&self, tag: &str, label: &str) -> String {
        let value = self.field(tag);
        if value.is_empty() {
            placeholder(label)
        } else {
            value.to_string()
        }
    }

    /// Set a field value, creating the field if it did not exist.
    pub fn set_field(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(t, _)| t == tag) {
            Some((_, v)) => *v = value,
            None => self.fields.push((tag.to_string(), value)),
        }
    }

    /// All fields in document order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Placeholder shown in place of an empty field value, e.g. `(sin prioridad)`.
pub fn placeholder(label: &str) -> String {
    format!("(sin {label})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordNode;

    #[test]
    fn absent_field_reads_as_empty() {
        let record = Record::new("1");
        assert_eq!(record.field(fields::PRIORITY), "");
    }

    #[test]
    fn from_node_copies_identity_and_fields() {
        let mut node = RecordNode::new("3");
        node.set_field(fields::INCIDENT_TYPE, "Software");
        node.set_field(fields::PRIORITY, "Media");
        let record = Record::from_node(&node);
        assert_eq!(record.id, "3");
        assert_eq!(record.field(fields::INCIDENT_TYPE), "Software");
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn placeholder_is_parameterized_by_label() {
        let record = Record::new("1");
        assert_eq!(
            record.field_or_placeholder(fields::LOCATION, "ubicación"),
            "(sin ubicación)"
        );
        let mut named = Record::new("2");
        named.set_field(fields::LOCATION, "Aula 3");
        assert_eq!(
            named.field_or_placeholder(fields::LOCATION, "ubicación"),
            "Aula 3"
        );
    }

    #[test]
    fn set_field_updates_or_creates() {
        let mut record = Record::new("1");
        record.set_field(fields::PRIORITY, "Alta");
        assert_eq!(record.field(fields::PRIORITY), "Alta");
        record.set_field(fields::PRIORITY, "Baja");
        assert_eq!(record.field(fields::PRIORITY), "Baja");
        assert_eq!(record.fields().len(), 1);
    }
}
