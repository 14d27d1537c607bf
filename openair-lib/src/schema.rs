//! Record type schemas inferred from sample responses

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::api::xml::Element;
use crate::naming;

/// Tag of the nested element marking a date field.
pub const DATE_TAG: &str = "Date";
/// Tag of the nested element marking an address field.
pub const ADDRESS_TAG: &str = "Address";

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Plain text content.
    Text,
    /// A nested `<Date>` structure.
    Date,
    /// A nested `<Address>` structure.
    Address,
}

impl ValueKind {
    /// Infers the kind of a field from its sample element.
    ///
    /// Only the first nested element is looked at, and only its tag name.
    pub fn infer(element: &Element) -> Self {
        match element.children().first().map(Element::name) {
            Some(DATE_TAG) => Self::Date,
            Some(ADDRESS_TAG) => Self::Address,
            _ => Self::Text,
        }
    }
}

/// One field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Literal tag name used by the API.
    pub raw_name: String,
    /// Canonical identifier, unique within the record type.
    pub normalized_name: String,
    /// Kind of value the field holds.
    pub value_kind: ValueKind,
}

impl Field {
    /// Creates a field from a raw tag name, normalizing its identifier.
    pub fn new(raw_name: impl Into<String>, value_kind: ValueKind) -> Self {
        let raw_name = raw_name.into();
        Self {
            normalized_name: naming::normalize(&raw_name),
            raw_name,
            value_kind,
        }
    }
}

/// The field layout of one record type.
///
/// Built once from a sample response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeDescriptor {
    type_name: String,
    name: String,
    fields: Vec<Field>,
}

impl RecordTypeDescriptor {
    /// Creates a descriptor from a field list, resolving name collisions.
    pub fn new(type_name: impl Into<String>, mut fields: Vec<Field>) -> Self {
        let type_name = type_name.into();
        resolve_collisions(&mut fields);
        Self {
            name: naming::normalize(&type_name),
            type_name,
            fields,
        }
    }

    /// Builds a descriptor from a sample record element.
    ///
    /// Each direct child becomes a field, in document order.
    pub fn from_sample(type_name: impl Into<String>, sample: &Element) -> Self {
        let fields = sample
            .children()
            .iter()
            .map(|child| Field::new(child.name(), ValueKind::infer(child)))
            .collect();
        Self::new(type_name, fields)
    }

    /// Returns the record type name used on the wire.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the normalized record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in sample order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by its normalized name.
    pub fn field(&self, normalized_name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.normalized_name == normalized_name)
    }

    /// Looks up a field by its raw tag name.
    pub fn field_by_raw(&self, raw_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.raw_name == raw_name)
    }
}

/// Disambiguates fields whose raw names normalize to the same identifier.
///
/// Walking the list in order, every field that collides with any earlier field
/// of a different raw name advances that name's counter. The counter is
/// appended only when the field's raw name contains a separator; run-together
/// names keep the colliding identifier.
pub fn resolve_collisions(fields: &mut [Field]) {
    // normalized name -> (raw names seen so far, counter)
    let mut groups: HashMap<String, (Vec<String>, usize)> = HashMap::new();

    for field in fields.iter_mut() {
        if let Some((seen, counter)) = groups.get_mut(&field.normalized_name) {
            if seen.iter().any(|raw| *raw != field.raw_name) {
                if !seen.contains(&field.raw_name) {
                    seen.push(field.raw_name.clone());
                }
                if field.raw_name.contains(naming::SEPARATOR) {
                    field.normalized_name = format!("{}{}", field.normalized_name, counter);
                }
                *counter += 1;
            }
            continue;
        }
        groups.insert(
            field.normalized_name.clone(),
            (vec![field.raw_name.clone()], 1),
        );
    }
}
