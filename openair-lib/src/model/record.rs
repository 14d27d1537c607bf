//! Records decoded against a record type descriptor

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use super::Value;
use super::types::Address;
use super::types::DateValue;
use crate::api::xml::Element;
use crate::error::FieldError;
use crate::schema::ADDRESS_TAG;
use crate::schema::DATE_TAG;
use crate::schema::RecordTypeDescriptor;
use crate::schema::ValueKind;

/// One record of a record type.
///
/// Values are kept in descriptor order and looked up by normalized field
/// name. Fields the API did not send are absent.
///
/// # Example
///
/// ```
/// use openair_lib::model::{Record, Value};
///
/// let record = Record::new("Customer")
///     .set("Name", "name", "Acme")
///     .set("ID", "id", "12");
///
/// assert_eq!(record.get_text("Name").unwrap(), "Acme");
/// assert_eq!(record.get_raw("id"), Some(&Value::from("12")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    type_name: String,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    raw_name: String,
    value: Value,
}

impl Record {
    /// Creates an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds a value under its normalized and raw field names.
    pub fn set(
        mut self,
        name: impl Into<String>,
        raw_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            raw_name: raw_name.into(),
            value: value.into(),
        });
        self
    }

    /// Decodes a record element using the descriptor's fields.
    ///
    /// Child elements the descriptor does not know are ignored.
    pub fn decode(descriptor: &RecordTypeDescriptor, element: &Element) -> Self {
        let mut record = Self::new(descriptor.type_name());
        for field in descriptor.fields() {
            let Some(child) = element.child(&field.raw_name) else {
                continue;
            };
            let value = match field.value_kind {
                ValueKind::Text => Value::Text(child.text().to_string()),
                ValueKind::Date => Value::Date(
                    child
                        .child(DATE_TAG)
                        .map(DateValue::from_element)
                        .unwrap_or_default(),
                ),
                ValueKind::Address => Value::Address(
                    child
                        .child(ADDRESS_TAG)
                        .map(Address::from_element)
                        .unwrap_or_default(),
                ),
            };
            record.entries.push(Entry {
                name: field.normalized_name.clone(),
                raw_name: field.raw_name.clone(),
                value,
            });
        }
        record
    }

    /// Returns the record type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the value of a field by normalized name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// Returns the value of a field by raw tag name.
    pub fn get_raw(&self, raw_name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.raw_name == raw_name)
            .map(|e| &e.value)
    }

    /// Returns `true` if the record has a value for the field.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates `(normalized name, value)` pairs in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.value))
    }

    /// Returns the number of values in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record holds no values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a text field.
    pub fn get_text(&self, name: &str) -> Result<&str, FieldError> {
        self.typed(name, ValueKind::Text, Value::as_text)
    }

    /// Gets a date field.
    pub fn get_date(&self, name: &str) -> Result<&DateValue, FieldError> {
        self.typed(name, ValueKind::Date, Value::as_date)
    }

    /// Gets an address field.
    pub fn get_address(&self, name: &str) -> Result<&Address, FieldError> {
        self.typed(name, ValueKind::Address, Value::as_address)
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        name: &str,
        expected: ValueKind,
        extract: impl FnOnce(&'a Value) -> Option<&'a T>,
    ) -> Result<&'a T, FieldError> {
        let value = self.get(name).ok_or_else(|| FieldError::absent(name))?;
        extract(value).ok_or_else(|| FieldError::wrong_kind(name, expected, value.kind()))
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}
