//! Typed lookups on decoded records

use crate::schema::ValueKind;

/// A [`Record`](crate::model::Record) lookup that did not yield the requested
/// kind of value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The API sent no element for this field.
    #[error("No value for field '{name}'")]
    Absent { name: String },

    /// The field was inferred as a different kind when the type was probed.
    #[error("Field '{name}' holds a {actual:?} value, not {expected:?}")]
    WrongKind {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

impl FieldError {
    pub fn absent(name: impl Into<String>) -> Self {
        Self::Absent { name: name.into() }
    }

    pub fn wrong_kind(name: impl Into<String>, expected: ValueKind, actual: ValueKind) -> Self {
        Self::WrongKind {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Returns the normalized field name that was looked up.
    pub fn name(&self) -> &str {
        match self {
            Self::Absent { name } | Self::WrongKind { name, .. } => name,
        }
    }
}
