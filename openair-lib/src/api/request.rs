//! Request envelope generation.

use chrono::DateTime;
use chrono::Datelike;
use chrono::Utc;

use super::xml::escape_xml;
use crate::Config;

/// A `Read` request for one record type.
///
/// # Example
///
/// ```
/// use openair_lib::api::ReadRequest;
///
/// let read = ReadRequest::new("Customer").limit(1);
/// assert!(read.to_xml().contains(r#"limit="1""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    type_name: String,
    offset: Option<usize>,
    limit: usize,
    modified_since: Option<DateTime<Utc>>,
}

impl ReadRequest {
    /// Creates a request for all records of `type_name`, one record at a time.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            offset: None,
            limit: 1,
            modified_since: None,
        }
    }

    /// Sets the number of records to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the offset of the first record; renders `limit="offset,count"`.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Restricts results to records modified on or after the given day.
    pub fn modified_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.modified_since = since;
        self
    }

    /// Returns the record type being read.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Renders the `<Read>` element.
    pub fn to_xml(&self) -> String {
        let limit = match self.offset {
            Some(offset) => format!("{},{}", offset, self.limit),
            None => self.limit.to_string(),
        };

        let (filter_attributes, filter_body) = match &self.modified_since {
            Some(since) => (
                r#" filter="newer-than" field="date""#,
                format!(
                    "<Date><year>{}</year><month>{}</month><day>{}</day></Date>",
                    since.year(),
                    since.month(),
                    since.day()
                ),
            ),
            None => ("", String::new()),
        };

        format!(
            r#"<Read type="{}" method="all" limit="{}" enable_custom="1" include_nondeleted="1" deleted="1"{}>{}</Read>"#,
            escape_xml(&self.type_name),
            limit,
            filter_attributes,
            filter_body
        )
    }
}

/// Wraps a `Read` element in the authenticated request envelope.
pub fn envelope(config: &Config, read: &ReadRequest) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<request API_version="1.0" client_ver="1.1" namespace="{}" key="{}">"#,
            "<Auth><Login><company>{}</company><user>{}</user><password>{}</password></Login></Auth>",
            "{}",
            "</request>"
        ),
        escape_xml(&config.namespace),
        escape_xml(&config.key),
        escape_xml(&config.company),
        escape_xml(&config.user),
        escape_xml(&config.password),
        read.to_xml()
    )
}
