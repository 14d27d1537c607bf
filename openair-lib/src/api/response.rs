//! Response envelope decoding.

use tracing::warn;

use super::xml::Element;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;
use crate::model::Record;
use crate::schema::RecordTypeDescriptor;

/// Auth status reported for an accepted session.
pub const AUTH_OK: &str = "0";

/// A decoded `<response>` whose session was accepted.
#[derive(Debug, Clone)]
pub struct ReadResponse {
    read: Element,
}

impl ReadResponse {
    /// Parses a response body and checks its auth status.
    ///
    /// Fails with [`AuthError`] when `Auth/@status` is anything but `"0"`,
    /// before the `Read` payload is looked at.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let root = Element::parse(body).map_err(|e| match e {
            ApiError::Parse { message, .. } => ApiError::parse_with_body(message, body),
            other => other,
        })?;
        if root.name() != "response" {
            return Err(ApiError::parse_with_body(
                format!("expected <response>, found <{}>", root.name()),
                body,
            )
            .into());
        }

        let status = root
            .child("Auth")
            .and_then(|auth| auth.attribute("status"))
            .unwrap_or_default();
        if status != AUTH_OK {
            return Err(AuthError::rejected(status).into());
        }

        let read = root
            .child("Read")
            .cloned()
            .ok_or_else(|| ApiError::parse_with_body("response has no <Read> element", body))?;

        if let Some(status) = read.attribute("status").filter(|s| *s != AUTH_OK) {
            warn!(status, "read returned a non-zero status");
        }

        Ok(Self { read })
    }

    /// Returns the `Read/@status` code, if present.
    pub fn read_status(&self) -> Option<&str> {
        self.read.attribute("status")
    }

    /// Returns the first record element, the sample used for schema probing.
    pub fn sample(&self) -> Option<&Element> {
        self.read.children().first()
    }

    /// Decodes every record element of the descriptor's type.
    pub fn records(&self, descriptor: &RecordTypeDescriptor) -> Vec<Record> {
        self.read
            .children_named(descriptor.type_name())
            .map(|element| Record::decode(descriptor, element))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use crate::schema::ValueKind;

    fn descriptor() -> RecordTypeDescriptor {
        RecordTypeDescriptor::new(
            "Customer",
            vec![
                Field::new("id", ValueKind::Text),
                Field::new("name", ValueKind::Text),
            ],
        )
    }

    #[test]
    fn test_records() {
        let response = ReadResponse::parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <response><Auth status="0"></Auth><Read status="0">
                <Customer><id>1</id><name>Acme</name></Customer>
                <Customer><id>2</id><name>Globex</name></Customer>
            </Read></response>"#,
        )
        .unwrap();

        let records = response.records(&descriptor());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_text("Name").unwrap(), "Globex");
        assert_eq!(response.read_status(), Some("0"));
    }

    #[test]
    fn test_auth_failure_skips_payload() {
        // The Read payload is garbage; the auth check must fire first.
        let err = ReadResponse::parse(
            r#"<response><Auth status="401"/><Read status="0"><Customer>oops</Customer></Read></response>"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Auth(ref e) if e.status() == "401"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_auth_is_auth_failure() {
        let err = ReadResponse::parse(r#"<response><Read status="0"/></response>"#).unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_malformed() {
        let err = ReadResponse::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));
        assert!(err.is_retryable());

        let err = ReadResponse::parse(r#"<response><Auth status="0"/></response>"#).unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));

        let err = ReadResponse::parse("<response><Auth").unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { body: Some(_), .. })));
    }
}
