//! Address type

use serde::Deserialize;
use serde::Serialize;

use crate::api::xml::Element;

/// The API's `<Address>` structure, as embedded in contact-bearing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub id: Option<String>,
    pub contact_id: Option<String>,
    pub salutation: Option<String>,
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub mobile: Option<String>,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub addr3: Option<String>,
    pub addr4: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Decodes an `<Address>` element.
    pub(crate) fn from_element(element: &Element) -> Self {
        let part = |name: &str| {
            element
                .child_text(name)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            id: part("id"),
            contact_id: part("contact_id"),
            salutation: part("salutation"),
            first: part("first"),
            middle: part("middle"),
            last: part("last"),
            email: part("email"),
            phone: part("phone"),
            fax: part("fax"),
            mobile: part("mobile"),
            addr1: part("addr1"),
            addr2: part("addr2"),
            addr3: part("addr3"),
            addr4: part("addr4"),
            city: part("city"),
            state: part("state"),
            zip: part("zip"),
            country: part("country"),
        }
    }

    /// Returns the non-empty street lines in order.
    pub fn street_lines(&self) -> Vec<&str> {
        [&self.addr1, &self.addr2, &self.addr3, &self.addr4]
            .into_iter()
            .filter_map(|line| line.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_element() {
        let element = Element::parse(
            "<Address><first>Ada</first><last>Lovelace</last><addr1>1 Main St</addr1>\
             <addr2/><addr3>Floor 2</addr3><city>London</city><contact_id>42</contact_id></Address>",
        )
        .unwrap();
        let address = Address::from_element(&element);
        assert_eq!(address.first.as_deref(), Some("Ada"));
        assert_eq!(address.contact_id.as_deref(), Some("42"));
        assert_eq!(address.addr2, None);
        assert_eq!(address.street_lines(), ["1 Main St", "Floor 2"]);
    }
}
