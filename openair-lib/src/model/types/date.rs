//! Date type

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use crate::api::xml::Element;

/// The API's `<Date>` structure.
///
/// Every part is kept as sent; the API leaves parts empty for unset dates.
///
/// # Example
///
/// ```
/// use openair_lib::model::types::DateValue;
///
/// let date = DateValue {
///     year: Some("2024".into()),
///     month: Some("03".into()),
///     day: Some("07".into()),
///     ..Default::default()
/// };
/// assert_eq!(date.to_naive().unwrap().to_string(), "2024-03-07 00:00:00");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl DateValue {
    /// Decodes a `<Date>` element.
    pub(crate) fn from_element(element: &Element) -> Self {
        let part = |name: &str| {
            element
                .child_text(name)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            year: part("year"),
            month: part("month"),
            day: part("day"),
            hour: part("hour"),
            minute: part("minute"),
            second: part("second"),
            timezone: part("timezone"),
        }
    }

    /// Returns `true` if no part is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Converts to a calendar date, if year, month and day are valid.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = parse_part(&self.year)?;
        let month = parse_part(&self.month)?;
        let day = parse_part(&self.day)?;
        NaiveDate::from_ymd_opt(year as i32, month, day)
    }

    /// Converts to a date and time; missing time parts count as zero.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let time_part = |part: &Option<String>| match part {
            Some(_) => parse_part(part),
            None => Some(0),
        };
        self.to_date()?.and_hms_opt(
            time_part(&self.hour)?,
            time_part(&self.minute)?,
            time_part(&self.second)?,
        )
    }
}

fn parse_part(part: &Option<String>) -> Option<u32> {
    part.as_deref()?.trim().parse().ok()
}
