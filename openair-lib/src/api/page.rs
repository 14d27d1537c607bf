//! Page and cursor types for paginated reads.

use chrono::DateTime;
use chrono::Utc;

use crate::model::Record;

/// Number of records requested per page when enumerating.
pub const PAGE_SIZE: usize = 1000;

/// Position of the next page request.
///
/// Created per enumeration and advanced by [`FetchCursor::advance`] after each
/// successful page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCursor {
    /// Offset of the first record to return.
    pub offset: usize,
    /// Maximum records per page.
    pub limit: usize,
    /// Only return records modified on or after this day.
    pub modified_since: Option<DateTime<Utc>>,
}

impl FetchCursor {
    /// Creates a cursor at offset 0 with the default page size.
    pub fn new(modified_since: Option<DateTime<Utc>>) -> Self {
        Self {
            offset: 0,
            limit: PAGE_SIZE,
            modified_since,
        }
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Moves the cursor past one full page.
    pub fn advance(&mut self) {
        self.offset += self.limit;
    }
}

impl Default for FetchCursor {
    fn default() -> Self {
        Self::new(None)
    }
}

/// One batch of records returned by a single read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    records: Vec<Record>,
    offset: usize,
}

impl Page {
    /// Creates a page of records read at the given offset.
    pub fn new(records: Vec<Record>, offset: usize) -> Self {
        Self { records, offset }
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the offset this page was requested at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if a page this long may be followed by another.
    pub fn is_full(&self, limit: usize) -> bool {
        self.records.len() >= limit
    }
}

impl IntoIterator for Page {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advance() {
        let mut cursor = FetchCursor::default();
        assert_eq!((cursor.offset, cursor.limit), (0, PAGE_SIZE));
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.offset, 2 * PAGE_SIZE);

        let mut small = FetchCursor::new(None).with_limit(10);
        small.advance();
        assert_eq!(small.offset, 10);
    }

    #[test]
    fn test_page_fullness() {
        let page = Page::new(vec![Record::new("X"), Record::new("X")], 0);
        assert!(page.is_full(2));
        assert!(!page.is_full(3));
        assert_eq!(page.into_iter().count(), 2);
    }
}
