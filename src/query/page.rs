//! Pagination: validated page requests and paginated responses

use crate::core::error::QueryError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: usize,
    size: usize,
}

impl PageRequest {
    /// Page 1 of 20 records
    pub const DEFAULT: PageRequest = PageRequest { number: 1, size: 20 };

    /// Validate raw page parameters.
    ///
    /// The page size is checked before the page number.
    pub fn new(page_number: i64, page_size: i64) -> Result<Self, QueryError> {
        if page_size < 1 {
            return Err(QueryError::InvalidPageSize { page_size });
        }
        if page_number < 1 {
            return Err(QueryError::InvalidPageNumber { page_number });
        }
        Ok(Self {
            number: usize::try_from(page_number).unwrap_or(usize::MAX),
            size: usize::try_from(page_size).unwrap_or(usize::MAX),
        })
    }

    /// First page of `page_size` records
    pub fn first(page_size: i64) -> Result<Self, QueryError> {
        Self::new(1, page_size)
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of records skipped before this page
    pub fn offset(&self) -> usize {
        (self.number - 1).saturating_mul(self.size)
    }

    /// Take this page out of `items`. Pages past the end are empty.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.size)
            .collect()
    }
}

/// One page of results plus the metadata a caller needs for paging UI
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The records on this page
    pub items: Vec<T>,

    /// Pagination metadata
    pub meta: PaginationMeta,

    /// Related records referenced by the items, keyed by the foreign-key
    /// property that references them
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub included: BTreeMap<String, Vec<Value>>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: usize) -> Self {
        Self {
            items,
            meta: PaginationMeta::new(request.number(), request.size(), total),
            included: BTreeMap::new(),
        }
    }

    /// The related records included through `field`
    pub fn included(&self, field: &str) -> &[Value] {
        self.included.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Transform every record, keeping the metadata and included records
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
            included: self.included,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filter and search)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        let end = page.saturating_mul(page_size);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: end < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_validation() {
        assert_eq!(
            PageRequest::new(1, 0),
            Err(QueryError::InvalidPageSize { page_size: 0 })
        );
        assert_eq!(
            PageRequest::new(0, 10),
            Err(QueryError::InvalidPageNumber { page_number: 0 })
        );
        assert_eq!(
            PageRequest::new(-3, -1),
            Err(QueryError::InvalidPageSize { page_size: -1 })
        );
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn test_offset_and_slice() {
        let page = PageRequest::new(2, 3).unwrap();
        assert_eq!(page.offset(), 3);
        assert_eq!(page.slice((1..=8).collect()), vec![4, 5, 6]);

        let last = PageRequest::new(3, 3).unwrap();
        assert_eq!(last.slice((1..=8).collect()), vec![7, 8]);

        let beyond = PageRequest::new(9, 3).unwrap();
        assert!(beyond.slice((1..=8).collect::<Vec<i32>>()).is_empty());
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let page = PageRequest::new(i64::MAX, i64::MAX).unwrap();
        assert!(page.slice(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(8, 20, 145);
        assert!(last.has_prev);
        assert!(!last.has_next);

        let empty = PaginationMeta::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn test_page_map_keeps_meta() {
        let request = PageRequest::new(1, 2).unwrap();
        let page = Page::new(vec![1, 2], request, 5).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.meta.has_next);
    }

    #[test]
    fn test_included_serialized_only_when_present() {
        let request = PageRequest::new(1, 2).unwrap();
        let mut page = Page::new(vec![1], request, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("included").is_none());
        assert!(page.included("term_id").is_empty());

        page.included
            .insert("term_id".into(), vec![serde_json::json!({ "name": "Autumn" })]);
        let page = page.map(|n| n + 1);
        assert_eq!(page.included("term_id").len(), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["included"]["term_id"][0]["name"], "Autumn");
    }
}
