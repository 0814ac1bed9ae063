//! Request-shaped list parameters

use crate::config::PaginationConfig;
use crate::core::error::QueryError;
use crate::query::criterion::FilterCriterion;
use crate::query::engine::ListQuery;
use crate::query::page::PageRequest;
use crate::query::sort::SortSpec;
use serde::{Deserialize, Serialize};

/// Raw list parameters as an upstream request layer hands them over.
///
/// Everything is optional; [`ListParams::into_query`] applies defaults and
/// validates.
///
/// ```json
/// {
///   "pageNumber": 2,
///   "pageSize": 25,
///   "filters": [{ "propertyName": "status", "operator": "Equal", "value": "active" }],
///   "searchTerm": "smith",
///   "sortField": "last_name",
///   "sortOrder": "desc"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    #[serde(alias = "PageNumber", alias = "page_number", alias = "page")]
    pub page_number: Option<i64>,

    #[serde(alias = "PageSize", alias = "page_size", alias = "limit")]
    pub page_size: Option<i64>,

    #[serde(alias = "Filters")]
    pub filters: Vec<FilterCriterion>,

    #[serde(alias = "SearchTerm", alias = "search_term", alias = "search")]
    pub search_term: Option<String>,

    #[serde(alias = "SortField", alias = "sort_field")]
    pub sort_field: Option<String>,

    #[serde(alias = "SortOrder", alias = "sort_order", alias = "sortDirection")]
    pub sort_order: Option<String>,
}

impl ListParams {
    /// Validate into a [`ListQuery`].
    ///
    /// Page parameters are checked first: a missing page number means 1, a
    /// missing page size means `pagination.default_page_size`, and a page
    /// size above `pagination.max_page_size` is rejected. The sort
    /// direction is checked next. Property names are resolved later, when
    /// the query runs against a concrete entity type.
    pub fn into_query(self, pagination: &PaginationConfig) -> Result<ListQuery, QueryError> {
        let page_size = self
            .page_size
            .unwrap_or(i64::from(pagination.default_page_size));
        if page_size > i64::from(pagination.max_page_size) {
            return Err(QueryError::InvalidPageSize { page_size });
        }
        let page = PageRequest::new(self.page_number.unwrap_or(1), page_size)?;

        let sort = SortSpec::parse(self.sort_field.as_deref(), self.sort_order.as_deref())?;

        Ok(ListQuery {
            page,
            filters: self.filters,
            search: self.search_term,
            search_fields: None,
            sort,
        })
    }
}
