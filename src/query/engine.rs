//! The filter → search → sort → paginate pipeline
//!
//! Every stage is a pure function over an owned sequence of records. All
//! property references are resolved against the entity's accessor table
//! before any record is touched, so a malformed request fails without
//! producing partial output.
//!
//! # Example
//!
//! ```rust,ignore
//! let query = ListQuery::new(PageRequest::new(1, 20)?)
//!     .filter(FilterCriterion::new("status", FilterOperator::Equal, "active"))
//!     .search("smith")
//!     .sort(SortSpec::asc("last_name"));
//!
//! let page = engine::execute(staff, &query)?;
//! ```

use crate::core::entity::Queryable;
use crate::core::error::QueryError;
use crate::query::criterion::{CompiledCriterion, FilterCriterion};
use crate::query::page::{Page, PageRequest};
use crate::query::search::CompiledSearch;
use crate::query::sort::SortSpec;

/// Keep the records satisfying every criterion and, when `search_term` is
/// not blank, containing it in one of `T`'s searchable properties.
///
/// Input order is preserved.
pub fn apply_filter<T: Queryable>(
    source: impl IntoIterator<Item = T>,
    filters: &[FilterCriterion],
    search_term: Option<&str>,
) -> Result<Vec<T>, QueryError> {
    let criteria = compile_filters::<T>(filters)?;
    let search = CompiledSearch::<T>::compile(search_term, None)?;
    Ok(retain(source, &criteria, search.as_ref()))
}

/// Free-text search only, optionally over an explicit list of properties.
pub fn apply_search<T: Queryable>(
    source: impl IntoIterator<Item = T>,
    search_term: Option<&str>,
    fields: Option<&[String]>,
) -> Result<Vec<T>, QueryError> {
    let search = CompiledSearch::<T>::compile(search_term, fields)?;
    Ok(retain(source, &[], search.as_ref()))
}

/// Stable sort by a property named at runtime.
///
/// An absent `field` leaves the input order untouched; a present
/// `direction` is validated either way.
pub fn apply_sort<T: Queryable>(
    source: impl IntoIterator<Item = T>,
    field: Option<&str>,
    direction: Option<&str>,
) -> Result<Vec<T>, QueryError> {
    let items: Vec<T> = match SortSpec::parse(field, direction)? {
        Some(spec) => {
            let sort = spec.compile::<T>()?;
            sort.sort(source.into_iter().collect())
        }
        None => source.into_iter().collect(),
    };
    Ok(items)
}

/// Slice one 1-based page out of `source`.
pub fn paginate<T>(
    source: impl IntoIterator<Item = T>,
    page_number: i64,
    page_size: i64,
) -> Result<Vec<T>, QueryError> {
    let request = PageRequest::new(page_number, page_size)?;
    Ok(request.slice(source.into_iter().collect()))
}

/// A complete, validated list request.
///
/// Built in code or from a [`ListParams`](crate::query::params::ListParams)
/// request, which is where page parameters are validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: PageRequest,

    pub filters: Vec<FilterCriterion>,

    pub search: Option<String>,

    /// Properties searched instead of the entity's default searchable set
    pub search_fields: Option<Vec<String>>,

    pub sort: Option<SortSpec>,
}

impl ListQuery {
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            filters: Vec::new(),
            search: None,
            search_fields: None,
            sort: None,
        }
    }

    pub fn filter(mut self, criterion: FilterCriterion) -> Self {
        self.filters.push(criterion);
        self
    }

    pub fn filters(mut self, criteria: impl IntoIterator<Item = FilterCriterion>) -> Self {
        self.filters.extend(criteria);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }
}

/// Run the whole pipeline: filter → search → sort → paginate.
///
/// `meta.total` counts the records left after filter and search.
pub fn execute<T: Queryable>(
    source: impl IntoIterator<Item = T>,
    query: &ListQuery,
) -> Result<Page<T>, QueryError> {
    let criteria = compile_filters::<T>(&query.filters)?;
    let search = CompiledSearch::<T>::compile(query.search.as_deref(), query.search_fields.as_deref())?;
    let sort = query.sort.as_ref().map(SortSpec::compile::<T>).transpose()?;

    let matched = retain(source, &criteria, search.as_ref());
    let total = matched.len();

    let ordered = match &sort {
        Some(sort) => sort.sort(matched),
        None => matched,
    };

    let items = query.page.slice(ordered);

    tracing::debug!(
        entity = T::entity_type(),
        filters = criteria.len(),
        search = search.as_ref().map(|s| s.term()),
        sort = sort.as_ref().map(|s| s.property()),
        page = query.page.number(),
        page_size = query.page.size(),
        total,
        returned = items.len(),
        "list query executed"
    );

    Ok(Page::new(items, query.page, total))
}

fn compile_filters<T: Queryable>(
    filters: &[FilterCriterion],
) -> Result<Vec<CompiledCriterion<T>>, QueryError> {
    filters.iter().map(FilterCriterion::compile::<T>).collect()
}

fn retain<T>(
    source: impl IntoIterator<Item = T>,
    criteria: &[CompiledCriterion<T>],
    search: Option<&CompiledSearch<T>>,
) -> Vec<T> {
    source
        .into_iter()
        .filter(|item| criteria.iter().all(|c| c.matches(item)))
        .filter(|item| search.is_none_or(|s| s.matches(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldType;
    use crate::config::PaginationConfig;
    use crate::core::schema::EntitySchema;
    use crate::query::operator::FilterOperator;
    use crate::query::params::ListParams;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        qty: i64,
    }

    impl Queryable for Item {
        fn schema() -> &'static EntitySchema<Self> {
            static SCHEMA: OnceLock<EntitySchema<Item>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                EntitySchema::<Item>::builder("item")
                    .field::<String>("name", |i| i.name.to_field_value())
                    .field::<i64>("qty", |i| i.qty.to_field_value())
                    .searchable(&["name"])
                    .build()
                    .unwrap()
            })
        }
    }

    fn items() -> Vec<Item> {
        [("bolt", 5), ("nut", 12), ("Washer", 3), ("bolt", 1)]
            .into_iter()
            .map(|(name, qty)| Item {
                name: name.to_string(),
                qty,
            })
            .collect()
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_execute_runs_all_stages() {
        let query = ListQuery::new(PageRequest::new(1, 2).unwrap())
            .filter(FilterCriterion::new("qty", FilterOperator::GreaterThan, 2))
            .sort(SortSpec::desc("qty"));

        let page = execute(items(), &query).unwrap();
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(names(&page.items), vec!["nut", "bolt"]);
    }

    #[test]
    fn test_execute_search_counts_in_total() {
        let query = ListQuery::new(PageRequest::new(1, 10).unwrap()).search("WASH");
        let page = execute(items(), &query).unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(names(&page.items), vec!["Washer"]);
    }

    #[test]
    fn test_execute_fails_before_work_on_bad_sort() {
        let query = ListQuery::new(PageRequest::new(1, 10).unwrap()).sort(SortSpec::asc("weight"));
        let err = execute(items(), &query).err().unwrap();
        assert_eq!(err.error_code(), "UNKNOWN_PROPERTY");
    }

    #[test]
    fn test_apply_sort_without_field_keeps_order() {
        let sorted = apply_sort(items(), None, None).unwrap();
        assert_eq!(sorted, items());
        assert!(apply_sort(items(), None, Some("up")).is_err());
    }

    #[test]
    fn test_paginate_validates() {
        assert_eq!(
            paginate(items(), 1, 0).err(),
            Some(QueryError::InvalidPageSize { page_size: 0 })
        );
        assert_eq!(paginate(items(), 2, 3).unwrap().len(), 1);
        assert!(paginate(items(), 5, 3).unwrap().is_empty());
    }

    #[test]
    fn test_request_page_values_reach_execute() {
        let params: ListParams = serde_json::from_value(serde_json::json!({
            "pageNumber": 2,
            "pageSize": 1,
            "filters": [{ "propertyName": "qty", "operator": "lt", "value": 4 }],
            "sortField": "qty",
            "sortOrder": "DESC"
        }))
        .unwrap();
        let query = params.into_query(&PaginationConfig::default()).unwrap();
        assert_eq!(query.page, PageRequest::new(2, 1).unwrap());

        let page = execute(items(), &query).unwrap();
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.total, 2);
        assert_eq!(names(&page.items), vec!["bolt"]);
    }
}
