//! Dynamic filter, search, sort and pagination over any [`Queryable`](crate::core::Queryable) type

pub mod criterion;
pub mod engine;
pub mod operator;
pub mod page;
pub mod params;
pub mod search;
pub mod sort;

pub use criterion::{CompiledCriterion, FilterCriterion};
pub use engine::{ListQuery, apply_filter, apply_search, apply_sort, execute, paginate};
pub use operator::{FilterOperator, UnknownOperator};
pub use page::{Page, PageRequest, PaginationMeta};
pub use params::ListParams;
pub use search::CompiledSearch;
pub use sort::{CompiledSort, SortDirection, SortSpec};
