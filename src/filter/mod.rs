pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod pagination;
pub mod error;

pub use error::FilterError;
pub use filter::Filter;
pub use filter_where::FilterWhere;
pub use pagination::{Pagination, Sort, SortField, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use types::*;
