use super::error::FilterError;
use super::types::{Column, SortDirection};

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn from_request(page_number: Option<u64>, page_size: Option<u64>) -> Result<Self, FilterError> {
        let page_number = page_number.unwrap_or(DEFAULT_PAGE_NUMBER);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page_number < 1 {
            return Err(FilterError::InvalidPageNumber);
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(FilterError::InvalidPageSize);
        }
        // OFFSET is a bigint
        let offset = (page_number - 1).checked_mul(page_size);
        if !offset.is_some_and(|o| i64::try_from(o).is_ok()) {
            return Err(FilterError::InvalidPageNumber);
        }

        Ok(Self { page_number, page_size })
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

/// API-facing sort key mapped onto a whitelisted column.
pub trait SortField: Copy + Sized {
    fn parse(name: &str) -> Option<Self>;
    fn column(&self) -> Column;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Unknown field names are rejected; direction defaults to descending.
    pub fn from_request(sort_by: Option<&str>, sort_order: Option<&str>, default: F) -> Result<Self, FilterError> {
        let field = match sort_by {
            Some(name) => F::parse(name).ok_or_else(|| FilterError::UnknownSortField(name.to_string()))?,
            None => default,
        };
        let direction = match sort_order {
            Some(order) => SortDirection::parse(order)?,
            None => SortDirection::default(),
        };
        Ok(Self { field, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestField {
        Name,
        CreatedAt,
    }

    impl SortField for TestField {
        fn parse(name: &str) -> Option<Self> {
            match name {
                "name" => Some(TestField::Name),
                "createdAt" => Some(TestField::CreatedAt),
                _ => None,
            }
        }

        fn column(&self) -> Column {
            match self {
                TestField::Name => Column::new("t", "name"),
                TestField::CreatedAt => Column::new("t", "created_at"),
            }
        }
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let p = Pagination::from_request(None, None).unwrap();
        assert_eq!(p, Pagination { page_number: 1, page_size: 10 });
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn computes_offset_from_page_and_size() {
        let p = Pagination::from_request(Some(3), Some(25)).unwrap();
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(Pagination::from_request(Some(0), None), Err(FilterError::InvalidPageNumber));
        assert_eq!(Pagination::from_request(None, Some(0)), Err(FilterError::InvalidPageSize));
        assert_eq!(Pagination::from_request(None, Some(1000)), Err(FilterError::InvalidPageSize));
        assert!(Pagination::from_request(None, Some(100)).is_ok());
    }

    #[test]
    fn rejects_page_number_past_bigint_offset() {
        assert_eq!(
            Pagination::from_request(Some(100_000_000_000_000_000), Some(100)),
            Err(FilterError::InvalidPageNumber)
        );
        assert_eq!(Pagination::from_request(Some(u64::MAX), Some(1)), Err(FilterError::InvalidPageNumber));

        let last = Pagination::from_request(Some(i64::MAX as u64 + 1), Some(1)).unwrap();
        assert_eq!(last.offset(), i64::MAX as u64);
    }

    #[test]
    fn sort_defaults_and_whitelist() {
        let sort = Sort::from_request(None, None, TestField::CreatedAt).unwrap();
        assert_eq!(sort.field, TestField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = Sort::from_request(Some("name"), Some("ASC"), TestField::CreatedAt).unwrap();
        assert_eq!(sort.field, TestField::Name);
        assert_eq!(sort.direction, SortDirection::Asc);

        let err = Sort::from_request(Some("password_hash"), None, TestField::CreatedAt).unwrap_err();
        assert_eq!(err.field(), Some("sortBy"));

        let err = Sort::from_request(None, Some("sideways"), TestField::CreatedAt).unwrap_err();
        assert_eq!(err.field(), Some("sortOrder"));
    }
}
