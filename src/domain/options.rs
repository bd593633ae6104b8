use crate::domain::sort::SortSpec;

/// Page size used when neither the request nor the caller provides one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Structured form of the `sort`, `thenSort`, `page` and `pageSize` parameters.
///
/// `page` and `page_size` are always at least one once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    pub primary_sort: Option<SortSpec>,
    pub secondary_sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
    /// Set when the request carried a parseable `page` or `pageSize`.
    pub pagination_requested: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            primary_sort: None,
            secondary_sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            pagination_requested: false,
        }
    }
}

impl QueryOptions {
    /// Number of records preceding the requested page.
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
