//! Per-endpoint query processing: parse, order, then page or return all.

use crate::domain::errors::ConfigError;
use crate::domain::options::{DEFAULT_PAGE_SIZE, QueryOptions};
use crate::domain::page::QueryOutcome;
use crate::domain::sort::SortSpec;
use crate::forms::query::{RawParams, parse_query_options};
use crate::pagination::paginate;
use crate::repository::QuerySource;
use crate::repository::errors::QueryResult;
use crate::services::ordering::apply_sorting;

/// Settings of one intercepted endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptorConfig {
    /// Page even when the request carries no `page`/`pageSize`.
    pub force_pagination: bool,
    pub default_page_size: usize,
    /// `"<field> [asc|desc]"` applied when the request has no `sort`.
    pub default_sort: Option<String>,
    /// Filter out records with absent intermediates before nested ordering.
    pub null_guards: bool,
    /// Upper bound for the requested page size; `None` leaves it unbounded.
    pub max_page_size: Option<usize>,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            force_pagination: false,
            default_page_size: DEFAULT_PAGE_SIZE,
            default_sort: None,
            null_guards: true,
            max_page_size: None,
        }
    }
}

impl InterceptorConfig {
    pub fn paginated() -> Self {
        Self {
            force_pagination: true,
            ..Self::default()
        }
    }

    pub fn default_sort(mut self, expression: impl Into<String>) -> Self {
        self.default_sort = Some(expression.into());
        self
    }

    pub fn default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn null_guards(mut self, enabled: bool) -> Self {
        self.null_guards = enabled;
        self
    }

    pub fn max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = Some(max);
        self
    }
}

/// A validated [`InterceptorConfig`] ready to process requests.
#[derive(Clone, Debug)]
pub struct QueryInterceptor {
    config: InterceptorConfig,
    default_sort: Option<SortSpec>,
}

impl QueryInterceptor {
    /// Validates `config`; a malformed default sort or zero page size is rejected.
    pub fn new(config: InterceptorConfig) -> Result<Self, ConfigError> {
        if config.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if config.max_page_size == Some(0) {
            return Err(ConfigError::ZeroMaxPageSize);
        }
        let default_sort = match config.default_sort.as_deref() {
            Some(expression) if !expression.trim().is_empty() => {
                Some(SortSpec::parse_default(expression)?)
            }
            _ => None,
        };
        Ok(Self {
            config,
            default_sort,
        })
    }

    /// Parses the request parameters with this endpoint's defaults and cap.
    pub fn options(&self, params: Option<&RawParams>) -> QueryResult<QueryOptions> {
        let mut options = parse_query_options(
            params,
            self.config.default_page_size,
            self.default_sort.as_ref(),
        )?;
        if let Some(max) = self.config.max_page_size {
            options.page_size = options.page_size.min(max);
        }
        Ok(options)
    }

    /// Orders `source` and returns either one page or the whole collection.
    pub fn process<S: QuerySource>(
        &self,
        params: Option<&RawParams>,
        source: S,
    ) -> QueryResult<QueryOutcome<S::Item>> {
        let options = self.options(params)?;
        let source = apply_sorting(
            source,
            options.primary_sort.as_ref(),
            options.secondary_sort.as_ref(),
            self.config.null_guards,
        );

        if self.config.force_pagination || options.pagination_requested {
            Ok(QueryOutcome::Paged(paginate(&source, &options)?))
        } else {
            Ok(QueryOutcome::Full(source.fetch_all()?))
        }
    }
}
