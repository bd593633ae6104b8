//! Conversion of raw query-string parameters into [`QueryOptions`].
//!
//! Parsing is forgiving: malformed values fall back to defaults and never
//! produce an error. The only failure is a missing parameter map.

use std::collections::HashMap;

use crate::domain::options::QueryOptions;
use crate::domain::sort::SortSpec;
use crate::repository::errors::{QueryError, QueryResult};

pub const SORT_PARAM: &str = "sort";
pub const THEN_SORT_PARAM: &str = "thenSort";
pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Parameter name to every value supplied for it, in request order.
pub type RawParams = HashMap<String, Vec<String>>;

/// Splits a raw query string into [`RawParams`].
///
/// Undecodable input is treated as carrying no parameters.
pub fn raw_params_from_query(query: &str) -> RawParams {
    let pairs: Vec<(String, String)> = match serde_html_form::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            log::debug!("Ignoring undecodable query string {query:?}: {e}");
            Vec::new()
        }
    };

    let mut params = RawParams::new();
    for (name, value) in pairs {
        params.entry(name).or_default().push(value);
    }
    params
}

fn first<'a>(params: &'a RawParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Parses a positive integer; `Some(None)` is a parseable but non-positive value.
fn parse_positive(raw: Option<&str>) -> Option<Option<usize>> {
    let number = raw?.trim().parse::<i64>().ok()?;
    Some(usize::try_from(number).ok().filter(|n| *n > 0))
}

/// Builds [`QueryOptions`] from request parameters.
///
/// `default_page_size` applies when `pageSize` is missing or not positive;
/// `default_sort` applies when `sort` is missing or blank. `thenSort` never
/// falls back to a default.
pub fn parse_query_options(
    params: Option<&RawParams>,
    default_page_size: usize,
    default_sort: Option<&SortSpec>,
) -> QueryResult<QueryOptions> {
    let params = params.ok_or(QueryError::MissingParameters)?;
    let default_page_size = default_page_size.max(1);

    let primary_sort = match first(params, SORT_PARAM).filter(|s| !s.trim().is_empty()) {
        Some(expression) => SortSpec::parse(expression),
        None => default_sort.cloned(),
    };
    let secondary_sort = first(params, THEN_SORT_PARAM).and_then(SortSpec::parse);

    let page = parse_positive(first(params, PAGE_PARAM));
    let page_size = parse_positive(first(params, PAGE_SIZE_PARAM));

    Ok(QueryOptions {
        primary_sort,
        secondary_sort,
        page: page.flatten().unwrap_or(1),
        page_size: page_size.flatten().unwrap_or(default_page_size),
        pagination_requested: page.is_some() || page_size.is_some(),
    })
}
