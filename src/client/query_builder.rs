//! Canonical query strings for paged requests.

use crate::domain::sort::SortSpec;
use crate::forms::query::{PAGE_PARAM, PAGE_SIZE_PARAM, SORT_PARAM, THEN_SORT_PARAM};

/// Page, size, sorts and custom parameters of one request.
///
/// Custom parameters keep the order in which they were first set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryBuilder {
    pub page: usize,
    pub page_size: usize,
    pub sort: Option<SortSpec>,
    pub then_sort: Option<SortSpec>,
    pub params: Vec<(String, Option<String>)>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort: None,
            then_sort: None,
            params: Vec::new(),
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn then_sort(mut self, sort: SortSpec) -> Self {
        self.then_sort = Some(sort);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.set_param(&name.into(), value);
        self
    }

    pub fn get_param(&self, name: &str) -> Option<Option<&str>> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref())
    }

    /// Sets or replaces a custom parameter; returns whether anything changed.
    pub fn set_param(&mut self, name: &str, value: Option<&str>) -> bool {
        match self.params.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) if current.as_deref() == value => false,
            Some((_, current)) => {
                *current = value.map(str::to_string);
                true
            }
            None => {
                self.params
                    .push((name.to_string(), value.map(str::to_string)));
                true
            }
        }
    }

    /// Removes a custom parameter; returns whether it was present.
    pub fn remove_param(&mut self, name: &str) -> bool {
        let before = self.params.len();
        self.params.retain(|(key, _)| key != name);
        self.params.len() != before
    }

    /// Renders `?page=..&pageSize=..[&sort=..][&thenSort=..][&key[=value]]*`.
    pub fn build(&self) -> String {
        let mut query = format!(
            "?{PAGE_PARAM}={}&{PAGE_SIZE_PARAM}={}",
            self.page.max(1),
            self.page_size.max(1)
        );
        push_sort(&mut query, SORT_PARAM, self.sort.as_ref());
        push_sort(&mut query, THEN_SORT_PARAM, self.then_sort.as_ref());
        for (name, value) in &self.params {
            query.push('&');
            query.push_str(&urlencoding::encode(name));
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                query.push('=');
                query.push_str(&urlencoding::encode(value));
            }
        }
        query
    }
}

fn push_sort(query: &mut String, name: &str, sort: Option<&SortSpec>) {
    let Some(sort) = sort.filter(|s| !s.field_path.trim().is_empty()) else {
        return;
    };
    query.push('&');
    query.push_str(name);
    query.push('=');
    query.push_str(&urlencoding::encode(&sort.field_path));
    query.push_str("%20");
    query.push_str(sort.direction.as_str());
}
