//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::domain::options::DEFAULT_PAGE_SIZE;

#[derive(Clone, Debug, Deserialize)]
/// Settings for the demo server and the interceptors it installs.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default)]
    pub force_pagination: bool,
    #[serde(default)]
    pub default_sort: Option<String>,
    #[serde(default = "default_null_guards")]
    pub null_guards: bool,
    #[serde(default)]
    pub max_page_size: Option<usize>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_null_guards() -> bool {
    true
}
