use thiserror::Error;

/// Errors raised while setting up an interceptor.
///
/// These are programming errors in the caller's configuration and surface at
/// construction time, never while a request is being served.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "invalid default sort {0:?}: use \"<field>\" or \"<field> asc|desc\" with at most two segments"
    )]
    InvalidDefaultSort(String),

    #[error("default page size must be greater than zero")]
    ZeroPageSize,

    #[error("max page size must be greater than zero")]
    ZeroMaxPageSize,
}
