//! Client side: keeps a paged view of a remote collection in sync.
//!
//! [`PaginationClient`] turns page, size, sort and filter changes into query
//! strings, coalesces bursts of changes into one request, cancels requests
//! that were superseded and publishes every successfully received page.

use thiserror::Error;

use crate::domain::sort::{SortDirection, SortSpec};
use crate::repository::fields::{FieldAccessor, Record};

#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod pipeline;
pub mod query_builder;
pub mod replay;
pub mod response;
pub mod transport;

pub use pipeline::PaginationClient;
pub use query_builder::QueryBuilder;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

/// Page size used by [`PaginationClient::fetch_all`].
pub const FETCH_ALL_PAGE_SIZE: usize = 500;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed page envelope: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("`{field}` is not a sortable field of {record}")]
    UnknownSortField { field: String, record: &'static str },

    #[error("the client has been disposed")]
    Closed,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Initial request state of a [`PaginationClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page: usize,
    pub page_size: usize,
    pub sort: Option<SortSpec>,
    pub then_sort: Option<SortSpec>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort: None,
            then_sort: None,
        }
    }
}

impl SortSpec {
    /// Builds a sort on `field_path` after checking it exists on `R`.
    pub fn for_record<R: Record>(
        field_path: &str,
        direction: SortDirection,
    ) -> ClientResult<SortSpec> {
        let schema = R::schema();
        match FieldAccessor::resolve(schema, field_path) {
            Some(accessor) => Ok(SortSpec::new(accessor.path(), direction)),
            None => Err(ClientError::UnknownSortField {
                field: field_path.to_string(),
                record: schema.name,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;

    #[test]
    fn sort_for_record_normalizes_known_fields() {
        let spec = SortSpec::for_record::<User>("FavoriteAnimal.Name", SortDirection::Desc).unwrap();
        assert_eq!(spec, SortSpec::desc("favoriteAnimal.name"));
    }

    #[test]
    fn sort_for_record_rejects_unknown_fields() {
        let err = SortSpec::for_record::<User>("shoeSize", SortDirection::Asc).unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnknownSortField { ref field, record: "User" } if field == "shoeSize"
        ));
    }
}
