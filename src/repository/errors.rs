use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("request parameters are missing")]
    MissingParameters,

    #[error("cannot order by `{path}`: an intermediate record is absent")]
    NullIntermediate { path: String },

    #[error("field `{field}` has no storage mapping")]
    Unmapped { field: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl From<DieselError> for QueryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(_, info) => QueryError::Database(info.message().to_string()),

            DieselError::DeserializationError(e) => {
                QueryError::Database(format!("Deserialization error: {e}"))
            }

            DieselError::QueryBuilderError(e) => {
                QueryError::Database(format!("Query builder error: {e}"))
            }

            _ => QueryError::Database(format!("Unexpected diesel error: {err}")),
        }
    }
}

impl From<R2D2Error> for QueryError {
    fn from(err: R2D2Error) -> Self {
        QueryError::Connection(format!("Connection error: {err}"))
    }
}

impl From<PoolError> for QueryError {
    fn from(err: PoolError) -> Self {
        QueryError::Connection(format!("Connection error: {err}"))
    }
}
