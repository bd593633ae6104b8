use crate::domain::sort::SortDirection;
use crate::repository::errors::QueryResult;
use crate::repository::fields::{FieldAccessor, RecordSchema};

pub mod errors;
pub mod fields;
pub mod memory;
pub mod sql;
pub mod users;

pub use memory::MemorySource;
pub use sql::SqlSource;
pub use users::DieselUserRepository;

/// A lazily evaluated collection that can be filtered, ordered and sliced.
///
/// The composing methods only record what to do; nothing touches the backing
/// data until [`QuerySource::count`] or [`QuerySource::fetch`] is called.
pub trait QuerySource: Sized {
    type Item;

    /// Registry of the record type this source yields.
    fn schema(&self) -> &'static RecordSchema;

    /// Drops records where the record reached through `path` is absent.
    fn where_not_null(self, path: &FieldAccessor) -> Self;

    /// Orders by `key`, replacing any ordering applied before.
    fn order_by(self, key: &FieldAccessor, direction: SortDirection) -> Self;

    /// Adds `key` as a tie-breaker after the existing ordering.
    fn then_by(self, key: &FieldAccessor, direction: SortDirection) -> Self;

    fn count(&self) -> QueryResult<usize>;

    /// Materializes records after skipping `skip`, at most `take` of them.
    fn fetch(&self, skip: usize, take: Option<usize>) -> QueryResult<Vec<Self::Item>>;

    fn fetch_all(&self) -> QueryResult<Vec<Self::Item>> {
        self.fetch(0, None)
    }

    /// Converts every fetched batch with `convert`, e.g. to attach related records.
    fn map_records<F, U>(self, convert: F) -> MapRecords<Self, F>
    where
        F: Fn(Vec<Self::Item>) -> QueryResult<Vec<U>>,
    {
        MapRecords {
            inner: self,
            convert,
        }
    }
}

/// Source returned by [`QuerySource::map_records`].
pub struct MapRecords<S, F> {
    inner: S,
    convert: F,
}

impl<S, F, U> QuerySource for MapRecords<S, F>
where
    S: QuerySource,
    F: Fn(Vec<S::Item>) -> QueryResult<Vec<U>>,
{
    type Item = U;

    fn schema(&self) -> &'static RecordSchema {
        self.inner.schema()
    }

    fn where_not_null(self, path: &FieldAccessor) -> Self {
        Self {
            inner: self.inner.where_not_null(path),
            convert: self.convert,
        }
    }

    fn order_by(self, key: &FieldAccessor, direction: SortDirection) -> Self {
        Self {
            inner: self.inner.order_by(key, direction),
            convert: self.convert,
        }
    }

    fn then_by(self, key: &FieldAccessor, direction: SortDirection) -> Self {
        Self {
            inner: self.inner.then_by(key, direction),
            convert: self.convert,
        }
    }

    fn count(&self) -> QueryResult<usize> {
        self.inner.count()
    }

    fn fetch(&self, skip: usize, take: Option<usize>) -> QueryResult<Vec<U>> {
        (self.convert)(self.inner.fetch(skip, take)?)
    }
}
