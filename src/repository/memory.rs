use crate::domain::sort::SortDirection;
use crate::domain::value::Value;
use crate::repository::QuerySource;
use crate::repository::errors::{QueryError, QueryResult};
use crate::repository::fields::{FieldAccessor, Record, RecordSchema};

/// In-memory implementation of [`QuerySource`] over an owned `Vec`.
#[derive(Clone, Debug)]
pub struct MemorySource<T> {
    items: Vec<T>,
    guards: Vec<FieldAccessor>,
    keys: Vec<(FieldAccessor, SortDirection)>,
}

impl<T> MemorySource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            guards: Vec::new(),
            keys: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for MemorySource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Record> MemorySource<T> {
    fn visible(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| {
            self.guards
                .iter()
                .all(|guard| guard.is_present(*item as &dyn Record))
        })
    }

    fn sort_key(&self, item: &T) -> QueryResult<Vec<Value>> {
        self.keys
            .iter()
            .map(|(key, _)| {
                key.value(item).ok_or_else(|| QueryError::NullIntermediate { path: key.path() })
            })
            .collect()
    }
}

impl<T: Record + Clone> QuerySource for MemorySource<T> {
    type Item = T;

    fn schema(&self) -> &'static RecordSchema {
        T::schema()
    }

    fn where_not_null(mut self, path: &FieldAccessor) -> Self {
        self.guards.push(path.clone());
        self
    }

    fn order_by(mut self, key: &FieldAccessor, direction: SortDirection) -> Self {
        self.keys.clear();
        self.keys.push((key.clone(), direction));
        self
    }

    fn then_by(mut self, key: &FieldAccessor, direction: SortDirection) -> Self {
        self.keys.push((key.clone(), direction));
        self
    }

    fn count(&self) -> QueryResult<usize> {
        Ok(self.visible().count())
    }

    fn fetch(&self, skip: usize, take: Option<usize>) -> QueryResult<Vec<T>> {
        let mut rows = self
            .visible()
            .map(|item| -> QueryResult<_> { Ok((self.sort_key(item)?, item)) })
            .collect::<QueryResult<Vec<_>>>()?;

        if !self.keys.is_empty() {
            // `sort_by` is stable, so ties keep their source order.
            rows.sort_by(|(a, _), (b, _)| {
                a.iter()
                    .zip(b)
                    .zip(&self.keys)
                    .map(|((a, b), (_, direction))| match direction {
                        SortDirection::Asc => a.cmp(b),
                        SortDirection::Desc => b.cmp(a),
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(rows
            .into_iter()
            .skip(skip)
            .take(take.unwrap_or(usize::MAX))
            .map(|(_, item)| item.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;

    fn accessor(path: &str) -> FieldAccessor {
        FieldAccessor::resolve(User::schema(), path).unwrap()
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.user_name.as_str()).collect()
    }

    #[test]
    fn composition_is_deferred_until_fetch() {
        let users = vec![
            User::sample(1, "Joe", None),
            User::sample(2, "Alice", Some("Cat")),
        ];
        // An unguarded nested ordering only fails once evaluated.
        let source =
            MemorySource::new(users).order_by(&accessor("favoriteAnimal.name"), SortDirection::Asc);
        assert_eq!(source.count().unwrap(), 2);
        assert!(matches!(
            source.fetch_all(),
            Err(QueryError::NullIntermediate { path }) if path == "favoriteAnimal.name"
        ));
    }

    #[test]
    fn order_by_replaces_previous_ordering_and_then_by_breaks_ties() {
        let mut users = vec![
            User::sample(1, "Bob", None),
            User::sample(2, "Alice", None),
            User::sample(3, "Alice", None),
        ];
        users[1].email = "z@example.com".into();
        users[2].email = "a@example.com".into();

        let source = MemorySource::new(users)
            .order_by(&accessor("id"), SortDirection::Desc)
            .order_by(&accessor("userName"), SortDirection::Asc)
            .then_by(&accessor("email"), SortDirection::Asc);
        let ids: Vec<i32> = source.fetch_all().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn fetch_skips_and_takes() {
        let users = ["D", "B", "A", "C"]
            .iter()
            .enumerate()
            .map(|(i, n)| User::sample(i as i32, n, None))
            .collect();
        let source = MemorySource::new(users).order_by(&accessor("userName"), SortDirection::Asc);
        assert_eq!(names(&source.fetch(1, Some(2)).unwrap()), vec!["B", "C"]);
        assert_eq!(names(&source.fetch(3, Some(10)).unwrap()), vec!["D"]);
    }

    #[test]
    fn guards_filter_out_absent_records() {
        let users = vec![
            User::sample(1, "Joe", None),
            User::sample(2, "Alice", Some("Cat")),
        ];
        let guard = accessor("favoriteAnimal.name").prefix(1);
        let source = MemorySource::new(users).where_not_null(&guard);
        assert_eq!(source.count().unwrap(), 1);
        assert_eq!(names(&source.fetch_all().unwrap()), vec!["Alice"]);
    }
}
