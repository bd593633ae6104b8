//! SQLite implementation of [`QuerySource`].
//!
//! Orderings and null guards are collected first and rendered into a single
//! statement on evaluation. Every nested hop becomes a `LEFT JOIN` on the
//! registered foreign key, so a guard is an `IS NOT NULL` check on the joined
//! key. Identifiers come from the record registry only; request input never
//! reaches the SQL text.

use std::collections::HashMap;
use std::marker::PhantomData;

use diesel::prelude::*;
use diesel::query_builder::SqlQuery;
use diesel::query_dsl::LoadQuery;
use diesel::sqlite::SqliteConnection;

use crate::db::{DbPool, get_connection};
use crate::domain::sort::SortDirection;
use crate::models::CountRow;
use crate::repository::QuerySource;
use crate::repository::errors::{QueryError, QueryResult};
use crate::repository::fields::{FieldAccessor, FieldHop, RecordSchema, TableMapping};

const ROOT_ALIAS: &str = "t0";

/// Rows of type `T` loaded from the table registered for `schema`.
pub struct SqlSource<T> {
    pool: DbPool,
    schema: &'static RecordSchema,
    guards: Vec<FieldAccessor>,
    keys: Vec<(FieldAccessor, SortDirection)>,
    row: PhantomData<fn() -> T>,
}

impl<T> SqlSource<T> {
    /// `pool` is a cheap handle; clones share the same connections.
    pub fn new(pool: DbPool, schema: &'static RecordSchema) -> Self {
        Self {
            pool,
            schema,
            guards: Vec::new(),
            keys: Vec::new(),
            row: PhantomData,
        }
    }

    fn plan(&self) -> QueryResult<Statement> {
        let root = table_of(self.schema)?;
        let mut statement = Statement::new(root);

        for guard in &self.guards {
            let (alias, table) = statement.join_path(guard.hops())?;
            statement
                .conditions
                .push(format!("{alias}.\"{}\" IS NOT NULL", table.key));
        }

        for (key, direction) in &self.keys {
            let column = statement.column(key)?;
            let direction = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            statement.order.push(format!("{column} {direction}"));
        }
        if !statement.order.is_empty() {
            // Deterministic pages when keys tie.
            statement
                .order
                .push(format!("{ROOT_ALIAS}.\"{}\" ASC", root.key));
        }

        Ok(statement)
    }
}

fn table_of(schema: &RecordSchema) -> QueryResult<TableMapping> {
    schema.table.ok_or_else(|| QueryError::Unmapped {
        field: schema.name.to_string(),
    })
}

struct Statement {
    root: TableMapping,
    joins: Vec<String>,
    aliases: HashMap<String, (String, TableMapping)>,
    conditions: Vec<String>,
    order: Vec<String>,
}

impl Statement {
    fn new(root: TableMapping) -> Self {
        Self {
            root,
            joins: Vec::new(),
            aliases: HashMap::new(),
            conditions: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Joins every record along `hops` and returns the alias of the last one.
    fn join_path(&mut self, hops: &[FieldHop]) -> QueryResult<(String, TableMapping)> {
        let mut current = (ROOT_ALIAS.to_string(), self.root);
        let mut path = String::new();

        for hop in hops {
            let field = hop.field();
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(field.name);

            if let Some(joined) = self.aliases.get(&path) {
                current = joined.clone();
                continue;
            }

            let unmapped = || QueryError::Unmapped {
                field: path.clone(),
            };
            let foreign_key = field.column.ok_or_else(unmapped)?;
            let table = table_of(field.nested_schema().ok_or_else(unmapped)?)?;
            let alias = format!("t{}", self.aliases.len() + 1);
            self.joins.push(format!(
                "LEFT JOIN \"{}\" AS {alias} ON {alias}.\"{}\" = {}.\"{foreign_key}\"",
                table.name, table.key, current.0
            ));
            current = (alias, table);
            self.aliases.insert(path.clone(), current.clone());
        }

        Ok(current)
    }

    fn column(&mut self, key: &FieldAccessor) -> QueryResult<String> {
        let Some((leaf, parents)) = key.hops().split_last() else {
            return Err(QueryError::Unmapped { field: key.path() });
        };
        let (alias, _) = self.join_path(parents)?;
        let column = leaf
            .field()
            .column
            .ok_or_else(|| QueryError::Unmapped { field: key.path() })?;
        Ok(format!("{alias}.\"{column}\""))
    }

    fn from_clause(&self) -> String {
        let mut sql = format!("FROM \"{}\" AS {ROOT_ALIAS}", self.root.name);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql
    }

    fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) AS count {}", self.from_clause())
    }

    fn select_sql(&self, skip: usize, take: Option<usize>) -> String {
        let mut sql = format!("SELECT {ROOT_ALIAS}.* {}", self.from_clause());
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        match take {
            Some(take) => sql.push_str(&format!(" LIMIT {take} OFFSET {skip}")),
            // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
            None if skip > 0 => sql.push_str(&format!(" LIMIT -1 OFFSET {skip}")),
            None => {}
        }
        sql
    }
}

impl<T> QuerySource for SqlSource<T>
where
    for<'q> SqlQuery: LoadQuery<'q, SqliteConnection, T>,
{
    type Item = T;

    fn schema(&self) -> &'static RecordSchema {
        self.schema
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
        let sql = self.plan()?.count_sql();
        log::debug!("Counting with `{sql}`");

        let mut conn = get_connection(&self.pool)?;
        let row = diesel::sql_query(sql).get_result::<CountRow>(&mut *conn)?;
        Ok(usize::try_from(row.count).unwrap_or_default())
    }

    fn fetch(&self, skip: usize, take: Option<usize>) -> QueryResult<Vec<T>> {
        let sql = self.plan()?.select_sql(skip, take);
        log::debug!("Fetching with `{sql}`");

        let mut conn = get_connection(&self.pool)?;
        let rows = diesel::sql_query(sql).load::<T>(&mut *conn)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use diesel::r2d2::{ConnectionManager, Pool};

    use super::*;
    use crate::domain::sort::SortSpec;
    use crate::domain::user::User;
    use crate::repository::fields::{FieldDef, Record};
    use crate::services::ordering::order_by;

    static CITY_FIELDS: [FieldDef; 1] = [FieldDef::scalar("name", "name")];
    static CITY_SCHEMA: RecordSchema = RecordSchema::new(
        "City",
        Some(TableMapping {
            name: "cities",
            key: "id",
        }),
        &CITY_FIELDS,
    );
    static OFFICE_FIELDS: [FieldDef; 1] = [FieldDef::nested("city", "city_id", city_schema)];
    static OFFICE_SCHEMA: RecordSchema = RecordSchema::new(
        "Office",
        Some(TableMapping {
            name: "offices",
            key: "id",
        }),
        &OFFICE_FIELDS,
    );
    static COMPANY_FIELDS: [FieldDef; 2] = [
        FieldDef::scalar("id", "id"),
        FieldDef::nested("office", "office_id", office_schema),
    ];
    static COMPANY_SCHEMA: RecordSchema = RecordSchema::new(
        "Company",
        Some(TableMapping {
            name: "companies",
            key: "id",
        }),
        &COMPANY_FIELDS,
    );

    fn city_schema() -> &'static RecordSchema {
        &CITY_SCHEMA
    }

    fn office_schema() -> &'static RecordSchema {
        &OFFICE_SCHEMA
    }

    fn accessor(path: &str) -> FieldAccessor {
        FieldAccessor::resolve(User::schema(), path).unwrap()
    }

    #[test]
    fn renders_joins_guards_and_ordering() {
        let nested = accessor("favoriteAnimal.name");
        let mut statement = Statement::new(table_of(User::schema()).unwrap());
        let (alias, table) = statement.join_path(nested.prefix(1).hops()).unwrap();
        statement
            .conditions
            .push(format!("{alias}.\"{}\" IS NOT NULL", table.key));
        let column = statement.column(&nested).unwrap();
        statement.order.push(format!("{column} DESC"));

        assert_eq!(
            statement.select_sql(3, Some(3)),
            "SELECT t0.* FROM \"users\" AS t0 \
             LEFT JOIN \"animals\" AS t1 ON t1.\"id\" = t0.\"favorite_animal_id\" \
             WHERE t1.\"id\" IS NOT NULL ORDER BY t1.\"name\" DESC LIMIT 3 OFFSET 3"
        );
        assert_eq!(
            statement.count_sql(),
            "SELECT COUNT(*) AS count FROM \"users\" AS t0 \
             LEFT JOIN \"animals\" AS t1 ON t1.\"id\" = t0.\"favorite_animal_id\" \
             WHERE t1.\"id\" IS NOT NULL"
        );
    }

    #[test]
    fn offset_without_limit_uses_sqlite_unbounded_limit() {
        let statement = Statement::new(table_of(User::schema()).unwrap());
        assert_eq!(
            statement.select_sql(5, None),
            "SELECT t0.* FROM \"users\" AS t0 LIMIT -1 OFFSET 5"
        );
        assert_eq!(statement.select_sql(0, None), "SELECT t0.* FROM \"users\" AS t0");
    }

    #[test]
    fn repeated_paths_share_one_join() {
        let nested = accessor("favoriteAnimal.name");
        let mut statement = Statement::new(table_of(User::schema()).unwrap());
        statement.join_path(nested.prefix(1).hops()).unwrap();
        statement.column(&nested).unwrap();
        assert_eq!(statement.joins.len(), 1);
    }

    #[test]
    fn deep_paths_chain_joins_and_guard_each_hop() {
        // Never connects; only the statement is rendered.
        let pool = Pool::builder()
            .build_unchecked(ConnectionManager::<SqliteConnection>::new(":memory:"));
        let source: SqlSource<CountRow> = order_by(
            SqlSource::new(pool, &COMPANY_SCHEMA),
            &SortSpec::asc("office.city.name"),
            true,
        );
        let statement = source.plan().unwrap();

        assert_eq!(statement.joins.len(), 2);
        assert_eq!(
            statement.select_sql(0, Some(10)),
            "SELECT t0.* FROM \"companies\" AS t0 \
             LEFT JOIN \"offices\" AS t1 ON t1.\"id\" = t0.\"office_id\" \
             LEFT JOIN \"cities\" AS t2 ON t2.\"id\" = t1.\"city_id\" \
             WHERE t1.\"id\" IS NOT NULL AND t2.\"id\" IS NOT NULL \
             ORDER BY t2.\"name\" ASC, t0.\"id\" ASC LIMIT 10 OFFSET 0"
        );
    }
}
