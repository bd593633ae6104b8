use pretty_assertions::assert_eq;
use pushkind_query::domain::options::QueryOptions;
use pushkind_query::domain::sort::SortSpec;
use pushkind_query::domain::user::User;
use pushkind_query::models::user::User as DbUser;
use pushkind_query::pagination::paginate;
use pushkind_query::repository::errors::QueryError;
use pushkind_query::repository::fields::{FieldAccessor, FieldDef, RecordSchema};
use pushkind_query::repository::{DieselUserRepository, QuerySource, SqlSource};
use pushkind_query::services::ordering::apply_sorting;

mod common;

fn names(rows: &[DbUser]) -> Vec<&str> {
    rows.iter().map(|row| row.user_name.as_str()).collect()
}

fn paged(page: usize, page_size: usize) -> QueryOptions {
    QueryOptions {
        page,
        page_size,
        pagination_requested: true,
        ..QueryOptions::default()
    }
}

#[test]
fn test_sql_source_pages_sorted_users() {
    let test_db = common::TestDb::new("test_sql_source_pages_sorted_users.db");
    test_db.seed_users();
    let repo = DieselUserRepository::new(test_db.pool());

    let source = apply_sorting(repo.source(), Some(&SortSpec::asc("userName")), None, true);

    let page = paginate(&source, &paged(2, 3)).unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.total_count, 10);
    assert_eq!(names(&page.data), vec!["Dave", "Emilia", "Fred"]);

    let corrected = paginate(&source, &paged(5, 3)).unwrap();
    assert_eq!(corrected.page, 4);
    assert_eq!(names(&corrected.data), vec!["Joe"]);
}

#[test]
fn test_sql_source_unknown_field_keeps_storage_order() {
    let test_db = common::TestDb::new("test_sql_source_unknown_field.db");
    test_db.seed_users();
    let repo = DieselUserRepository::new(test_db.pool());

    let source = apply_sorting(repo.source(), Some(&SortSpec::asc("shoeSize")), None, true);
    let ids: Vec<i32> = source.fetch_all().unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_sql_source_descending_with_then_sort() {
    let test_db = common::TestDb::new("test_sql_source_descending.db");
    let repo = DieselUserRepository::new(test_db.pool());
    test_db.seed_users();

    let source = apply_sorting(
        repo.source(),
        Some(&SortSpec::desc("registrationDate")),
        Some(&SortSpec::asc("email")),
        true,
    );
    let rows = source.fetch(0, Some(2)).unwrap();
    assert_eq!(names(&rows), vec!["Fred", "Emilia"]);
}

#[test]
fn test_sql_source_guards_nested_sort() {
    let test_db = common::TestDb::new("test_sql_source_guards_nested_sort.db");
    test_db.seed_users();
    let repo = DieselUserRepository::new(test_db.pool());

    let source = apply_sorting(
        repo.source(),
        Some(&SortSpec::asc("favoriteAnimal.name")),
        None,
        true,
    );
    assert_eq!(source.count().unwrap(), 7);

    let users = repo.attach_animals(source.fetch_all().unwrap()).unwrap();
    let animals: Vec<&str> = users
        .iter()
        .filter_map(|u| u.favorite_animal.as_ref())
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(
        animals,
        vec!["Alpaca", "Bear", "Cat", "Dog", "Jaguar", "Lion", "Zebra"]
    );
}

#[test]
fn test_sql_source_unguarded_nested_sort_keeps_absent_first() {
    let test_db = common::TestDb::new("test_sql_source_unguarded.db");
    test_db.seed_users();
    let repo = DieselUserRepository::new(test_db.pool());

    let source = apply_sorting(
        repo.source(),
        Some(&SortSpec::asc("favoriteAnimal.name")),
        None,
        false,
    );
    assert_eq!(source.count().unwrap(), 10);
    let rows = source.fetch(0, Some(4)).unwrap();
    assert_eq!(names(&rows), vec!["Ingrid", "Caroline", "Fred", "Bob"]);
}

#[test]
fn test_mapped_source_attaches_animals_per_page() {
    let test_db = common::TestDb::new("test_mapped_source.db");
    test_db.seed_users();
    let pool = test_db.pool().clone();

    let source = DieselUserRepository::new(test_db.pool())
        .source()
        .map_records(move |rows| DieselUserRepository::new(&pool).attach_animals(rows));
    let source = apply_sorting(source, Some(&SortSpec::desc("userName")), None, true);

    let page = paginate(&source, &paged(1, 2)).unwrap();
    let users: Vec<(&str, Option<&str>)> = page
        .data
        .iter()
        .map(|u: &User| {
            (
                u.user_name.as_str(),
                u.favorite_animal.as_ref().map(|a| a.name.as_str()),
            )
        })
        .collect();
    assert_eq!(users, vec![("Joe", Some("Jaguar")), ("Ingrid", None)]);
}

static LOOSE_FIELDS: [FieldDef; 1] = [FieldDef::unmapped(
    "nickname",
    pushkind_query::repository::fields::FieldKind::Scalar,
)];
static LOOSE_SCHEMA: RecordSchema = RecordSchema::new("Loose", None, &LOOSE_FIELDS);

#[test]
fn test_sql_source_rejects_unmapped_records() {
    let test_db = common::TestDb::new("test_sql_source_unmapped.db");
    let accessor = FieldAccessor::resolve(&LOOSE_SCHEMA, "nickname").unwrap();
    let source: SqlSource<DbUser> = SqlSource::new(test_db.pool().clone(), &LOOSE_SCHEMA)
        .order_by(&accessor, Default::default());
    assert!(matches!(
        source.count(),
        Err(QueryError::Unmapped { field }) if field == "Loose"
    ));
}
