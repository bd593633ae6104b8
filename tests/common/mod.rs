#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_query::db::{DbPool, establish_connection_pool};
use pushkind_query::domain::user::NewUser;
use pushkind_query::repository::DieselUserRepository;
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Users in insertion order with their favorite animals.
pub const USERS: [(&str, Option<&str>); 10] = [
    ("Joe", Some("Jaguar")),
    ("Alice", Some("Lion")),
    ("Ingrid", None),
    ("Bob", Some("Alpaca")),
    ("Hank", Some("Zebra")),
    ("Caroline", None),
    ("Dave", Some("Cat")),
    ("Gina", Some("Dog")),
    ("Emilia", Some("Bear")),
    ("Fred", None),
];

/// SQLite database in a temporary directory with all migrations applied.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("build pool");
        {
            let mut conn = pool.get().expect("get connection");
            let conn: &mut SqliteConnection = &mut conn;
            conn.run_pending_migrations(MIGRATIONS)
                .expect("run migrations");
        }
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Inserts [`USERS`]; ids follow insertion order starting at 1.
    pub fn seed_users(&self) {
        let repo = DieselUserRepository::new(&self.pool);
        for (offset, (name, animal)) in USERS.iter().enumerate() {
            let favorite_animal_id =
                animal.map(|animal| repo.create_animal(animal).expect("create animal").id);
            repo.create_user(&NewUser {
                user_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                favorite_animal_id,
                registration_date: registered(offset as i64),
                last_login_date: None,
            })
            .expect("create user");
        }
    }
}

pub fn registered(days: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
        + chrono::Duration::days(days)
}
