use std::collections::HashMap;

use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::user::{Animal, NewUser, User};
use crate::repository::SqlSource;
use crate::repository::errors::{QueryError, QueryResult};
use crate::repository::fields::Record;

/// Diesel access to the demo `users` and `animals` tables.
pub struct DieselUserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> DieselUserRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Unordered, unfiltered source over all users.
    pub fn source(&self) -> SqlSource<crate::models::user::User> {
        SqlSource::new(self.pool.clone(), User::schema())
    }

    /// Loads the favorite animals referenced by `rows` and builds domain users.
    pub fn attach_animals(&self, rows: Vec<crate::models::user::User>) -> QueryResult<Vec<User>> {
        use crate::models::user::Animal as DbAnimal;
        use crate::schema::animals;

        let ids: Vec<i32> = rows.iter().filter_map(|row| row.favorite_animal_id).collect();
        let animals: HashMap<i32, Animal> = if ids.is_empty() {
            HashMap::new()
        } else {
            let mut conn = self.pool.get()?;
            animals::table
                .filter(animals::id.eq_any(ids))
                .load::<DbAnimal>(&mut conn)?
                .into_iter()
                .map(|animal| (animal.id, animal.into()))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let animal = row
                    .favorite_animal_id
                    .and_then(|id| animals.get(&id).cloned());
                row.into_domain(animal)
            })
            .collect())
    }

    pub fn create_animal(&self, name: &str) -> QueryResult<Animal> {
        use crate::models::user::{Animal as DbAnimal, NewAnimal};
        use crate::schema::animals;

        let mut conn = self.pool.get()?;
        let animal = diesel::insert_into(animals::table)
            .values(&NewAnimal { name })
            .get_result::<DbAnimal>(&mut conn)?;

        Ok(animal.into())
    }

    pub fn create_user(&self, new_user: &NewUser) -> QueryResult<User> {
        use crate::models::user::{NewUser as DbNewUser, User as DbUser};
        use crate::schema::users;

        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        self.attach_animals(vec![row])?
            .pop()
            .ok_or_else(|| QueryError::Database("inserted user was not returned".into()))
    }

    pub fn count_users(&self) -> QueryResult<usize> {
        use crate::schema::users;

        let mut conn = self.pool.get()?;
        let total: i64 = users::table.count().get_result(&mut conn)?;
        Ok(usize::try_from(total).unwrap_or_default())
    }
}
