use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::user::{Animal as DomainAnimal, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = crate::schema::animals)]
/// Diesel model for [`crate::domain::user::Animal`].
pub struct Animal {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, QueryableByName, Associations)]
#[diesel(table_name = crate::schema::users)]
#[diesel(belongs_to(Animal, foreign_key = favorite_animal_id))]
/// Diesel model for [`crate::domain::user::User`] with the animal left as a key.
pub struct User {
    pub id: i32,
    pub user_name: String,
    pub email: String,
    pub favorite_animal_id: Option<i32>,
    pub registration_date: NaiveDateTime,
    pub last_login_date: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::animals)]
pub struct NewAnimal<'a> {
    pub name: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub user_name: &'a str,
    pub email: &'a str,
    pub favorite_animal_id: Option<i32>,
    pub registration_date: NaiveDateTime,
    pub last_login_date: Option<NaiveDateTime>,
}

impl From<Animal> for DomainAnimal {
    fn from(animal: Animal) -> Self {
        Self {
            id: animal.id,
            name: animal.name,
        }
    }
}

impl User {
    /// Converts into the domain record, attaching the already loaded animal.
    pub fn into_domain(self, favorite_animal: Option<DomainAnimal>) -> DomainUser {
        DomainUser {
            id: self.id,
            user_name: self.user_name,
            email: self.email,
            favorite_animal,
            registration_date: self.registration_date,
            last_login_date: self.last_login_date,
        }
    }
}

impl<'a> From<&'a crate::domain::user::NewUser> for NewUser<'a> {
    fn from(user: &'a crate::domain::user::NewUser) -> Self {
        Self {
            user_name: user.user_name.as_str(),
            email: user.email.as_str(),
            favorite_animal_id: user.favorite_animal_id,
            registration_date: user.registration_date,
            last_login_date: user.last_login_date,
        }
    }
}
