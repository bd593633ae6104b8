//! Users and their favorite animals, the records served by the demo API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::repository::fields::{FieldDef, FieldRef, Record, RecordSchema, TableMapping};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub user_name: String,
    pub email: String,
    pub favorite_animal: Option<Animal>,
    pub registration_date: NaiveDateTime,
    pub last_login_date: Option<NaiveDateTime>,
}

/// Data required to insert a user; the animal is referenced by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub favorite_animal_id: Option<i32>,
    pub registration_date: NaiveDateTime,
    pub last_login_date: Option<NaiveDateTime>,
}

static ANIMAL_FIELDS: [FieldDef; 2] = [
    FieldDef::scalar("id", "id"),
    FieldDef::scalar("name", "name"),
];

static ANIMAL_SCHEMA: RecordSchema = RecordSchema::new(
    "Animal",
    Some(TableMapping {
        name: "animals",
        key: "id",
    }),
    &ANIMAL_FIELDS,
);

static USER_FIELDS: [FieldDef; 6] = [
    FieldDef::scalar("id", "id"),
    FieldDef::scalar("userName", "user_name"),
    FieldDef::scalar("email", "email"),
    FieldDef::nested("favoriteAnimal", "favorite_animal_id", animal_schema),
    FieldDef::scalar("registrationDate", "registration_date"),
    FieldDef::scalar("lastLoginDate", "last_login_date"),
];

static USER_SCHEMA: RecordSchema = RecordSchema::new(
    "User",
    Some(TableMapping {
        name: "users",
        key: "id",
    }),
    &USER_FIELDS,
);

fn animal_schema() -> &'static RecordSchema {
    &ANIMAL_SCHEMA
}

impl Record for Animal {
    fn schema() -> &'static RecordSchema {
        &ANIMAL_SCHEMA
    }

    fn field(&self, index: usize) -> FieldRef<'_> {
        match index {
            0 => FieldRef::Value(self.id.into()),
            1 => FieldRef::Value(self.name.as_str().into()),
            _ => FieldRef::Record(None),
        }
    }
}

impl Record for User {
    fn schema() -> &'static RecordSchema {
        &USER_SCHEMA
    }

    fn field(&self, index: usize) -> FieldRef<'_> {
        match index {
            0 => FieldRef::Value(self.id.into()),
            1 => FieldRef::Value(self.user_name.as_str().into()),
            2 => FieldRef::Value(self.email.as_str().into()),
            3 => FieldRef::Record(self.favorite_animal.as_ref().map(|a| a as &dyn Record)),
            4 => FieldRef::Value(self.registration_date.into()),
            5 => FieldRef::Value(self.last_login_date.into()),
            _ => FieldRef::Record(None),
        }
    }
}

#[cfg(test)]
impl User {
    pub(crate) fn sample(id: i32, user_name: &str, animal: Option<&str>) -> Self {
        use chrono::NaiveDate;

        let registration_date = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
            + chrono::Duration::days(i64::from(id));
        Self {
            id,
            user_name: user_name.to_string(),
            email: format!("{}@example.com", user_name.to_lowercase()),
            favorite_animal: animal.map(|name| Animal {
                id,
                name: name.to_string(),
            }),
            registration_date,
            last_login_date: None,
        }
    }
}
