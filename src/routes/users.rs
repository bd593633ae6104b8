use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, web};

use crate::db::DbPool;
use crate::domain::errors::ConfigError;
use crate::domain::user::User;
use crate::models::config::ServerConfig;
use crate::repository::{DieselUserRepository, QuerySource};
use crate::routes::Queried;
use crate::services::interceptor::{InterceptorConfig, QueryInterceptor};

/// Interceptors installed on the user endpoints.
#[derive(Clone, Debug)]
pub struct UserInterceptors {
    /// Pages only on request.
    pub plain: Arc<QueryInterceptor>,
    /// Always pages, sorted by user name unless asked otherwise.
    pub paginated: Arc<QueryInterceptor>,
}

impl UserInterceptors {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let base = InterceptorConfig {
            force_pagination: config.force_pagination,
            default_page_size: config.default_page_size,
            default_sort: config.default_sort.clone(),
            null_guards: config.null_guards,
            max_page_size: config.max_page_size,
        };
        let paginated = InterceptorConfig {
            force_pagination: true,
            default_sort: Some("userName".to_string()),
            ..base.clone()
        };
        Ok(Self {
            plain: Arc::new(QueryInterceptor::new(base)?),
            paginated: Arc::new(QueryInterceptor::new(paginated)?),
        })
    }
}

fn users_source(pool: &DbPool) -> impl QuerySource<Item = User> + use<> {
    let pool = pool.clone();
    DieselUserRepository::new(&pool)
        .source()
        .map_records(move |rows| DieselUserRepository::new(&pool).attach_animals(rows))
}

#[get("/users")]
pub async fn list_users(
    pool: web::Data<DbPool>,
    interceptors: web::Data<UserInterceptors>,
) -> Queried<impl QuerySource<Item = User>> {
    Queried::collection(interceptors.plain.clone(), users_source(&pool))
}

#[get("/users/paginated")]
pub async fn list_users_paginated(
    pool: web::Data<DbPool>,
    interceptors: web::Data<UserInterceptors>,
) -> Queried<impl QuerySource<Item = User>> {
    Queried::collection(interceptors.paginated.clone(), users_source(&pool))
}

/// Plain endpoint outside the interceptor.
#[get("/values")]
pub async fn list_values() -> impl Responder {
    HttpResponse::Ok().json(["value1", "value2"])
}
