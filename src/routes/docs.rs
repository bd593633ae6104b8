//! Descriptors for API documentation of intercepted endpoints.

use actix_web::{HttpResponse, Responder, get};
use serde::Serialize;

use crate::forms::query::{PAGE_PARAM, PAGE_SIZE_PARAM, SORT_PARAM, THEN_SORT_PARAM};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSchema {
    String,
    Integer,
}

/// One query-string parameter understood by the interceptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QueryParameterDoc {
    pub name: &'static str,
    #[serde(rename = "in")]
    pub location: &'static str,
    pub required: bool,
    pub schema: ParameterSchema,
    pub description: &'static str,
}

const fn parameter(
    name: &'static str,
    schema: ParameterSchema,
    description: &'static str,
) -> QueryParameterDoc {
    QueryParameterDoc {
        name,
        location: "query",
        required: false,
        schema,
        description,
    }
}

pub fn query_parameters() -> [QueryParameterDoc; 4] {
    [
        parameter(
            SORT_PARAM,
            ParameterSchema::String,
            "Field path to order by, optionally followed by `asc` or `desc`",
        ),
        parameter(
            THEN_SORT_PARAM,
            ParameterSchema::String,
            "Tie-breaking field and direction; nested paths are ignored",
        ),
        parameter(PAGE_PARAM, ParameterSchema::Integer, "1-based page number"),
        parameter(PAGE_SIZE_PARAM, ParameterSchema::Integer, "Records per page"),
    ]
}

/// Paths of the endpoints served through the interceptor.
pub const QUERYABLE_ENDPOINTS: [&str; 2] = ["/api/users", "/api/users/paginated"];

/// Whether `path` carries the query parameters of [`query_parameters`].
pub fn is_queryable(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    QUERYABLE_ENDPOINTS.contains(&path)
}

#[derive(Serialize)]
struct EndpointDoc {
    path: &'static str,
    parameters: [QueryParameterDoc; 4],
}

#[get("/docs")]
pub async fn show_docs() -> impl Responder {
    let endpoints: Vec<EndpointDoc> = QUERYABLE_ENDPOINTS
        .iter()
        .map(|&path| EndpointDoc {
            path,
            parameters: query_parameters(),
        })
        .collect();
    HttpResponse::Ok().json(endpoints)
}
