//! HTTP handlers and the actix-web side of the query interceptor.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::{HttpRequest, HttpResponse, Responder};
use log::{debug, error};
use serde::Serialize;

use crate::forms::query::raw_params_from_query;
use crate::repository::QuerySource;
use crate::services::interceptor::QueryInterceptor;

pub mod docs;
pub mod users;

/// Result of a handler on an intercepted endpoint.
///
/// A `Collection` is ordered and paged according to the request's query
/// string before being serialized. A `Response` is sent untouched, which is
/// how handlers return errors or anything that is not a queryable collection.
pub enum Queried<S> {
    Collection {
        interceptor: Arc<QueryInterceptor>,
        source: S,
    },
    Response(HttpResponse),
}

impl<S> Queried<S> {
    pub fn collection(interceptor: Arc<QueryInterceptor>, source: S) -> Self {
        Queried::Collection {
            interceptor,
            source,
        }
    }
}

impl<S> Responder for Queried<S>
where
    S: QuerySource,
    S::Item: Serialize,
{
    type Body = BoxBody;

    fn respond_to(self, req: &HttpRequest) -> HttpResponse<Self::Body> {
        match self {
            Queried::Response(response) => {
                debug!(
                    "Passing through {} response for {}",
                    response.status(),
                    req.path()
                );
                response
            }
            Queried::Collection {
                interceptor,
                source,
            } => {
                let params = raw_params_from_query(req.query_string());
                match interceptor.process(Some(&params), source) {
                    Ok(outcome) => HttpResponse::Ok().json(outcome),
                    Err(e) => {
                        error!("Failed to query collection for {}: {e}", req.path());
                        HttpResponse::InternalServerError().finish()
                    }
                }
            }
        }
    }
}
