//! Query processing on top of [`crate::repository::QuerySource`].

pub mod interceptor;
pub mod ordering;
