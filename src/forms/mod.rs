//! Request parameter parsing.

pub mod query;
