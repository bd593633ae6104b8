//! Domain values shared by the server-side engine and the client.

pub mod errors;
pub mod options;
pub mod page;
pub mod sort;
pub mod user;
pub mod value;
