pub mod executor;
pub mod types;

pub use types::{QueryError, QueryResult, Variables};
