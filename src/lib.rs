//! # intra-client
//!
//! GraphQL client for the intra API. Exchanges an opaque credential for a
//! bearer token, attaches it to every query, and renews it in the background
//! before it expires.
//!
//! Modules:
//! - `token`: claims model and bearer token decoding
//! - `session`: the authenticated session, token acquisition and renewal
//! - `scheduler`: background renewal loop
//! - `query`: GraphQL execution and result mapping
//! - `config`: YAML / environment configuration

pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod query;
pub mod scheduler;
pub mod session;
pub mod token;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::IntraClient;
pub use crate::errors::{AcquisitionError, DecodeError, RenewalError};
pub use crate::query::types::{QueryError, QueryResult, Variables};
pub use crate::token::claims::Token;
