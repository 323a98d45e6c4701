//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, typed row structs, the parameterized clause
//! builders, and repository functions for every table in the jobboard
//! schema. No authorization lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;
pub mod sql;

pub use pool::DbPool;
pub use error::DbError;
