//! Repository functions — one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! No business logic, no authorization, pure SQL. Each module also owns the
//! static [`FieldMapping`](crate::sql::FieldMapping) and
//! [`PredicateTable`](crate::sql::PredicateTable) of its resource.

pub mod companies;
pub mod jobs;
pub mod users;
