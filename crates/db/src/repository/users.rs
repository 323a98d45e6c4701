//! User CRUD operations and job applications.

use sqlx::PgPool;
use tracing::debug;

use crate::{
    models::{NewUser, UserCredentialsRow, UserRow},
    sql::{build_set_clause, FieldMapping, PartialData},
    DbError,
};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const PASSWORD: &str = "password";
pub const EMAIL: &str = "email";

pub const FIELD_MAPPING: FieldMapping = FieldMapping::new(&[
    (FIRST_NAME, "first_name"),
    (LAST_NAME, "last_name"),
]);

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// Insert a new user.
///
/// Returns `DbError::Duplicate` if the username is taken.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (username, password, first_name, last_name, email, is_admin)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(user.is_admin)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch the stored password hash for a login attempt.
pub async fn get_credentials(pool: &PgPool, username: &str) -> Result<UserCredentialsRow, DbError> {
    let row = sqlx::query_as::<_, UserCredentialsRow>(
        "SELECT username, password, is_admin FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("user {username}")))?;

    Ok(row)
}

/// Return all users ordered by username.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users ORDER BY username"))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a single user by username.
pub async fn get_user(pool: &PgPool, username: &str) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {username}")))?;

    Ok(row)
}

/// Apply a partial update and return the updated row.
///
/// A `password` entry in `data` must already be hashed.
pub async fn update_user(pool: &PgPool, username: &str, data: PartialData) -> Result<UserRow, DbError> {
    let set = build_set_clause(data, &FIELD_MAPPING)?;
    let sql = format!(
        "UPDATE users SET {} WHERE username = ${} RETURNING {COLUMNS}",
        set.sql(),
        set.next_placeholder(),
    );
    debug!(%sql, "update user");

    let row = set
        .bind(sqlx::query_as::<_, UserRow>(&sql))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {username}")))?;

    Ok(row)
}

/// Permanently delete a user and their applications.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_user(pool: &PgPool, username: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("user {username}")));
    }

    Ok(())
}

/// Ids of the jobs a user has applied to, ascending.
pub async fn applied_job_ids(pool: &PgPool, username: &str) -> Result<Vec<i32>, DbError> {
    let ids = sqlx::query_scalar::<_, i32>(
        "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Record that `username` applied to job `job_id`.
///
/// Returns `DbError::NotFound` if either side doesn't exist, and
/// `DbError::Duplicate` for a repeat application.
pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let job_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;
    if !job_exists {
        tx.rollback().await?;
        return Err(DbError::NotFound(format!("job {job_id}")));
    }

    let user_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut *tx)
            .await?;
    if !user_exists {
        tx.rollback().await?;
        return Err(DbError::NotFound(format!("user {username}")));
    }

    sqlx::query("INSERT INTO applications (username, job_id) VALUES ($1, $2)")
        .bind(username)
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}
