//! Job CRUD operations.

use sqlx::PgPool;
use tracing::debug;

use crate::{
    models::{JobRow, NewJob},
    sql::{
        build_search_clause, build_set_clause, Comparison, FieldMapping, PartialData, Predicate,
        PredicateTable, SearchPredicateSet,
    },
    DbError,
};

pub const TITLE: &str = "title";
pub const MIN_SALARY: &str = "minSalary";
pub const HAS_EQUITY: &str = "hasEquity";

/// Job fields share their column names.
pub const FIELD_MAPPING: FieldMapping = FieldMapping::new(&[]);

pub const SEARCH_PREDICATES: PredicateTable = PredicateTable::new(&[
    Predicate { key: TITLE, column: "title", comparison: Comparison::Contains },
    Predicate { key: MIN_SALARY, column: "salary", comparison: Comparison::AtLeast },
    Predicate { key: HAS_EQUITY, column: "equity", comparison: Comparison::GreaterThan },
]);

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Insert a new job under an existing company.
pub async fn create_job(pool: &PgPool, job: &NewJob) -> Result<JobRow, DbError> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        INSERT INTO jobs (title, salary, equity, company_handle)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&job.title)
    .bind(job.salary)
    .bind(job.equity)
    .bind(&job.company_handle)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return jobs matching every predicate, ordered by title.
pub async fn find_jobs(pool: &PgPool, predicates: SearchPredicateSet) -> Result<Vec<JobRow>, DbError> {
    let clause = build_search_clause(predicates, &SEARCH_PREDICATES)?;
    let sql = format!("SELECT {COLUMNS} FROM jobs {} ORDER BY title, id", clause.where_sql());
    debug!(%sql, params = clause.len(), "find jobs");

    let rows = clause
        .bind(sqlx::query_as::<_, JobRow>(&sql))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// All jobs posted by one company, ordered by id.
pub async fn jobs_for_company(pool: &PgPool, handle: &str) -> Result<Vec<JobRow>, DbError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id"
    ))
    .bind(handle)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a single job by its primary key.
pub async fn get_job(pool: &PgPool, id: i32) -> Result<JobRow, DbError> {
    let row = sqlx::query_as::<_, JobRow>(&format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("job {id}")))?;

    Ok(row)
}

/// Apply a partial update and return the updated row.
pub async fn update_job(pool: &PgPool, id: i32, data: PartialData) -> Result<JobRow, DbError> {
    let set = build_set_clause(data, &FIELD_MAPPING)?;
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {COLUMNS}",
        set.sql(),
        set.next_placeholder(),
    );
    debug!(%sql, "update job");

    let row = set
        .bind(sqlx::query_as::<_, JobRow>(&sql))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("job {id}")))?;

    Ok(row)
}

/// Permanently delete a job.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_job(pool: &PgPool, id: i32) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("job {id}")));
    }

    Ok(())
}
