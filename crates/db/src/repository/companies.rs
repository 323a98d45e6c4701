//! Company CRUD operations.

use sqlx::PgPool;
use tracing::debug;

use crate::{
    models::{CompanyRow, NewCompany},
    sql::{
        build_search_clause, build_set_clause, Comparison, FieldMapping, PartialData, Predicate,
        PredicateTable, SearchPredicateSet,
    },
    DbError,
};

pub const NAME_LIKE: &str = "nameLike";
pub const MIN_EMPLOYEES: &str = "minEmployees";
pub const MAX_EMPLOYEES: &str = "maxEmployees";

pub const FIELD_MAPPING: FieldMapping = FieldMapping::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

pub const SEARCH_PREDICATES: PredicateTable = PredicateTable::new(&[
    Predicate { key: NAME_LIKE, column: "name", comparison: Comparison::Contains },
    Predicate { key: MIN_EMPLOYEES, column: "num_employees", comparison: Comparison::AtLeast },
    Predicate { key: MAX_EMPLOYEES, column: "num_employees", comparison: Comparison::AtMost },
]);

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Insert a new company.
///
/// Returns `DbError::Duplicate` if the handle or name is taken.
pub async fn create_company(pool: &PgPool, company: &NewCompany) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        r#"
        INSERT INTO companies (handle, name, description, num_employees, logo_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&company.handle)
    .bind(&company.name)
    .bind(&company.description)
    .bind(company.num_employees)
    .bind(&company.logo_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return companies matching every predicate, ordered by name.
pub async fn find_companies(
    pool: &PgPool,
    predicates: SearchPredicateSet,
) -> Result<Vec<CompanyRow>, DbError> {
    let clause = build_search_clause(predicates, &SEARCH_PREDICATES)?;
    let sql = format!("SELECT {COLUMNS} FROM companies {} ORDER BY name", clause.where_sql());
    debug!(%sql, params = clause.len(), "find companies");

    let rows = clause
        .bind(sqlx::query_as::<_, CompanyRow>(&sql))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a single company by its handle.
pub async fn get_company(pool: &PgPool, handle: &str) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COLUMNS} FROM companies WHERE handle = $1"
    ))
    .bind(handle)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("company {handle}")))?;

    Ok(row)
}

/// Apply a partial update and return the updated row.
pub async fn update_company(
    pool: &PgPool,
    handle: &str,
    data: PartialData,
) -> Result<CompanyRow, DbError> {
    let set = build_set_clause(data, &FIELD_MAPPING)?;
    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {COLUMNS}",
        set.sql(),
        set.next_placeholder(),
    );
    debug!(%sql, "update company");

    let row = set
        .bind(sqlx::query_as::<_, CompanyRow>(&sql))
        .bind(handle)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("company {handle}")))?;

    Ok(row)
}

/// Permanently delete a company and, by cascade, its jobs.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_company(pool: &PgPool, handle: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
        .bind(handle)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("company {handle}")));
    }

    Ok(())
}
