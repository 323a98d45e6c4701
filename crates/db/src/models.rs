//! Row structs that map 1-to-1 onto database tables, plus the input
//! structs the repository functions accept.
//!
//! Inputs deserialize straight from request bodies and query strings
//! (camelCase, unknown fields rejected) and know how to turn themselves
//! into the sparse field sets the [`sql`](crate::sql) builders consume.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::{companies, jobs, users};
use crate::sql::{PartialData, SearchPredicateSet};

// ---------------------------------------------------------------------------
// companies
// ---------------------------------------------------------------------------

/// A persisted company row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRow {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Fields an admin may change on a company. The handle is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyChanges {
    pub fn into_partial(self) -> PartialData {
        let mut data = PartialData::new();
        data.set_opt("name", self.name);
        data.set_opt("description", self.description);
        data.set_opt("numEmployees", self.num_employees);
        data.set_opt("logoUrl", self.logo_url);
        data
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn predicates(&self) -> SearchPredicateSet {
        let mut preds = SearchPredicateSet::new();
        preds.add_opt(companies::NAME_LIKE, self.name_like.clone());
        preds.add_opt(companies::MIN_EMPLOYEES, self.min_employees);
        preds.add_opt(companies::MAX_EMPLOYEES, self.max_employees);
        preds
    }
}

// ---------------------------------------------------------------------------
// jobs
// ---------------------------------------------------------------------------

/// A persisted job row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered, in `0.0..=1.0`.
    pub equity: Option<f64>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// Fields an admin may change on a job. Neither the id nor the owning
/// company can be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobChanges {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
}

impl JobChanges {
    pub fn into_partial(self) -> PartialData {
        let mut data = PartialData::new();
        data.set_opt("title", self.title);
        data.set_opt("salary", self.salary);
        data.set_opt("equity", self.equity);
        data
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn predicates(&self) -> SearchPredicateSet {
        let mut preds = SearchPredicateSet::new();
        preds.add_opt(jobs::TITLE, self.title.clone());
        preds.add_opt(jobs::MIN_SALARY, self.min_salary);
        // `hasEquity=false` means "don't filter", not "no equity".
        if self.has_equity == Some(true) {
            preds.add(jobs::HAS_EQUITY, 0.0);
        }
        preds
    }
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Just what is needed to check a login. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentialsRow {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// A user ready to insert; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Fields a user may change on their own record.
///
/// `password` arrives in plain text; the caller hashes it before calling
/// [`UserChanges::into_partial`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn into_partial(self) -> PartialData {
        let mut data = PartialData::new();
        data.set_opt(users::FIRST_NAME, self.first_name);
        data.set_opt(users::LAST_NAME, self.last_name);
        data.set_opt(users::PASSWORD, self.password);
        data.set_opt(users::EMAIL, self.email);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{build_search_clause, build_set_clause, SqlValue};

    #[test]
    fn company_changes_use_column_names() {
        let changes: CompanyChanges =
            serde_json::from_str(r#"{"numEmployees": 40, "logoUrl": "http://x/logo.png"}"#).unwrap();

        let clause = build_set_clause(changes.into_partial(), &companies::FIELD_MAPPING).unwrap();

        assert_eq!(clause.sql(), "num_employees = $1, logo_url = $2");
        assert_eq!(clause.next_placeholder(), 3);
    }

    #[test]
    fn company_changes_reject_handle() {
        let err = serde_json::from_str::<CompanyChanges>(r#"{"handle": "new"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn company_filter_builds_where() {
        let filter = CompanyFilter {
            name_like: Some("net".into()),
            min_employees: Some(10),
            max_employees: None,
        };

        let clause = build_search_clause(filter.predicates(), &companies::SEARCH_PREDICATES).unwrap();

        assert_eq!(clause.where_sql(), "WHERE name ILIKE $1 AND num_employees >= $2");
        assert_eq!(clause.values(), [SqlValue::from("%net%"), SqlValue::Int(10)]);
    }

    #[test]
    fn job_filter_has_equity_false_is_ignored() {
        let filter = JobFilter { has_equity: Some(false), ..Default::default() };
        assert!(filter.predicates().is_empty());

        let filter = JobFilter { has_equity: Some(true), min_salary: Some(1000), ..Default::default() };
        let clause = build_search_clause(filter.predicates(), &jobs::SEARCH_PREDICATES).unwrap();
        assert_eq!(clause.sql(), "salary >= $1 AND equity > $2");
    }

    #[test]
    fn user_changes_map_to_snake_case_columns() {
        let changes = UserChanges {
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            ..Default::default()
        };

        let clause = build_set_clause(changes.into_partial(), &users::FIELD_MAPPING).unwrap();

        assert_eq!(clause.sql(), "last_name = $1, email = $2");
    }

    #[test]
    fn empty_user_changes_are_empty() {
        assert!(UserChanges::default().into_partial().is_empty());
    }
}
