//! Parameterized SQL fragments built from sparse, caller-supplied field sets.
//!
//! Both builders produce a [`GeneratedClause`]:
//! - [`build_set_clause`] turns a [`PartialData`] into `col_a = $1, col_b = $2`.
//! - [`build_search_clause`] turns a [`SearchPredicateSet`] into
//!   `col_a >= $1 AND col_b ILIKE $2`.
//!
//! Placeholder `$N` always binds the value at position `N - start` of the
//! clause. A fragment and its value are pushed together, so the two lists
//! cannot drift apart. Only column names from a static [`FieldMapping`] or
//! [`PredicateTable`] are ever written into the SQL text.

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::DbError;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A value bound to exactly one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i32),
    Float(f64),
    Bool(bool),
}

impl SqlValue {
    fn bind_to<'q, O>(
        self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        match self {
            Self::Text(v) => query.bind(v),
            Self::Int(v) => query.bind(v),
            Self::Float(v) => query.bind(v),
            Self::Bool(v) => query.bind(v),
        }
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

// ---------------------------------------------------------------------------
// GeneratedClause
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    Comma,
    And,
}

impl Connective {
    fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ", ",
            Self::And => " AND ",
        }
    }
}

/// Ordered `column OP $N` fragments with their positionally aligned values.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClause {
    connective: Connective,
    start: usize,
    fragments: Vec<String>,
    values: Vec<SqlValue>,
}

impl GeneratedClause {
    fn new(connective: Connective, start: usize) -> Self {
        Self {
            connective,
            start,
            fragments: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, column: &str, operator: &str, value: SqlValue) {
        let placeholder = self.next_placeholder();
        self.fragments.push(format!("{column} {operator} ${placeholder}"));
        self.values.push(value);
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first placeholder not used by this clause.
    ///
    /// A trailing `WHERE key = $N` must use this index to keep the
    /// numbering contiguous.
    pub fn next_placeholder(&self) -> usize {
        self.start + self.values.len()
    }

    /// Fragments joined by the clause's connective.
    pub fn sql(&self) -> String {
        self.fragments.join(self.connective.as_str())
    }

    /// `WHERE …` for a non-empty clause, the empty string otherwise.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.sql())
        }
    }

    /// Bind every value, in placeholder order, onto `query`.
    pub fn bind<'q, O>(
        self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        self.values
            .into_iter()
            .fold(query, |query, value| value.bind_to(query))
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Static logical-field → column mapping for one resource type.
///
/// Fields missing from the mapping are used verbatim as the column name.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pairs: &'static [(&'static str, &'static str)],
}

impl FieldMapping {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(logical, _)| *logical == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// The fields a caller intends to change, in the order they were set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialData {
    entries: Vec<(&'static str, SqlValue)>,
}

impl PartialData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field`; setting it again replaces the value in place.
    pub fn set(&mut self, field: &'static str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn set_opt<V: Into<SqlValue>>(&mut self, field: &'static str, value: Option<V>) {
        if let Some(value) = value {
            self.set(field, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build `col = $1, col = $2, …` for an update.
///
/// # Errors
/// [`DbError::InvalidArgument`] if `data` is empty.
pub fn build_set_clause(data: PartialData, mapping: &FieldMapping) -> Result<GeneratedClause, DbError> {
    build_set_clause_from(data, mapping, 1)
}

/// Like [`build_set_clause`], numbering placeholders from `start`.
pub fn build_set_clause_from(
    data: PartialData,
    mapping: &FieldMapping,
    start: usize,
) -> Result<GeneratedClause, DbError> {
    if data.is_empty() {
        return Err(DbError::InvalidArgument("no data".into()));
    }

    let mut clause = GeneratedClause::new(Connective::Comma, start);
    for (field, value) in data.entries {
        clause.push(mapping.column(field), "=", value);
    }
    Ok(clause)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// How a predicate compares its column against the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    AtMost,
    GreaterThan,
    /// Case-insensitive substring match; the bound value gets `%` on both sides.
    Contains,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
            Self::GreaterThan => ">",
            Self::Contains => "ILIKE",
        }
    }
}

/// One entry of a resource's fixed predicate table.
#[derive(Debug, Clone, Copy)]
pub struct Predicate {
    pub key: &'static str,
    pub column: &'static str,
    pub comparison: Comparison,
}

/// The predicates a resource can be searched by.
#[derive(Debug, Clone, Copy)]
pub struct PredicateTable {
    predicates: &'static [Predicate],
}

impl PredicateTable {
    pub const fn new(predicates: &'static [Predicate]) -> Self {
        Self { predicates }
    }

    pub fn lookup(&self, key: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.key == key)
    }
}

/// Requested predicates in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPredicateSet {
    entries: Vec<(&'static str, SqlValue)>,
}

impl SearchPredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &'static str, value: impl Into<SqlValue>) {
        self.entries.push((key, value.into()));
    }

    pub fn add_opt<V: Into<SqlValue>>(&mut self, key: &'static str, value: Option<V>) {
        if let Some(value) = value {
            self.add(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build `col OP $1 AND col OP $2 …` for a filtered search.
///
/// An empty predicate set yields an empty clause.
///
/// # Errors
/// [`DbError::InvalidArgument`] for a key missing from `table`, or a
/// non-text value given to a [`Comparison::Contains`] predicate.
pub fn build_search_clause(
    predicates: SearchPredicateSet,
    table: &PredicateTable,
) -> Result<GeneratedClause, DbError> {
    let mut clause = GeneratedClause::new(Connective::And, 1);

    for (key, value) in predicates.entries {
        let predicate = table
            .lookup(key)
            .ok_or_else(|| DbError::InvalidArgument(format!("unknown search predicate `{key}`")))?;

        let value = match (predicate.comparison, value) {
            (Comparison::Contains, SqlValue::Text(text)) => {
                SqlValue::Text(format!("%{}%", escape_like(&text)))
            }
            (Comparison::Contains, _) => {
                return Err(DbError::InvalidArgument(format!(
                    "search predicate `{key}` needs a text value"
                )));
            }
            (_, value) => value,
        };

        clause.push(predicate.column, predicate.comparison.operator(), value);
    }

    Ok(clause)
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: FieldMapping = FieldMapping::new(&[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ]);

    const TABLE: PredicateTable = PredicateTable::new(&[
        Predicate { key: "minEmployees", column: "num_employees", comparison: Comparison::AtLeast },
        Predicate { key: "maxEmployees", column: "num_employees", comparison: Comparison::AtMost },
        Predicate { key: "nameLike", column: "name", comparison: Comparison::Contains },
        Predicate { key: "hasEquity", column: "equity", comparison: Comparison::GreaterThan },
    ]);

    #[test]
    fn set_clause_maps_columns_and_numbers_placeholders() {
        let mut data = PartialData::new();
        data.set("firstName", "Aliya");
        data.set("age", 32);

        let clause = build_set_clause(data, &MAPPING).unwrap();

        assert_eq!(clause.fragments(), ["first_name = $1", "age = $2"]);
        assert_eq!(clause.values(), [SqlValue::from("Aliya"), SqlValue::Int(32)]);
        assert_eq!(clause.sql(), "first_name = $1, age = $2");
        assert_eq!(clause.next_placeholder(), 3);
    }

    #[test]
    fn set_clause_has_one_fragment_per_field() {
        let mut data = PartialData::new();
        data.set("lastName", "Smith");
        data.set("email", "s@example.com");
        data.set("isAdmin", true);

        let clause = build_set_clause(data, &MAPPING).unwrap();

        assert_eq!(clause.len(), 3);
        for (i, fragment) in clause.fragments().iter().enumerate() {
            assert!(fragment.ends_with(&format!("${}", i + 1)), "{fragment}");
        }
        assert_eq!(clause.values()[2], SqlValue::Bool(true));
    }

    #[test]
    fn set_clause_with_offset_continues_numbering() {
        let mut data = PartialData::new();
        data.set("title", "Engineer");

        let clause = build_set_clause_from(data, &MAPPING, 4).unwrap();

        assert_eq!(clause.sql(), "title = $4");
        assert_eq!(clause.next_placeholder(), 5);
    }

    #[test]
    fn set_clause_rejects_empty_data() {
        let err = build_set_clause(PartialData::new(), &MAPPING).unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(msg) if msg == "no data"));
    }

    #[test]
    fn setting_a_field_twice_keeps_its_position() {
        let mut data = PartialData::new();
        data.set("firstName", "A");
        data.set("lastName", "B");
        data.set("firstName", "C");

        let clause = build_set_clause(data, &MAPPING).unwrap();

        assert_eq!(clause.sql(), "first_name = $1, last_name = $2");
        assert_eq!(clause.values(), [SqlValue::from("C"), SqlValue::from("B")]);
    }

    #[test]
    fn set_clause_values_never_appear_in_sql() {
        let mut data = PartialData::new();
        data.set("firstName", "'; DROP TABLE users; --");

        let clause = build_set_clause(data, &MAPPING).unwrap();

        assert_eq!(clause.sql(), "first_name = $1");
    }

    #[test]
    fn empty_search_is_no_filter() {
        let clause = build_search_clause(SearchPredicateSet::new(), &TABLE).unwrap();

        assert!(clause.is_empty());
        assert!(clause.fragments().is_empty());
        assert_eq!(clause.where_sql(), "");
    }

    #[test]
    fn search_predicates_join_with_and_in_insertion_order() {
        let mut preds = SearchPredicateSet::new();
        preds.add("maxEmployees", 500);
        preds.add("nameLike", "net");
        preds.add("minEmployees", 10);

        let clause = build_search_clause(preds, &TABLE).unwrap();

        assert_eq!(
            clause.where_sql(),
            "WHERE num_employees <= $1 AND name ILIKE $2 AND num_employees >= $3"
        );
        assert_eq!(
            clause.values(),
            [SqlValue::Int(500), SqlValue::from("%net%"), SqlValue::Int(10)]
        );
    }

    #[test]
    fn contains_wraps_value_and_keeps_it_out_of_sql() {
        let mut preds = SearchPredicateSet::new();
        preds.add("nameLike", "abc");

        let clause = build_search_clause(preds, &TABLE).unwrap();

        assert_eq!(clause.values(), [SqlValue::from("%abc%")]);
        assert!(!clause.sql().contains("abc"));
    }

    #[test]
    fn contains_escapes_like_metacharacters() {
        let mut preds = SearchPredicateSet::new();
        preds.add("nameLike", "50%_off\\");

        let clause = build_search_clause(preds, &TABLE).unwrap();

        assert_eq!(clause.values(), [SqlValue::from("%50\\%\\_off\\\\%")]);
    }

    #[test]
    fn unknown_predicate_key_fails_fast() {
        let mut preds = SearchPredicateSet::new();
        preds.add("minEmployees", 1);
        preds.add("colour", "blue");

        let err = build_search_clause(preds, &TABLE).unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(msg) if msg.contains("colour")));
    }

    #[test]
    fn contains_rejects_non_text_value() {
        let mut preds = SearchPredicateSet::new();
        preds.add("nameLike", 3);

        assert!(matches!(
            build_search_clause(preds, &TABLE),
            Err(DbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn add_opt_skips_absent_predicates() {
        let mut preds = SearchPredicateSet::new();
        preds.add_opt::<i32>("minEmployees", None);
        preds.add_opt("hasEquity", Some(0.0));

        let clause = build_search_clause(preds, &TABLE).unwrap();

        assert_eq!(clause.sql(), "equity > $1");
        assert_eq!(clause.values(), [SqlValue::Float(0.0)]);
    }
}
