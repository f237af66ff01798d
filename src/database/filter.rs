use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, Postgres};

/// A bound parameter in a list filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i32),
    Bool(bool),
    Date(NaiveDate),
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        FilterValue::Date(v)
    }
}

/// Accumulates `AND`-joined conditions with positional (`$n`) parameters.
///
/// Column expressions come from repository code, never from request input;
/// request values only travel as bound parameters.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    params: Vec<FilterValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, value: FilterValue) -> usize {
        self.params.push(value);
        self.params.len()
    }

    pub fn eq(&mut self, column: &str, value: impl Into<FilterValue>) -> &mut Self {
        let index = self.push(value.into());
        self.conditions.push(format!("{} = ${}", column, index));
        self
    }

    pub fn eq_opt<V: Into<FilterValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.eq(column, v);
        }
        self
    }

    /// Case-insensitive "contains"
    pub fn ilike(&mut self, column: &str, text: Option<&str>) -> &mut Self {
        if let Some(text) = text {
            let index = self.push(FilterValue::Text(format!("%{}%", escape_like(text))));
            self.conditions.push(format!("{} ILIKE ${}", column, index));
        }
        self
    }

    /// Matches rows whose timestamp falls on the given calendar day
    pub fn on_date(&mut self, column: &str, date: Option<NaiveDate>) -> &mut Self {
        if let Some(date) = date {
            let index = self.push(FilterValue::Date(date));
            self.conditions.push(format!("DATE({}) = ${}::date", column, index));
        }
        self
    }

    /// `" WHERE a AND b"`, or empty when there are no conditions
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.conditions.join(" AND "))
    }

    /// Index for the next placeholder after the filter params (LIMIT/OFFSET)
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }

    pub fn bind_query_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        for p in &self.params {
            q = match p {
                FilterValue::Text(s) => q.bind(s.as_str()),
                FilterValue::Int(i) => q.bind(*i),
                FilterValue::Bool(b) => q.bind(*b),
                FilterValue::Date(d) => q.bind(*d),
            };
        }
        q
    }

    pub fn bind_query_scalar<'q, O>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for p in &self.params {
            q = match p {
                FilterValue::Text(s) => q.bind(s.as_str()),
                FilterValue::Int(i) => q.bind(*i),
                FilterValue::Bool(b) => q.bind(*b),
                FilterValue::Date(d) => q.bind(*d),
            };
        }
        q
    }
}

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

    #[test]
    fn empty_clause_renders_nothing() {
        let w = WhereClause::new();
        assert_eq!(w.to_sql(), "");
        assert_eq!(w.next_index(), 1);
    }

    #[test]
    fn conditions_number_their_placeholders() {
        let mut w = WhereClause::new();
        w.ilike("u.name", Some("ann"))
            .eq_opt("u.role", Some("IT"))
            .eq_opt::<i32>("u.division_id", None)
            .eq_opt("u.is_active", Some(true))
            .on_date("u.created_at", NaiveDate::from_ymd_opt(2024, 5, 1));

        assert_eq!(
            w.to_sql(),
            " WHERE u.name ILIKE $1 AND u.role = $2 AND u.is_active = $3 AND DATE(u.created_at) = $4::date"
        );
        assert_eq!(w.next_index(), 5);
        assert_eq!(w.params()[0], FilterValue::Text("%ann%".to_string()));
        assert_eq!(w.params()[2], FilterValue::Bool(true));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        let mut w = WhereClause::new();
        w.ilike("name", Some("50%_off\\"));
        assert_eq!(w.params()[0], FilterValue::Text("%50\\%\\_off\\\\%".to_string()));
    }
}
