//! Row filters for record queries and deletes.
//!
//! A [`Predicate`] is a conjunction of column conditions. Column names are
//! validated identifiers and every value is a bound parameter, so a
//! predicate can never inject SQL.

use crate::error::StoreResult;
use crate::ident;

/// Sort direction for ordering and indexes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Comparison applied to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String),
    NotEq(String),
    Lt(String),
    Le(String),
    Gt(String),
    Ge(String),
    Like(String),
    IsNull,
    IsNotNull,
}

impl Condition {
    fn operator(&self) -> &'static str {
        match self {
            Self::Eq(_) => "=",
            Self::NotEq(_) => "<>",
            Self::Lt(_) => "<",
            Self::Le(_) => "<=",
            Self::Gt(_) => ">",
            Self::Ge(_) => ">=",
            Self::Like(_) => "LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            Self::Eq(v)
            | Self::NotEq(v)
            | Self::Lt(v)
            | Self::Le(v)
            | Self::Gt(v)
            | Self::Ge(v)
            | Self::Like(v) => Some(v),
            Self::IsNull | Self::IsNotNull => None,
        }
    }
}

/// `WHERE`/`ORDER BY`/`LIMIT` tail of a query, built from typed parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<(String, Condition)>,
    order_by: Option<(String, SortOrder)>,
    limit: Option<u64>,
}

/// SQL fragment plus the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPredicate {
    pub sql: String,
    pub params: Vec<String>,
}

impl Predicate {
    /// Predicate matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((column.into(), condition));
        self
    }

    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::all().with(column, Condition::Eq(value.into()))
    }

    pub fn and_eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::Eq(value.into()))
    }

    pub fn and_not_eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::NotEq(value.into()))
    }

    pub fn and_lt(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::Lt(value.into()))
    }

    pub fn and_le(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::Le(value.into()))
    }

    pub fn and_gt(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::Gt(value.into()))
    }

    pub fn and_ge(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, Condition::Ge(value.into()))
    }

    pub fn and_like(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.with(column, Condition::Like(pattern.into()))
    }

    pub fn and_is_null(self, column: impl Into<String>) -> Self {
        self.with(column, Condition::IsNull)
    }

    pub fn and_is_not_null(self, column: impl Into<String>) -> Self {
        self.with(column, Condition::IsNotNull)
    }

    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the predicate filters nothing.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render the `WHERE` clause only, for statements that cannot carry
    /// `ORDER BY` or `LIMIT` (such as `DELETE`).
    pub fn render_filter(&self) -> StoreResult<RenderedPredicate> {
        let mut sql = String::new();
        let mut params = Vec::new();
        for (i, (column, condition)) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&ident::quote(column)?);
            sql.push(' ');
            sql.push_str(condition.operator());
            if let Some(value) = condition.value() {
                params.push(value.to_string());
                sql.push_str(&format!(" ?{}", params.len()));
            }
        }
        Ok(RenderedPredicate { sql, params })
    }

    /// Render the full tail: filter, ordering and limit.
    pub fn render(&self) -> StoreResult<RenderedPredicate> {
        let mut rendered = self.render_filter()?;
        if let Some((column, order)) = &self.order_by {
            rendered.sql.push_str(&format!(
                " ORDER BY {} {}",
                ident::quote(column)?,
                order.as_sql()
            ));
        }
        if let Some(limit) = self.limit {
            rendered.sql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn empty_predicate_renders_nothing() {
        let r = Predicate::all().render().unwrap();
        assert_eq!(r.sql, "");
        assert!(r.params.is_empty());
    }

    #[test]
    fn conditions_are_anded_and_numbered() {
        let r = Predicate::eq("FirstName", "Michael")
            .and_is_not_null("Phone")
            .and_like("Country", "U%")
            .render()
            .unwrap();
        assert_eq!(
            r.sql,
            r#" WHERE "FirstName" = ?1 AND "Phone" IS NOT NULL AND "Country" LIKE ?2"#
        );
        assert_eq!(r.params, ["Michael", "U%"]);
    }

    #[test]
    fn order_and_limit_follow_filter() {
        let r = Predicate::all()
            .and_gt("Age", "30")
            .order_by("LastName", SortOrder::Descending)
            .limit(5)
            .render()
            .unwrap();
        assert_eq!(r.sql, r#" WHERE "Age" > ?1 ORDER BY "LastName" DESC LIMIT 5"#);
    }

    #[test]
    fn filter_render_drops_order_and_limit() {
        let r = Predicate::eq("A", "1")
            .order_by("A", SortOrder::Ascending)
            .limit(1)
            .render_filter()
            .unwrap();
        assert_eq!(r.sql, r#" WHERE "A" = ?1"#);
    }

    #[test]
    fn values_never_reach_sql_text() {
        let r = Predicate::eq("Name", "x' OR '1'='1").render().unwrap();
        assert!(!r.sql.contains("OR"));
        assert_eq!(r.params, ["x' OR '1'='1"]);
    }

    #[test]
    fn bad_column_is_rejected() {
        let err = Predicate::eq("Name = 1 OR 1", "x").render().unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
    }
}
