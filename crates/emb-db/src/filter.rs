//! Structured list filters.
//!
//! A [`Filters`] value is an ordered list of active predicates. Inactive
//! filters are simply never pushed, so rendering is one `where` followed by
//! `and`-joined predicates, with `$n` placeholders in push order.
//!
//! Column names are `&'static str` picked by the calling query module; user
//! input only ever reaches the statement as a bound value.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Uuid(Uuid),
    Text(String),
}

impl From<Uuid> for FilterValue {
    fn from(v: Uuid) -> Self {
        FilterValue::Uuid(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
}

impl Op {
    fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => " = ",
            Op::NotEq => " <> ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub op: Op,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Default)]
pub struct Filters {
    preds: Vec<Predicate>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, column: &'static str, op: Op, value: impl Into<FilterValue>) -> Self {
        self.preds.push(Predicate {
            column,
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &'static str, value: impl Into<FilterValue>) -> Self {
        self.push(column, Op::Eq, value)
    }

    pub fn not_eq(self, column: &'static str, value: impl Into<FilterValue>) -> Self {
        self.push(column, Op::NotEq, value)
    }

    /// `eq` when `value` is present, no-op otherwise.
    pub fn eq_opt<V: Into<FilterValue>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.preds
    }

    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }

    /// Render `base [where ...] order by <order_by>`.
    pub fn select(&self, base: &str, order_by: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(base);

        for (i, p) in self.preds.iter().enumerate() {
            qb.push(if i == 0 { " where " } else { " and " });
            qb.push(p.column);
            qb.push(p.op.as_sql());
            match &p.value {
                FilterValue::Uuid(u) => {
                    qb.push_bind(*u);
                }
                FilterValue::Text(s) => {
                    qb.push_bind(s.clone());
                }
            }
        }

        if !order_by.is_empty() {
            qb.push(" order by ");
            qb.push(order_by);
        }
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "select order_id from orders";

    #[test]
    fn no_filters_means_no_where() {
        let qb = Filters::new().select(BASE, "open_time desc");
        assert_eq!(qb.sql(), "select order_id from orders order by open_time desc");
    }

    #[test]
    fn single_filter_has_no_leading_and() {
        let qb = Filters::new()
            .eq("status", "open")
            .select(BASE, "open_time desc");
        assert_eq!(
            qb.sql(),
            "select order_id from orders where status = $1 order by open_time desc"
        );
    }

    #[test]
    fn predicates_join_with_and_in_push_order() {
        let client = Uuid::new_v4();
        let qb = Filters::new()
            .eq("status", "open")
            .eq("client_id", client)
            .not_eq("status", "ARCHIVED")
            .select(BASE, "");
        assert_eq!(
            qb.sql(),
            "select order_id from orders where status = $1 and client_id = $2 and status <> $3"
        );
    }

    #[test]
    fn inactive_optional_filters_are_skipped() {
        let f = Filters::new()
            .eq_opt("client_id", None::<Uuid>)
            .eq_opt("status", Some("queue"))
            .eq_opt("order_id", None::<Uuid>);
        assert_eq!(f.predicates().len(), 1);
        assert_eq!(f.predicates()[0].column, "status");
        assert_eq!(f.predicates()[0].value, FilterValue::Text("queue".into()));

        let qb = f.select(BASE, "open_time desc");
        assert_eq!(
            qb.sql(),
            "select order_id from orders where status = $1 order by open_time desc"
        );
    }
}
