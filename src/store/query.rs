use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operators understood by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::IsNull => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Select query: equality/range filters, one ordering column and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: &str, op: Op, value: impl ToString) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn eq(self, field: &str, value: impl ToString) -> Self {
        self.push(field, Op::Eq, value)
    }

    pub fn gt(self, field: &str, value: impl ToString) -> Self {
        self.push(field, Op::Gt, value)
    }

    pub fn gte(self, field: &str, value: impl ToString) -> Self {
        self.push(field, Op::Gte, value)
    }

    pub fn lt(self, field: &str, value: impl ToString) -> Self {
        self.push(field, Op::Lt, value)
    }

    pub fn lte(self, field: &str, value: impl ToString) -> Self {
        self.push(field, Op::Lte, value)
    }

    pub fn is_null(self, field: &str) -> Self {
        self.push(field, Op::IsNull, "null")
    }

    pub fn order(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Render as PostgREST query-string pairs, e.g. `user_id=eq.abc`, `order=start_time.asc`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for f in &self.filters {
            params.push((f.field.clone(), format!("{}.{}", f.op.as_str(), f.value)));
        }

        if let Some((field, direction)) = &self.order {
            params.push(("order".to_string(), format!("{}.{}", field, direction.as_str())));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Evaluate the filters against a JSON row.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| {
            let field = row.get(&f.field).unwrap_or(&Value::Null);
            if f.op == Op::IsNull {
                return field.is_null();
            }
            let Some(ord) = compare_to_literal(field, &f.value) else {
                return false;
            };
            match f.op {
                Op::Eq => ord == Ordering::Equal,
                Op::Gt => ord == Ordering::Greater,
                Op::Gte => ord != Ordering::Less,
                Op::Lt => ord == Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
                Op::IsNull => unreachable!(),
            }
        })
    }

    /// Filter, order and limit rows in memory.
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut out: Vec<Value> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if let Some((field, direction)) = &self.order {
            out.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(field).unwrap_or(&Value::Null),
                    b.get(field).unwrap_or(&Value::Null),
                );
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }

        out
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn compare_strings(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn compare_to_literal(value: &Value, literal: &str) -> Option<Ordering> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs = literal.parse::<f64>().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(compare_strings(s, literal)),
        Value::Bool(b) => literal.parse::<bool>().ok().map(|rhs| b.cmp(&rhs)),
        _ => None,
    }
}

// Nulls sort last, matching the store's default ordering.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => compare_strings(x, y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_params_renders_filters_order_and_limit() {
        let query = Query::new()
            .eq("user_id", "u-1")
            .gte("start_time", "2026-03-01T00:00:00Z")
            .lt("start_time", "2026-04-01T00:00:00Z")
            .order("start_time", Direction::Ascending)
            .limit(10);

        let params = query.to_params();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert!(params.contains(&("user_id".to_string(), "eq.u-1".to_string())));
        assert!(params.contains(&(
            "start_time".to_string(),
            "gte.2026-03-01T00:00:00Z".to_string()
        )));
        assert!(params.contains(&("order".to_string(), "start_time.asc".to_string())));
        assert!(params.contains(&("limit".to_string(), "10".to_string())));
    }

    #[test]
    fn test_is_null_renders_as_is_null() {
        let params = Query::new().is_null("end_time").to_params();
        assert!(params.contains(&("end_time".to_string(), "is.null".to_string())));
    }

    #[test]
    fn test_matches_compares_instants_across_offsets() {
        let row = json!({ "start_time": "2026-03-01T07:00:00+07:00" });
        assert!(Query::new().eq("start_time", "2026-03-01T00:00:00Z").matches(&row));
        assert!(Query::new().lt("start_time", "2026-03-01T00:00:01Z").matches(&row));
    }

    #[test]
    fn test_lte_includes_and_gt_excludes_the_boundary() {
        let row = json!({ "start_time": "2026-03-31T17:00:00Z", "date": "2026-03-31" });

        assert!(Query::new().lte("start_time", "2026-03-31T17:00:00Z").matches(&row));
        assert!(!Query::new().gt("start_time", "2026-03-31T17:00:00Z").matches(&row));
        assert!(Query::new().gt("start_time", "2026-03-31T16:59:59Z").matches(&row));
        assert!(!Query::new().lte("start_time", "2026-03-31T16:59:59Z").matches(&row));

        // Plain dates compare lexically, which orders YYYY-MM-DD correctly
        assert!(Query::new().lte("date", "2026-03-31").matches(&row));
        assert!(!Query::new().gt("date", "2026-03-31").matches(&row));
        assert!(Query::new().gt("date", "2026-03-30").lte("date", "2026-03-31").matches(&row));
    }

    #[test]
    fn test_gt_and_lte_render_as_params() {
        let params = Query::new()
            .gt("id", 10)
            .lte("date", "2026-03-31")
            .to_params();

        assert!(params.contains(&("id".to_string(), "gt.10".to_string())));
        assert!(params.contains(&("date".to_string(), "lte.2026-03-31".to_string())));
    }

    #[test]
    fn test_gt_and_lte_on_numbers() {
        let row = json!({ "id": 10 });
        assert!(Query::new().lte("id", 10).matches(&row));
        assert!(!Query::new().gt("id", 10).matches(&row));
        assert!(Query::new().gt("id", 9.5).matches(&row));
    }

    #[test]
    fn test_matches_numbers_and_null() {
        let row = json!({ "id": 7, "end_time": null });
        assert!(Query::new().eq("id", 7).matches(&row));
        assert!(Query::new().is_null("end_time").matches(&row));
        assert!(!Query::new().gte("end_time", "2026-01-01T00:00:00Z").matches(&row));
    }

    #[test]
    fn test_apply_orders_descending_with_limit() {
        let rows = vec![
            json!({ "full_name": "Binh" }),
            json!({ "full_name": "An" }),
            json!({ "full_name": "Chi" }),
        ];
        let out = Query::new()
            .order("full_name", Direction::Descending)
            .limit(2)
            .apply(rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["full_name"], "Chi");
        assert_eq!(out[1]["full_name"], "Binh");
    }
}
