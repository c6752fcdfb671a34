//! Query description shared by the record store backends.

use pantry_core::FieldMap;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

/// Filters are ANDed. Results are ordered ascending by `order_by`, or by key when
/// unset; documents lacking the order-by field are excluded. `start_after` is a
/// value of the ordering field and only documents strictly after it are returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub filters: Vec<Filter>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
    pub start_after: Option<Value>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter::new(field, op, value));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Value) -> Self {
        self.start_after = Some(cursor);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub data: FieldMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub documents: Vec<Document>,
    /// Ordering value of the last document, present only when the page is full.
    pub next_cursor: Option<Value>,
}

impl Page {
    pub(crate) fn from_documents(
        documents: Vec<Document>,
        query: &RecordQuery,
    ) -> Self {
        let full = query.limit.is_some_and(|limit| documents.len() == limit && limit > 0);
        let next_cursor = if full {
            documents.last().and_then(|doc| match query.order_by.as_deref() {
                Some(field) => doc.data.get(field).cloned(),
                None => Some(Value::String(doc.key.clone())),
            })
        } else {
            None
        };
        Self {
            documents,
            next_cursor,
        }
    }
}

/// Rank of a JSON type in the cross-type ordering: null < string < number < bool < array < object.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values, matching PostgreSQL's `jsonb` ordering for scalars.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Filter semantics: range operators only match values of the same JSON type.
pub fn matches_filter(data: &FieldMap, filter: &Filter) -> bool {
    let Some(value) = data.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => match (value, &filter.value) {
            (Value::Number(_), Value::Number(_)) => {
                compare_values(value, &filter.value) == Ordering::Equal
            }
            _ => value == &filter.value,
        },
        FilterOp::Gt => {
            type_rank(value) == type_rank(&filter.value)
                && compare_values(value, &filter.value) == Ordering::Greater
        }
        FilterOp::Lt => {
            type_rank(value) == type_rank(&filter.value)
                && compare_values(value, &filter.value) == Ordering::Less
        }
    }
}
