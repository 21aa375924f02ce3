//! Filter evaluation and value ordering for the in-memory store
//!
//! Values of different JSON types order by type rank
//! (null < bool < number < string < array < object); range filters only
//! match values of the same type as the operand.

use docvault_domain::value_objects::{Direction, Document, Filter, FilterOp, OrderBy};
use serde_json::Value;
use std::cmp::Ordering;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y) {
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let mut left: Vec<_> = x.iter().collect();
            let mut right: Vec<_> = y.iter().collect();
            left.sort_by(|a, b| a.0.cmp(b.0));
            right.sort_by(|a, b| a.0.cmp(b.0));
            for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            left.len().cmp(&right.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Whether a document satisfies a filter
///
/// Documents missing the filtered field never match.
pub fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    let Some(actual) = filter.field.get(doc) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => compare_values(actual, &filter.value) == Ordering::Equal,
        FilterOp::NotEq => compare_values(actual, &filter.value) != Ordering::Equal,
        FilterOp::In => filter
            .value
            .as_array()
            .is_some_and(|candidates| {
                candidates
                    .iter()
                    .any(|candidate| compare_values(actual, candidate) == Ordering::Equal)
            }),
        FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte => {
            if type_rank(actual) != type_rank(&filter.value) {
                return false;
            }
            let ord = compare_values(actual, &filter.value);
            match filter.op {
                FilterOp::Lt => ord == Ordering::Less,
                FilterOp::Lte => ord != Ordering::Greater,
                FilterOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            }
        }
    }
}

/// Values of the ordering fields, or `None` if any is missing
pub fn sort_key(doc: &Document, order_by: &[OrderBy]) -> Option<Vec<Value>> {
    order_by
        .iter()
        .map(|clause| clause.field.get(doc).cloned())
        .collect()
}

/// Compare two ordering tuples honoring each clause's direction
pub fn compare_keys(a: &[Value], b: &[Value], order_by: &[OrderBy]) -> Ordering {
    for ((left, right), clause) in a.iter().zip(b).zip(order_by) {
        let ord = compare_values(left, right);
        let ord = match clause.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
