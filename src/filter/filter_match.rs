// Evaluates filters against in-memory documents with the same semantics the
// SQL compiler gives them (JSONB ordering, absent fields behave like SQL NULL).
use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::filter::Filter;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, SortDirection};

pub fn matches(where_data: Option<&Value>, doc: &Map<String, Value>) -> bool {
    let Some(where_data) = where_data else {
        return true;
    };
    let Ok(conditions) = FilterWhere::parse_where_data(where_data) else {
        return false;
    };

    conditions.iter().all(|c| {
        let field = doc.get(&c.field);
        match c.operator {
            FilterOp::Eq if c.data.is_null() => field.map_or(true, Value::is_null),
            FilterOp::Eq => field.map_or(false, |v| compare(v, &c.data) == Ordering::Equal),
            FilterOp::Ne if c.data.is_null() => field.map_or(false, |v| !v.is_null()),
            FilterOp::Ne => field.map_or(true, |v| compare(v, &c.data) != Ordering::Equal),
            FilterOp::Gt => field.map_or(false, |v| compare(v, &c.data) == Ordering::Greater),
            FilterOp::Gte => field.map_or(false, |v| compare(v, &c.data) != Ordering::Less),
            FilterOp::Lt => field.map_or(false, |v| compare(v, &c.data) == Ordering::Less),
            FilterOp::Lte => field.map_or(false, |v| compare(v, &c.data) != Ordering::Greater),
            FilterOp::In => {
                let candidates = c.data.as_array().cloned().unwrap_or_default();
                field.map_or(false, |v| candidates.iter().any(|x| compare(v, x) == Ordering::Equal))
            }
            FilterOp::Find => match (field.and_then(Value::as_str), c.data.as_str()) {
                (Some(haystack), Some(needle)) => haystack.contains(needle),
                _ => false,
            },
            FilterOp::And => c
                .data
                .as_array()
                .map_or(true, |items| items.iter().all(|i| matches(Some(i), doc))),
            FilterOp::Or => c
                .data
                .as_array()
                .map_or(false, |items| items.iter().any(|i| matches(Some(i), doc))),
            FilterOp::Not => !matches(Some(&c.data), doc),
        }
    })
}

/// Sort, skip and limit a result set the way the SQL compiler orders it.
pub fn apply_paging(filter: &Filter, mut docs: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
    docs.sort_by(|a, b| {
        for info in filter.sort() {
            // SQL NULL sorts after every value
            let ordering = match (a.get(&info.field), b.get(&info.field)) {
                (Some(x), Some(y)) => compare(x, y),
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    let skip = filter.offset_value().unwrap_or(0).max(0) as usize;
    let limit = filter.limit_value().map_or(usize::MAX, |l| l.max(0) as usize);
    docs.into_iter().skip(skip).take(limit).collect()
}

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (x, y) if rank(x) != rank(y) => rank(x).cmp(&rank(y)),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn null_equality_covers_missing_fields() {
        let active = json!({ "deleteTime": null });
        assert!(matches(Some(&active), &doc(json!({ "email": "a@x.io" }))));
        assert!(matches(Some(&active), &doc(json!({ "deleteTime": null }))));
        assert!(!matches(Some(&active), &doc(json!({ "deleteTime": 1700000000 }))));

        let deleted = json!({ "deleteTime": { "$gt": 0 } });
        assert!(matches(Some(&deleted), &doc(json!({ "deleteTime": 1700000000 }))));
        assert!(!matches(Some(&deleted), &doc(json!({}))));
    }

    #[test]
    fn find_is_literal() {
        let cond = json!({ "email": { "$find": "a.c" } });
        assert!(matches(Some(&cond), &doc(json!({ "email": "xa.c@x.io" }))));
        assert!(!matches(Some(&cond), &doc(json!({ "email": "abc@x.io" }))));
    }
}
