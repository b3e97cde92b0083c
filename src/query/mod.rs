//! Paging, keyword search and status filtering shared by the list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::config::ListConfig;
use crate::error::ApiError;
use crate::filter::{Filter, FilterError};
use crate::i18n::Locale;
use crate::validation::Validator;

/// Raw query string of a list request. Every value is optional and parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub keyword: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Deleted,
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("deleted") => StatusFilter::Deleted,
            _ => StatusFilter::Active,
        }
    }

    /// `deleteTime > 0` for deleted records, absent/null otherwise.
    pub fn condition(&self) -> Value {
        match self {
            StatusFilter::Deleted => json!({ "$gt": 0 }),
            StatusFilter::Active => Value::Null,
        }
    }
}

/// Resolved list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: i64,
    pub page_size: i64,
    pub skip: i64,
    pub keyword: Option<String>,
    pub status: StatusFilter,
}

/// Integer from a query value; missing or non-numeric input yields the default.
pub fn parse_lenient(raw: Option<&str>, default: i64) -> i64 {
    match raw {
        Some(s) if !s.is_empty() => s.parse().unwrap_or(default),
        _ => default,
    }
}

impl ListParams {
    pub fn resolve(&self, config: &ListConfig, locale: Locale) -> Result<ListQuery, ApiError> {
        let page = parse_lenient(self.page.as_deref(), 1);
        let mut page_size = parse_lenient(self.page_size.as_deref(), config.default_page_size);

        let mut v = Validator::new(locale);
        v.gte("page", page, 1).gte("pageSize", page_size, 1);
        v.finish()?;

        if page_size > config.max_page_size {
            warn!("Clamping pageSize {} to {}", page_size, config.max_page_size);
            page_size = config.max_page_size;
        }

        let keyword = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Ok(ListQuery {
            page,
            page_size,
            skip: (page - 1).saturating_mul(page_size),
            keyword,
            status: StatusFilter::parse(self.status.as_deref()),
        })
    }
}

impl ListQuery {
    /// Conditions for a collection searched directly on one of its own fields.
    pub fn conditions(&self, keyword_field: &str) -> Value {
        let mut conditions = Map::new();
        if let Some(keyword) = &self.keyword {
            conditions.insert(keyword_field.to_string(), keyword_condition(keyword));
        }
        conditions.insert("deleteTime".to_string(), self.status.condition());
        Value::Object(conditions)
    }

    /// Conditions for a collection whose keyword search resolved to a set of
    /// referenced ids (`None` when no keyword was given).
    pub fn conditions_by_reference(&self, reference_field: &str, ids: Option<Vec<String>>) -> Value {
        let mut conditions = Map::new();
        if let Some(ids) = ids {
            conditions.insert(reference_field.to_string(), json!({ "$in": ids }));
        }
        conditions.insert("deleteTime".to_string(), self.status.condition());
        Value::Object(conditions)
    }

    /// One page of `conditions`, newest first.
    pub fn page_filter(&self, conditions: Value) -> Result<Filter, FilterError> {
        let mut filter = Filter::new();
        filter
            .where_clause(conditions)?
            .order(json!(["joinTime desc", "_id desc"]))?
            .limit(self.page_size, Some(self.skip))?;
        Ok(filter)
    }
}

/// Literal substring match; the keyword is never interpreted as a pattern.
pub fn keyword_condition(keyword: &str) -> Value {
    json!({ "$find": keyword })
}

/// List response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub item_count: u64,
    pub page_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, query: &ListQuery, item_count: u64) -> Self {
        Self {
            items,
            page: query.page,
            item_count,
            page_count: page_count(item_count, query.page_size),
        }
    }
}

pub fn page_count(item_count: u64, page_size: i64) -> u64 {
    if page_size <= 0 {
        return 0;
    }
    item_count.div_ceil(page_size as u64)
}
