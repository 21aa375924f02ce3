//! Native query shape understood by document stores
//!
//! Deliberately small: equality/range filters, ordering and a `start_after`
//! cursor. The repository's query builder produces these.

use super::field_path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which documents a query scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionSelector {
    /// A single collection path
    Collection(String),
    /// Every collection whose last path segment equals the name
    Group(String),
}

impl CollectionSelector {
    /// Human readable target, used in logs and index hints
    pub fn name(&self) -> &str {
        match self {
            Self::Collection(path) => path,
            Self::Group(name) => name,
        }
    }
}

/// Filter comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// `field == value`
    Eq,
    /// `field != value`
    NotEq,
    /// `field < value`
    Lt,
    /// `field <= value`
    Lte,
    /// `field > value`
    Gt,
    /// `field >= value`
    Gte,
    /// `field` equals one of the values in the array `value`
    In,
}

impl FilterOp {
    /// Whether this operator is a range comparison
    pub fn is_range(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }
}

/// A single field filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field to compare
    pub field: FieldPath,
    /// Comparison operator
    pub op: FilterOp,
    /// Comparison operand
    pub value: Value,
}

impl Filter {
    /// Create a filter
    pub fn new(field: FieldPath, op: FilterOp, value: Value) -> Self {
        Self { field, op, value }
    }

    /// Equality filter on a top-level field
    pub fn eq<S: Into<String>>(field: S, value: Value) -> Self {
        Self::new(FieldPath::top_level(field), FilterOp::Eq, value)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort on
    pub field: FieldPath,
    /// Sort direction
    pub direction: Direction,
}

/// Native store query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Documents to scan
    pub target: CollectionSelector,
    /// All filters must match
    pub filters: Vec<Filter>,
    /// Ordering clauses, applied in sequence
    pub order_by: Vec<OrderBy>,
    /// Maximum number of documents to return
    pub limit: Option<usize>,
    /// Return documents strictly after this tuple of `order_by` values
    pub start_after: Option<Vec<Value>>,
    /// Return only these fields (plus `id`)
    pub select: Option<Vec<FieldPath>>,
}

impl Query {
    /// Query over a single collection path
    pub fn collection<S: Into<String>>(path: S) -> Self {
        Self::new(CollectionSelector::Collection(path.into()))
    }

    /// Query over a collection group
    pub fn group<S: Into<String>>(name: S) -> Self {
        Self::new(CollectionSelector::Group(name.into()))
    }

    fn new(target: CollectionSelector) -> Self {
        Self {
            target,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            start_after: None,
            select: None,
        }
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an ordering clause
    pub fn order_by(mut self, field: FieldPath, direction: Direction) -> Self {
        self.order_by.push(OrderBy { field, direction });
        self
    }

    /// Limit the result size
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after the given ordering tuple
    pub fn start_after(mut self, values: Vec<Value>) -> Self {
        self.start_after = Some(values);
        self
    }
}

/// Server-side aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Number of matching documents
    Count,
    /// Sum of a numeric field
    Sum(FieldPath),
    /// Average of a numeric field
    Average(FieldPath),
}

impl Aggregation {
    /// Key under which the result is reported
    pub fn alias(&self) -> String {
        match self {
            Self::Count => "count".to_string(),
            Self::Sum(field) => format!("sum_{field}"),
            Self::Average(field) => format!("avg_{field}"),
        }
    }
}

/// Flat numeric aggregation result keyed by [`Aggregation::alias`]
pub type AggregateResult = BTreeMap<String, f64>;
