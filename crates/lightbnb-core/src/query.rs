//! Parameterized query construction.
//!
//! Every statement is assembled as a list of clause fragments plus a list of
//! bound values. Caller-supplied values only ever reach the database through
//! positional placeholders (`$1`, `$2`, ...); the template text is built from
//! fixed column names and operators alone.

use crate::util::dollars_to_cents;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Row cap used when the caller passes no limit or a non-positive one.
pub const DEFAULT_LIMIT: i64 = 10;

const AVERAGE_RATING: &str = "avg(property_reviews.rating)";

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// Optional search filters for the listing search. Prices are in major
/// currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub minimum_price_per_night: Option<f64>,
    #[serde(default)]
    pub maximum_price_per_night: Option<f64>,
    #[serde(default)]
    pub minimum_rating: Option<f64>,
}

impl FilterCriteria {
    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..self
        }
    }

    pub fn with_owner_id(self, owner_id: i64) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..self
        }
    }

    pub fn with_minimum_price(self, price: f64) -> Self {
        Self {
            minimum_price_per_night: Some(price),
            ..self
        }
    }

    pub fn with_maximum_price(self, price: f64) -> Self {
        Self {
            maximum_price_per_night: Some(price),
            ..self
        }
    }

    pub fn with_minimum_rating(self, rating: f64) -> Self {
        Self {
            minimum_rating: Some(rating),
            ..self
        }
    }

    /// Pre-grouping predicates in their fixed order: city, owner, minimum
    /// price, maximum price. The rating filter is not part of this list.
    ///
    /// The city is matched as a substring and is not escaped: `%` and `_`
    /// inside it keep their `LIKE` wildcard meaning. Non-finite prices are
    /// treated as absent.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(city) = self.city.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push(Predicate::new(
                "city",
                Comparator::Like,
                format!("%{}%", city),
            ));
        }
        if let Some(owner_id) = self.owner_id {
            out.push(Predicate::new("owner_id", Comparator::Eq, owner_id));
        }
        if let Some(min) = self.minimum_price_per_night.and_then(price_bound) {
            out.push(Predicate::new("cost_per_night", Comparator::Gte, min));
        }
        if let Some(max) = self.maximum_price_per_night.and_then(price_bound) {
            out.push(Predicate::new("cost_per_night", Comparator::Lte, max));
        }
        out
    }

    fn rating_filter(&self) -> Option<Predicate> {
        let rating = self.minimum_rating?;
        if !rating.is_finite() {
            warn!("ignoring non-finite minimum rating {}", rating);
            return None;
        }
        Some(Predicate::new(AVERAGE_RATING, Comparator::Gte, rating))
    }
}

/// Cents bound for a price filter. Finite prices beyond the `i64` cent range
/// are pinned to `i64::MIN`/`i64::MAX`, which keeps the comparison's meaning
/// (nothing costs more than `i64::MAX` cents).
fn price_bound(price: f64) -> Option<i64> {
    if !price.is_finite() {
        warn!("ignoring non-finite price filter {}", price);
        return None;
    }
    Some(dollars_to_cents(price).unwrap_or_else(|| {
        warn!("price filter {} out of range, pinning to bound", price);
        if price > 0.0 {
            i64::MAX
        } else {
            i64::MIN
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Like,
    Gte,
    Lte,
}

impl Comparator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Like => "LIKE",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
        }
    }
}

/// A single filter condition: a fixed column expression compared against a
/// bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: &'static str,
    pub comparator: Comparator,
    pub value: SqlValue,
}

impl Predicate {
    pub fn new(column: &'static str, comparator: Comparator, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            comparator,
            value: value.into(),
        }
    }

    /// Binds the value and returns the rendered condition text.
    fn render(self, plan: &mut PlanBuilder) -> String {
        let n = plan.bind(self.value);
        format!("{} {} ${}", self.column, self.comparator.as_sql(), n)
    }
}

/// An assembled statement: clause fragments, bound values in placeholder
/// order, and the final template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
    template: String,
}

impl QueryPlan {
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.template, self.params)
    }
}

/// Accumulates clauses and hands out placeholder numbers as values are bound.
#[derive(Debug, Default)]
pub(crate) struct PlanBuilder {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl PlanBuilder {
    pub(crate) fn new(base: &[&str]) -> Self {
        Self {
            clauses: base.iter().map(|c| c.to_string()).collect(),
            params: Vec::new(),
        }
    }

    /// Pushes a value and returns its 1-based placeholder number.
    pub(crate) fn bind(&mut self, value: impl Into<SqlValue>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    pub(crate) fn clause(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub(crate) fn finish(self) -> QueryPlan {
        let mut template = self.clauses.join("\n");
        template.push(';');
        QueryPlan {
            clauses: self.clauses,
            params: self.params,
            template,
        }
    }
}

pub fn normalize_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_LIMIT,
    }
}

/// Builds the filtered listing search: properties joined with their average
/// review rating, cheapest first, capped at `limit` rows.
pub fn build_listing_query(criteria: &FilterCriteria, limit: Option<i64>) -> QueryPlan {
    let mut plan = PlanBuilder::new(&[
        "SELECT properties.*, avg(property_reviews.rating) AS average_rating",
        "FROM properties",
        "LEFT JOIN property_reviews ON properties.id = property_reviews.property_id",
    ]);

    let conditions: Vec<String> = criteria
        .predicates()
        .into_iter()
        .map(|p| p.render(&mut plan))
        .collect();
    if !conditions.is_empty() {
        plan.clause(format!("WHERE {}", conditions.join(" AND ")));
    }

    plan.clause("GROUP BY properties.id");

    // must sit between GROUP BY and ORDER BY
    if let Some(having) = criteria.rating_filter() {
        let cond = having.render(&mut plan);
        plan.clause(format!("HAVING {}", cond));
    }

    plan.clause("ORDER BY cost_per_night");
    let n = plan.bind(normalize_limit(limit));
    plan.clause(format!("LIMIT ${}", n));
    plan.finish()
}

#[cfg(test)]
pub(crate) fn placeholders(template: &str) -> Vec<usize> {
    let bytes = template.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                out.push(template[start..end].parse().unwrap());
            }
            i = end.max(i + 1);
        } else {
            i += 1;
        }
    }
    out
}
