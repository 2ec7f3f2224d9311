//! Query filter parsing and normalization.
//!
//! [`FilterSpec::build`] turns a loosely-typed key/value map (as delivered by
//! URL query parameters) into a validated, immutable filter description.
//! Malformed input is rejected with the offending field named; the permissive
//! silent-defaulting of earlier revisions of this API is gone on purpose.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::classify::PlaceResolver;

/// Validation failure for a single filter field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

impl FilterError {
    fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
        }
    }

    /// The field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Invalid { field, .. } => field,
        }
    }
}

/// The two kinds of timeline items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Visit,
    Activity,
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visit" | "visits" => Ok(Self::Visit),
            "activity" | "activities" => Ok(Self::Activity),
            _ => Err(format!("unknown item type: {s}")),
        }
    }
}

/// A raw query value: a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

/// The loosely-typed query map handed to the filter builder.
///
/// Values arrive either as native lists or as comma-separated strings; both
/// normalize to the same list form. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawQuery(HashMap<String, RawValue>);

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single-string value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), RawValue::One(value.into()));
    }

    /// Sets a list value for `key`.
    pub fn set_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), RawValue::Many(values));
    }

    fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// First scalar value for `key`, if present.
    fn scalar(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            RawValue::One(value) => Some(value.as_str()),
            RawValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// All values for `key`, with comma-separated strings split and
    /// whitespace trimmed. Empty when the key is absent.
    fn list(&self, key: &str) -> Vec<String> {
        let values: &[String] = match self.0.get(key) {
            Some(RawValue::One(value)) => std::slice::from_ref(value),
            Some(RawValue::Many(values)) => values,
            None => return Vec::new(),
        };
        values
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl From<HashMap<String, String>> for RawQuery {
    fn from(map: HashMap<String, String>) -> Self {
        Self(
            map.into_iter()
                .map(|(key, value)| (key, RawValue::One(value)))
                .collect(),
        )
    }
}

/// Normalized, immutable query description consumed by the query engine.
///
/// All fields default to "no restriction". Built once per request; the query
/// operations that need to force a clause derive a modified copy via the
/// `with_*` methods instead of mutating a shared value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Allowed item kinds; empty means both.
    pub item_types: HashSet<ItemKind>,
    /// Enabled weekdays, indexed 0 = Sunday .. 6 = Saturday.
    pub weekday_mask: Option<[bool; 7]>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Allowed activity type strings; empty means no restriction.
    pub activity_types: HashSet<String>,
    /// Minimum item duration in minutes. Zero is never stored (it means
    /// "not set" in the query language).
    pub duration_from_minutes: Option<i64>,
    /// Maximum item duration in minutes, same zero rule.
    pub duration_to_minutes: Option<i64>,
    /// Allowed assigned-place names; empty means no restriction.
    pub place_names: HashSet<String>,
    /// Only items without an assigned place.
    pub place_unassigned: bool,
    /// Required place names on the immediately preceding item.
    pub route_from_names: HashSet<String>,
    /// Required place names on the immediately following item.
    pub route_to_names: HashSet<String>,
    /// Projection field names for the full-listing query; empty lets the
    /// query kind pick its default shape.
    pub fields: Vec<String>,
    /// Maximum number of items after concatenation; `None` = unlimited.
    pub limit: Option<usize>,
    /// Items to skip after concatenation.
    pub offset: usize,
}

/// Weekday codes in mask order (Sunday first).
const WEEKDAY_CODES: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

impl FilterSpec {
    /// Parses and validates a raw query map.
    ///
    /// `placeClass`-style inputs are resolved through `resolver` exactly once
    /// here, so the spec can be reused across any number of timelines without
    /// further lookups. The presence of `placeUnassigned` enables the
    /// unassigned-only clause regardless of its value ("false" included),
    /// matching the query language this API has always spoken.
    pub fn build(raw: &RawQuery, resolver: &dyn PlaceResolver) -> Result<Self, FilterError> {
        let mut spec = Self::default();

        for value in raw.list("type") {
            let kind = value
                .parse::<ItemKind>()
                .map_err(|_| FilterError::invalid("type", value.as_str()))?;
            spec.item_types.insert(kind);
        }

        spec.weekday_mask = parse_weekday_mask(&raw.list("weekday"))?;
        spec.date_from = parse_instant(raw.scalar("from"), "from")?;
        spec.date_to = parse_instant(raw.scalar("to"), "to")?;

        spec.activity_types = raw.list("activityType").into_iter().collect();

        spec.duration_from_minutes = parse_minutes(raw.scalar("duration_from"), "duration_from")?;
        spec.duration_to_minutes = parse_minutes(raw.scalar("duration_to"), "duration_to")?;

        spec.place_names = place_set(raw, "place", "placeClass", resolver);
        spec.place_unassigned = raw.has("placeUnassigned");
        spec.route_from_names = place_set(raw, "placeFrom", "placeFromClass", resolver);
        spec.route_to_names = place_set(raw, "placeTo", "placeToClass", resolver);

        spec.fields = raw.list("fields");

        spec.limit = parse_count(raw.scalar("limit"), "limit")?.filter(|&limit| limit > 0);
        spec.offset = parse_count(raw.scalar("offset"), "offset")?.unwrap_or(0);
        // page is defined in terms of limit; without one it has no meaning
        match (parse_count(raw.scalar("page"), "page")?, spec.limit) {
            (Some(page), Some(limit)) if page > 0 => spec.offset = limit * (page - 1),
            _ => {}
        }

        Ok(spec)
    }

    /// Copy of this spec restricted to the given item kinds.
    #[must_use]
    pub fn with_item_types(mut self, kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        self.item_types = kinds.into_iter().collect();
        self
    }

    /// Copy of this spec that only keeps items without an assigned place.
    #[must_use]
    pub fn with_unassigned_only(mut self) -> Self {
        self.place_unassigned = true;
        self
    }
}

fn parse_weekday_mask(codes: &[String]) -> Result<Option<[bool; 7]>, FilterError> {
    if codes.is_empty() {
        return Ok(None);
    }
    let mut mask = [false; 7];
    for code in codes {
        let index = WEEKDAY_CODES
            .iter()
            .position(|known| *known == code.as_str())
            .ok_or_else(|| FilterError::invalid("weekday", code.as_str()))?;
        mask[index] = true;
    }
    Ok(Some(mask))
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
fn parse_instant(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, FilterError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| FilterError::invalid(field, value))
}

/// Integer minutes; zero means "not set" and is folded into `None`.
fn parse_minutes(value: Option<&str>, field: &'static str) -> Result<Option<i64>, FilterError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let minutes = value
        .parse::<i64>()
        .map_err(|_| FilterError::invalid(field, value))?;
    if minutes < 0 {
        return Err(FilterError::invalid(field, value));
    }
    Ok((minutes != 0).then_some(minutes))
}

fn parse_count(value: Option<&str>, field: &'static str) -> Result<Option<usize>, FilterError> {
    value
        .map(|value| {
            value
                .parse::<usize>()
                .map_err(|_| FilterError::invalid(field, value))
        })
        .transpose()
}

/// Union of direct names and classification-resolved names.
fn place_set(
    raw: &RawQuery,
    name_key: &str,
    class_key: &str,
    resolver: &dyn PlaceResolver,
) -> HashSet<String> {
    let mut names: HashSet<String> = raw.list(name_key).into_iter().collect();
    for category in raw.list(class_key) {
        names.extend(resolver.resolve(&category));
    }
    names
}
