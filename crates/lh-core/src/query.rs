//! Single-timeline query engine.
//!
//! [`filter_items`] evaluates a [`FilterSpec`] against one timeline's ordered
//! item sequence; the five query operations build their result shapes on top
//! of it. Everything here is a read-only view over the timeline — no clause
//! ever mutates an item, and overrides derive a fresh spec copy.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::filter::{FilterSpec, ItemKind};
use crate::geo;
use crate::timeline::{Timeline, TimelineItem};

/// Applies `spec` to the timeline, preserving sequence order.
///
/// Clauses are conjunctive and short-circuit on the first failure. Route
/// clauses look at the neighboring items in the same sequence; at the
/// sequence boundary they pass vacuously.
pub fn filter_items<'a>(timeline: &'a Timeline, spec: &FilterSpec) -> Vec<&'a TimelineItem> {
    let items = timeline.items();
    items
        .iter()
        .enumerate()
        .filter(|(index, item)| item_matches(items, *index, item, spec))
        .map(|(_, item)| item)
        .collect()
}

#[allow(clippy::too_many_lines)]
fn item_matches(items: &[TimelineItem], index: usize, item: &TimelineItem, spec: &FilterSpec) -> bool {
    // 1. Item type
    if !spec.item_types.is_empty() {
        let kind = if item.is_visit {
            ItemKind::Visit
        } else {
            ItemKind::Activity
        };
        if !spec.item_types.contains(&kind) {
            return false;
        }
    }

    // 2. Weekday: enabled on the start day OR the end day, so an item
    // spanning midnight passes if either endpoint's weekday is selected.
    if let Some(mask) = &spec.weekday_mask {
        let start_enabled = mask[weekday_index(item.start_date)];
        let end_enabled = mask[weekday_index(item.end_date)];
        if !start_enabled && !end_enabled {
            return false;
        }
    }

    // 3. Date window: an item straddling a bound passes it.
    if let Some(from) = spec.date_from {
        if item.start_date < from && item.end_date < from {
            return false;
        }
    }
    if let Some(to) = spec.date_to {
        if item.start_date > to && item.end_date > to {
            return false;
        }
    }

    // 4. Activity type; items without one fail when the clause is active.
    if !spec.activity_types.is_empty() {
        match &item.activity_type {
            Some(activity) if spec.activity_types.contains(activity) => {}
            _ => return false,
        }
    }

    // 5. Duration bounds
    let minutes = item.duration_minutes();
    if spec
        .duration_from_minutes
        .is_some_and(|min| minutes < min)
    {
        return false;
    }
    if spec.duration_to_minutes.is_some_and(|max| minutes > max) {
        return false;
    }

    // 6. Place allow-list
    if !spec.place_names.is_empty() {
        match item.place_name() {
            Some(name) if spec.place_names.contains(name) => {}
            _ => return false,
        }
    }

    // 7. Unassigned only
    if spec.place_unassigned && item.has_place() {
        return false;
    }

    // 8. Route-from: the immediately preceding item must carry an allowed
    // place; with no preceding item the clause passes vacuously.
    if !spec.route_from_names.is_empty() {
        if let Some(previous) = index.checked_sub(1).map(|i| &items[i]) {
            match previous.place_name() {
                Some(name) if spec.route_from_names.contains(name) => {}
                _ => return false,
            }
        }
    }

    // 9. Route-to, symmetric with the following item.
    if !spec.route_to_names.is_empty() {
        if let Some(next) = items.get(index + 1) {
            match next.place_name() {
                Some(name) if spec.route_to_names.contains(name) => {}
                _ => return false,
            }
        }
    }

    true
}

fn weekday_index(instant: DateTime<Utc>) -> usize {
    instant.weekday().num_days_from_sunday() as usize
}

/// Distinct place names of surviving visits, first-occurrence order.
///
/// Forces the item-type clause to visits.
pub fn list_places(timeline: &Timeline, spec: &FilterSpec) -> Vec<String> {
    let scoped = spec.clone().with_item_types([ItemKind::Visit]);
    let mut seen = HashSet::new();
    filter_items(timeline, &scoped)
        .into_iter()
        .filter_map(TimelineItem::place_name)
        .filter(|name| seen.insert(name.to_string()))
        .map(ToString::to_string)
        .collect()
}

/// Projection of a visit that has no assigned place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedVisit {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
}

/// Surviving visits without an assigned place, in sequence order.
///
/// Forces the item-type clause to visits and the unassigned-only clause on.
pub fn visits_without_place(timeline: &Timeline, spec: &FilterSpec) -> Vec<UnassignedVisit> {
    let scoped = spec
        .clone()
        .with_item_types([ItemKind::Visit])
        .with_unassigned_only();
    filter_items(timeline, &scoped)
        .into_iter()
        .map(|item| UnassignedVisit {
            start_date: item.start_date,
            end_date: item.end_date,
            street_address: item.street_address.clone(),
        })
        .collect()
}

/// Activity types of surviving items that carry one, duplicates included.
///
/// Cross-timeline deduplication happens at the aggregation step.
pub fn list_activity_types(timeline: &Timeline, spec: &FilterSpec) -> Vec<String> {
    filter_items(timeline, spec)
        .into_iter()
        .filter_map(|item| item.activity_type.clone())
        .collect()
}

/// Start timestamp plus duration for one surviving item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimestampEntry {
    /// Item start as epoch seconds.
    pub timestamp: i64,
    /// Item duration in seconds.
    pub keyfigure: i64,
}

/// Start/duration pairs for every surviving item.
pub fn list_timestamps(timeline: &Timeline, spec: &FilterSpec) -> Vec<TimestampEntry> {
    filter_items(timeline, spec)
        .into_iter()
        .map(|item| TimestampEntry {
            timestamp: item.start_date.timestamp(),
            keyfigure: item.duration_seconds(),
        })
        .collect()
}

/// Full listing with field projection.
///
/// With an empty `fields` list every stored attribute is returned plus the
/// computed `duration` (seconds), `distance` and `bearing` (item center to
/// assigned-place center). With explicit fields, each name is looked up among
/// the computed fields first (`duration`, `durationHuman`, `distance`,
/// `bearing`), then the stored attributes; names that resolve to nothing are
/// omitted from that item's record rather than failing the query.
pub fn list_timeline_items(timeline: &Timeline, spec: &FilterSpec) -> Vec<Value> {
    filter_items(timeline, spec)
        .into_iter()
        .map(|item| project_item(item, &spec.fields))
        .collect()
}

/// Computed projection fields, resolved by name before stored attributes.
const COMPUTED_FIELDS: [&str; 4] = ["duration", "durationHuman", "distance", "bearing"];

fn computed_field(item: &TimelineItem, name: &str) -> Option<Value> {
    let place_center = item
        .place
        .as_ref()
        .and_then(|place| place.center.as_ref());
    match name {
        "duration" => Some(Value::from(item.duration_seconds())),
        "durationHuman" => Some(Value::from(geo::format_duration(item.duration()))),
        "distance" => geo::distance_between(item.center.as_ref(), place_center).map(Value::from),
        "bearing" => geo::bearing_between(item.center.as_ref(), place_center).map(Value::from),
        _ => None,
    }
}

fn project_item(item: &TimelineItem, fields: &[String]) -> Value {
    let stored = match serde_json::to_value(item) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let mut record = Map::new();
    if fields.is_empty() {
        record = stored;
        for name in ["duration", "distance", "bearing"] {
            if let Some(value) = computed_field(item, name) {
                record.insert(name.to_string(), value);
            }
        }
    } else {
        for name in fields {
            let value = if COMPUTED_FIELDS.contains(&name.as_str()) {
                computed_field(item, name)
            } else {
                stored.get(name).cloned()
            };
            if let Some(value) = value {
                record.insert(name.clone(), value);
            }
        }
    }
    Value::Object(record)
}
