//! Multi-timeline aggregation.
//!
//! Fans a query out across all loaded timelines (a rayon map — filtering has
//! no cross-timeline data dependency), then flattens in caller-supplied
//! timeline order and applies the per-kind post-processing: stable
//! deduplication for the name listings, global pagination for the full
//! listing.

use std::collections::HashSet;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::classify::PlaceResolver;
use crate::filter::{FilterSpec, RawQuery};
use crate::query::{self, TimestampEntry, UnassignedVisit};
use crate::timeline::Timeline;

/// The five query kinds exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Places,
    UnassignedVisits,
    ActivityTypes,
    Timestamps,
    Items,
}

impl QueryKind {
    /// Human-readable description used in response envelopes.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Places => "List of visited places",
            Self::UnassignedVisits => "Visits without an assigned place",
            Self::ActivityTypes => "List of activity types",
            Self::Timestamps => "Start timestamps with durations",
            Self::Items => "Timeline items",
        }
    }
}

impl FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "places" => Ok(Self::Places),
            "unassigned-visits" => Ok(Self::UnassignedVisits),
            "activity-types" => Ok(Self::ActivityTypes),
            "timestamps" => Ok(Self::Timestamps),
            "items" => Ok(Self::Items),
            _ => Err(format!("unknown query kind: {s}")),
        }
    }
}

/// Result of a query, shaped per kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Names(Vec<String>),
    Visits(Vec<UnassignedVisit>),
    Timestamps(Vec<TimestampEntry>),
    Items(Vec<Value>),
}

/// Distinct place names across all timelines, first-occurrence order.
pub fn list_places(timelines: &[Timeline], spec: &FilterSpec) -> Vec<String> {
    let per_timeline: Vec<Vec<String>> = timelines
        .par_iter()
        .map(|timeline| query::list_places(timeline, spec))
        .collect();
    dedup_first_occurrence(per_timeline.into_iter().flatten())
}

/// Unassigned visits across all timelines, duplicates allowed.
pub fn visits_without_place(timelines: &[Timeline], spec: &FilterSpec) -> Vec<UnassignedVisit> {
    timelines
        .par_iter()
        .map(|timeline| query::visits_without_place(timeline, spec))
        .filter(|visits| !visits.is_empty())
        .flatten()
        .collect()
}

/// Distinct activity types across all timelines, first-occurrence order.
pub fn list_activity_types(timelines: &[Timeline], spec: &FilterSpec) -> Vec<String> {
    let per_timeline: Vec<Vec<String>> = timelines
        .par_iter()
        .map(|timeline| query::list_activity_types(timeline, spec))
        .collect();
    dedup_first_occurrence(per_timeline.into_iter().flatten())
}

/// Timestamp/duration pairs across all timelines. No dedup, no pagination.
pub fn list_timestamps(timelines: &[Timeline], spec: &FilterSpec) -> Vec<TimestampEntry> {
    timelines
        .par_iter()
        .flat_map(|timeline| query::list_timestamps(timeline, spec))
        .collect()
}

/// Projected items across all timelines with pagination applied to the
/// concatenated result, never per timeline.
pub fn list_timeline_items(timelines: &[Timeline], spec: &FilterSpec) -> Vec<Value> {
    let concatenated: Vec<Value> = timelines
        .par_iter()
        .flat_map(|timeline| query::list_timeline_items(timeline, spec))
        .collect();
    paginate(concatenated, spec.offset, spec.limit)
}

/// Builds one spec from the raw query (classification resolved once) and
/// dispatches to the matching operation.
pub fn run_query(
    timelines: &[Timeline],
    kind: QueryKind,
    raw: &RawQuery,
    resolver: &dyn PlaceResolver,
) -> Result<QueryOutput, crate::filter::FilterError> {
    let spec = FilterSpec::build(raw, resolver)?;
    tracing::debug!(?kind, timelines = timelines.len(), "running query");
    Ok(match kind {
        QueryKind::Places => QueryOutput::Names(list_places(timelines, &spec)),
        QueryKind::UnassignedVisits => QueryOutput::Visits(visits_without_place(timelines, &spec)),
        QueryKind::ActivityTypes => QueryOutput::Names(list_activity_types(timelines, &spec)),
        QueryKind::Timestamps => QueryOutput::Timestamps(list_timestamps(timelines, &spec)),
        QueryKind::Items => QueryOutput::Items(list_timeline_items(timelines, &spec)),
    })
}

fn dedup_first_occurrence(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(name.clone())).collect()
}

fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    let skipped = items.into_iter().skip(offset);
    match limit {
        Some(limit) => skipped.take(limit).collect(),
        None => skipped.collect(),
    }
}
