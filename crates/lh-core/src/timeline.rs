//! Timeline entity model parsed from location-history exports.
//!
//! A [`Timeline`] is one contiguous export unit (typically a single day) made
//! of [`TimelineItem`]s: stationary *visits* and moving *activities*. Items
//! are immutable after construction; all queries operate on read-only views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic coordinate as stored in the export format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Radius statistics (mean and standard deviation, meters) for a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusStats {
    pub mean: f64,
    pub sd: f64,
}

/// A named, geolocated point of interest a visit can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<RadiusStats>,
    #[serde(default)]
    pub is_home: bool,
}

/// One segment of a person's day: a stationary visit or a moving activity.
///
/// Visit-only fields (`place`, `street_address`, `manual_place`) are populated
/// only when `is_visit` is true; activity-only fields
/// (`activity_type` and its confidence/override flags) only when it is false.
/// The sensor fields at the bottom are opaque passthrough data: they are never
/// consulted by filtering, only echoed in full projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item_id: Option<String>,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_visit: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    // Visit fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<Place>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_place: Option<bool>,

    // Activity fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertain_activity_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_activity_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type_confidence_score: Option<f64>,

    // Sensor passthrough fields, not used by filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_energy_burned: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hk_step_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors_ascended: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors_descended: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<f64>,
    /// Raw location sample sequence, kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<serde_json::Value>,
}

impl TimelineItem {
    /// Duration of this item. Negative spans in malformed data clamp to zero.
    pub fn duration(&self) -> chrono::Duration {
        (self.end_date - self.start_date).max(chrono::Duration::zero())
    }

    /// Duration in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        self.duration().num_seconds()
    }

    /// Duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Name of the assigned place, if any.
    pub fn place_name(&self) -> Option<&str> {
        self.place.as_ref().map(|place| place.name.as_str())
    }

    /// Whether this item has an assigned place.
    pub fn has_place(&self) -> bool {
        self.place.is_some()
    }
}

/// Raw export shape: an object with a `timelineItems` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineExport {
    #[serde(default)]
    timeline_items: Vec<TimelineItem>,
}

/// An ordered sequence of timeline items from one export unit.
///
/// Items are kept sorted by `start_date` ascending. Route filters rely on
/// index adjacency mirroring chronological order, so the ordering invariant
/// is enforced here at construction rather than assumed from input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TimelineExport")]
pub struct Timeline {
    timeline_items: Vec<TimelineItem>,
}

impl From<TimelineExport> for Timeline {
    fn from(export: TimelineExport) -> Self {
        Self::new(export.timeline_items)
    }
}

impl Timeline {
    /// Builds a timeline, sorting items by start date.
    pub fn new(mut items: Vec<TimelineItem>) -> Self {
        items.sort_by_key(|item| item.start_date);
        Self {
            timeline_items: items,
        }
    }

    /// The items in chronological order.
    pub fn items(&self) -> &[TimelineItem] {
        &self.timeline_items
    }

    pub fn len(&self) -> usize {
        self.timeline_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline_items.is_empty()
    }

    /// Appends the items of another timeline (e.g. a partial export for the
    /// same period) and restores the ordering invariant.
    pub fn append(&mut self, other: Self) {
        self.timeline_items.extend(other.timeline_items);
        self.timeline_items.sort_by_key(|item| item.start_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, start_hour: u32) -> TimelineItem {
        TimelineItem {
            item_id: id.to_string(),
            previous_item_id: None,
            next_item_id: None,
            start_date: Utc.with_ymd_and_hms(2019, 2, 22, start_hour, 0, 0).unwrap(),
            end_date: Utc
                .with_ymd_and_hms(2019, 2, 22, start_hour, 30, 0)
                .unwrap(),
            is_visit: true,
            center: None,
            radius: None,
            altitude: None,
            place: None,
            place_id: None,
            street_address: None,
            manual_place: None,
            activity_type: None,
            uncertain_activity_type: None,
            manual_activity_type: None,
            activity_type_confidence_score: None,
            active_energy_burned: None,
            step_count: None,
            hk_step_count: None,
            floors_ascended: None,
            floors_descended: None,
            average_heart_rate: None,
            max_heart_rate: None,
            samples: None,
        }
    }

    #[test]
    fn timeline_sorts_items_on_construction() {
        let timeline = Timeline::new(vec![item("b", 12), item("a", 8), item("c", 15)]);
        let ids: Vec<_> = timeline.items().iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn append_restores_ordering() {
        let mut first = Timeline::new(vec![item("a", 8), item("c", 15)]);
        let second = Timeline::new(vec![item("b", 12)]);
        first.append(second);
        let ids: Vec<_> = first.items().iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn duration_clamps_negative_spans() {
        let mut bad = item("x", 10);
        bad.end_date = Utc.with_ymd_and_hms(2019, 2, 22, 9, 0, 0).unwrap();
        assert_eq!(bad.duration_seconds(), 0);
    }

    #[test]
    fn parses_export_visit_item() {
        let json = r#"{
            "timelineItems": [{
                "itemId": "0A1B",
                "startDate": "2019-02-22T08:00:00Z",
                "endDate": "2019-02-22T09:15:00Z",
                "isVisit": true,
                "streetAddress": "1 Main St",
                "center": {"latitude": 48.13, "longitude": 11.58},
                "place": {
                    "placeId": "p-1",
                    "name": "Home",
                    "isHome": true,
                    "center": {"latitude": 48.13, "longitude": 11.58},
                    "radius": {"mean": 25.0, "sd": 5.0}
                },
                "stepCount": 120
            }]
        }"#;
        let timeline: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(timeline.len(), 1);
        let item = &timeline.items()[0];
        assert!(item.is_visit);
        assert_eq!(item.place_name(), Some("Home"));
        assert_eq!(item.street_address.as_deref(), Some("1 Main St"));
        assert_eq!(item.duration_minutes(), 75);
        assert!(item.place.as_ref().unwrap().is_home);
    }

    #[test]
    fn parses_export_activity_item() {
        let json = r#"{
            "timelineItems": [{
                "itemId": "0A1C",
                "previousItemId": "0A1B",
                "startDate": "2019-02-22T09:15:00Z",
                "endDate": "2019-02-22T09:45:00Z",
                "isVisit": false,
                "activityType": "walking",
                "activityTypeConfidenceScore": 0.9,
                "uncertainActivityType": false
            }]
        }"#;
        let timeline: Timeline = serde_json::from_str(json).unwrap();
        let item = &timeline.items()[0];
        assert!(!item.is_visit);
        assert_eq!(item.activity_type.as_deref(), Some("walking"));
        assert!(!item.has_place());
    }

    #[test]
    fn empty_export_parses_to_empty_timeline() {
        let timeline: Timeline = serde_json::from_str("{}").unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let timeline = Timeline::new(vec![item("a", 8)]);
        let json = serde_json::to_value(&timeline).unwrap();
        let first = &json["timelineItems"][0];
        assert_eq!(first["itemId"], "a");
        assert_eq!(first["isVisit"], true);
        assert!(first.get("place").is_none());
        assert!(first.get("activityType").is_none());
    }
}
