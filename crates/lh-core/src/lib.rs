//! Core engine for the location-history analyzer.
//!
//! This crate contains the fundamental types and logic for:
//! - Timeline model: parsed visits and activities from export files
//! - Filtering: raw query maps normalized into validated filter specs
//! - Queries: the five analysis operations over one or many timelines
//! - Geo/duration helpers used by the projection step

pub mod aggregate;
pub mod classify;
pub mod filter;
pub mod geo;
pub mod query;
pub mod timeline;

pub use aggregate::{QueryKind, QueryOutput, run_query};
pub use classify::{NoClassification, PlaceResolver};
pub use filter::{FilterError, FilterSpec, ItemKind, RawQuery};
pub use query::{TimestampEntry, UnassignedVisit, filter_items};
pub use timeline::{GeoPoint, Place, Timeline, TimelineItem};
