//! QueryEngine - pagination, filtering, and synthetic ids
//!
//! ## Responsibilities
//!
//! - Derive stable per-record ids from event content
//! - Filter/sort/paginate detection-log snapshots
//! - Compute windowed statistics over a snapshot
//!
//! Everything here is a pure function over a snapshot taken by the
//! caller; the functions never touch the live log. Ids are recomputed
//! per call rather than stored, so lookup is linear in log size -
//! acceptable at the bounded capacity of 100.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::counters::round1;
use crate::models::{DetectionEvent, DetectionRecord};
use crate::taxonomy::classify;
use crate::time_windows::{parse_timestamp, Timeframe, TIMESTAMP_FORMAT};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Synthetic id for a detection, derived from timestamp, device, and
/// object count.
///
/// Two events sharing all three fields collide; accepted weakness kept
/// for compatibility with existing clients (see DESIGN.md).
pub fn detection_id(event: &DetectionEvent) -> String {
    let mut hasher = DefaultHasher::new();
    event.timestamp.hash(&mut hasher);
    event.device.hash(&mut hasher);
    event.object_count.hash(&mut hasher);
    format!("det_{}", hasher.finish())
}

/// Attach the computed id to an event.
pub fn to_record(event: DetectionEvent) -> DetectionRecord {
    let id = detection_id(&event);
    DetectionRecord { id, event }
}

/// First event in the snapshot whose computed id matches.
pub fn find_by_id(snapshot: &[DetectionEvent], id: &str) -> Option<DetectionRecord> {
    snapshot
        .iter()
        .find(|event| detection_id(event) == id)
        .cloned()
        .map(to_record)
}

/// Query parameters for the paginated detection listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// Category name, or "all" for no constraint.
    pub category: Option<String>,
    /// Case-insensitive device substring.
    pub device: Option<String>,
    /// Case-insensitive substring over file name, device, and timestamp.
    pub search: Option<String>,
}

/// One page of the filtered, newest-first detection listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionPage {
    pub content: Vec<DetectionRecord>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub current_page: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

fn matches_category(event: &DetectionEvent, category: &str) -> bool {
    if event.objects.is_empty() {
        return false;
    }
    event
        .objects
        .iter()
        .any(|object| classify(&object.label).as_str().eq_ignore_ascii_case(category))
}

fn matches_search(event: &DetectionEvent, needle_lower: &str) -> bool {
    event
        .file_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle_lower))
        || event.device.to_lowercase().contains(needle_lower)
        || event.timestamp.to_lowercase().contains(needle_lower)
}

/// Filter, sort, and paginate a detection-log snapshot.
///
/// Filters compose with logical AND. Pagination input is clamped, never
/// rejected: non-positive sizes fall back to the default, sizes above
/// 100 are capped, negative pages become 0, and out-of-range pages
/// yield an empty content slice.
pub fn query_page(snapshot: Vec<DetectionEvent>, query: &DetectionQuery) -> DetectionPage {
    let page = query.page.unwrap_or(0).max(0);
    let page_size = match query.size.unwrap_or(DEFAULT_PAGE_SIZE) {
        size if size <= 0 => DEFAULT_PAGE_SIZE,
        size => size.min(MAX_PAGE_SIZE),
    };

    let category = query
        .category
        .as_deref()
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
        .map(str::to_lowercase);
    let device = query
        .device
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);
    let search = query
        .search
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<DetectionRecord> = snapshot
        .into_iter()
        .filter(|event| {
            if let Some(category) = &category {
                if !matches_category(event, category) {
                    return false;
                }
            }
            if let Some(device) = &device {
                if !event.device.to_lowercase().contains(device) {
                    return false;
                }
            }
            if let Some(search) = &search {
                if !matches_search(event, search) {
                    return false;
                }
            }
            true
        })
        .map(to_record)
        .collect();

    // Newest first; the fixed-width timestamp format makes the string
    // compare chronological.
    filtered.sort_by(|a, b| b.event.timestamp.cmp(&a.event.timestamp));

    let total_elements = filtered.len();
    let total_pages = (total_elements + page_size as usize - 1) / page_size as usize;
    let start = (page as usize).saturating_mul(page_size as usize).min(total_elements);
    let end = start.saturating_add(page_size as usize).min(total_elements);
    let content = filtered[start..end].to_vec();

    DetectionPage {
        content,
        total_elements,
        total_pages,
        current_page: page,
        page_size,
        has_next: (page as usize) + 1 < total_pages,
        has_previous: page > 0 && total_pages > 0,
    }
}

/// Windowed statistics over a detection-log snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionStatistics {
    pub timeframe: String,
    pub total_detections: usize,
    pub total_objects: usize,
    pub average_objects_per_detection: f64,
    /// Mean confidence as a percentage, one decimal.
    pub average_confidence: f64,
    pub average_processing_time: u64,
    pub category_breakdown: HashMap<String, u64>,
    pub device_breakdown: HashMap<String, u64>,
    pub start_time: String,
    pub end_time: String,
}

/// Compute statistics over events newer than the timeframe cutoff.
///
/// Events with unparseable timestamps are excluded from the window
/// rather than surfaced as errors.
pub fn statistics(
    snapshot: &[DetectionEvent],
    timeframe: Timeframe,
    now: NaiveDateTime,
) -> DetectionStatistics {
    let start_time = timeframe.cutoff(now);

    let filtered: Vec<&DetectionEvent> = snapshot
        .iter()
        .filter(|event| matches!(parse_timestamp(&event.timestamp), Some(at) if at > start_time))
        .collect();

    let total_detections = filtered.len();
    let mut total_objects = 0usize;
    let mut total_confidence = 0.0f64;
    let mut object_count = 0usize;
    let mut total_processing_time = 0u64;
    let mut category_breakdown: HashMap<String, u64> = HashMap::new();
    let mut device_breakdown: HashMap<String, u64> = HashMap::new();

    for event in &filtered {
        total_objects += event.objects.len();
        for object in &event.objects {
            total_confidence += object.confidence;
            object_count += 1;

            let category = classify(&object.label);
            *category_breakdown
                .entry(category.as_str().to_string())
                .or_insert(0) += 1;
        }

        total_processing_time += event.processing_time_ms;
        *device_breakdown.entry(event.device.clone()).or_insert(0) += 1;
    }

    DetectionStatistics {
        timeframe: timeframe.as_str().to_string(),
        total_detections,
        total_objects,
        average_objects_per_detection: if total_detections > 0 {
            round1(total_objects as f64 / total_detections as f64)
        } else {
            0.0
        },
        average_confidence: if object_count > 0 {
            round1(total_confidence / object_count as f64 * 100.0)
        } else {
            0.0
        },
        average_processing_time: if total_detections > 0 {
            total_processing_time / total_detections as u64
        } else {
            0
        },
        category_breakdown,
        device_breakdown,
        start_time: start_time.format(TIMESTAMP_FORMAT).to_string(),
        end_time: now.format(TIMESTAMP_FORMAT).to_string(),
    }
}
