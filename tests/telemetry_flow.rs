//! End-to-end tests for the telemetry core, driven through the
//! TelemetryService facade the way the web layer drives it.

use odp_telemetry::models::{BoundingBox, DetectedObject};
use odp_telemetry::query::DetectionQuery;
use odp_telemetry::telemetry::TelemetryService;
use odp_telemetry::time_windows::Timeframe;

fn object(label: &str, confidence: f64) -> DetectedObject {
    DetectedObject {
        label: label.to_string(),
        confidence,
        bounding_box: BoundingBox {
            x_min: 12.0,
            y_min: 8.0,
            x_max: 240.0,
            y_max: 180.0,
        },
    }
}

async fn record(telemetry: &TelemetryService, device: &str, labels: &[&str], time_ms: u64) {
    let objects = labels.iter().map(|label| object(label, 0.9)).collect();
    telemetry
        .record_detection(
            objects,
            time_ms,
            Some(device.to_string()),
            Some(format!("https://cdn.example.com/{}.jpg", device)),
            Some(format!("{}.jpg", device)),
        )
        .await;
}

#[tokio::test]
async fn history_is_bounded_at_capacity() {
    let telemetry = TelemetryService::new(100);
    for i in 0..150 {
        record(&telemetry, &format!("device-{:03}", i), &["cup"], 100).await;
    }

    assert_eq!(telemetry.detections_stored().await, 100);

    // Only the last 100 remain; newest first.
    let recent = telemetry.recent_detections(100).await;
    assert_eq!(recent.len(), 100);
    assert_eq!(recent.first().unwrap().device, "device-149");
    assert_eq!(recent.last().unwrap().device, "device-050");

    // Counters are untouched by eviction.
    assert_eq!(telemetry.dashboard_metrics().api_calls, 150);
}

#[tokio::test]
async fn recent_limit_edge_cases() {
    let telemetry = TelemetryService::new(100);
    record(&telemetry, "iPhone", &["cup"], 100).await;
    record(&telemetry, "Android", &["cup"], 100).await;

    assert!(telemetry.recent_detections(0).await.is_empty());

    let all = telemetry.recent_detections(500).await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].device, "Android");
}

#[tokio::test]
async fn device_distribution_end_to_end() {
    let telemetry = TelemetryService::new(100);
    for device in ["iPhone", "iPhone", "Android"] {
        record(&telemetry, device, &["person"], 150).await;
    }

    let analytics = telemetry.analytics(Timeframe::Day).await;
    let distribution = analytics.device_distribution;
    assert_eq!(distribution.labels, vec!["iPhone", "Android"]);
    assert_eq!(distribution.data, vec![2, 1]);
}

#[tokio::test]
async fn cold_start_category_defaults() {
    let telemetry = TelemetryService::new(100);
    let categories = telemetry.detection_categories().await;
    assert_eq!(
        categories.labels,
        vec!["People", "Vehicles", "Animals", "Objects"]
    );
    assert_eq!(categories.data, vec![42, 23, 15, 20]);
}

#[tokio::test]
async fn paginated_listing_with_filters() {
    let telemetry = TelemetryService::new(100);
    record(&telemetry, "iPhone 15 Pro", &["car", "person"], 120).await;
    record(&telemetry, "Samsung Galaxy", &["dog"], 90).await;
    record(&telemetry, "iPhone SE", &["bus"], 200).await;

    // Category + device filters compose with AND.
    let page = telemetry
        .all_detections(&DetectionQuery {
            category: Some("vehicles".to_string()),
            device: Some("iphone".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(page.total_elements, 2);
    assert!(page
        .content
        .iter()
        .all(|record| record.event.device.to_lowercase().contains("iphone")));

    // Search over file names narrows further.
    let searched = telemetry
        .all_detections(&DetectionQuery {
            category: Some("vehicles".to_string()),
            search: Some("iphone se.jpg".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(searched.total_elements, 1);
    assert_eq!(searched.content[0].event.device, "iPhone SE");

    // Every listed record carries a synthetic id.
    assert!(searched.content[0].id.starts_with("det_"));
}

#[tokio::test]
async fn lookup_and_delete_round_trip() {
    let telemetry = TelemetryService::new(100);
    record(&telemetry, "iPhone", &["person"], 100).await;
    record(&telemetry, "Android", &["cat"], 100).await;

    let page = telemetry.all_detections(&DetectionQuery::default()).await;
    assert_eq!(page.total_elements, 2);
    let id = page.content[1].id.clone();

    let fetched = telemetry.detection_by_id(&id).await.expect("record exists");
    assert_eq!(fetched.id, id);

    assert!(telemetry.delete_detection(&id, Some("integration-test")).await);
    assert!(telemetry.detection_by_id(&id).await.is_none());
    assert!(!telemetry.delete_detection(&id, Some("integration-test")).await);

    // The other record is untouched.
    assert_eq!(telemetry.detections_stored().await, 1);
}

#[tokio::test]
async fn statistics_and_charts_reflect_ingestion() {
    let telemetry = TelemetryService::new(100);
    record(&telemetry, "iPhone", &["car"], 300).await;
    record(&telemetry, "iPhone", &["person", "dog"], 100).await;
    telemetry.record_error("upstream timeout", "DETECTION_ERROR").await;

    let stats = telemetry.detection_statistics(Timeframe::Day).await;
    assert_eq!(stats.total_detections, 2);
    assert_eq!(stats.total_objects, 3);
    assert_eq!(stats.average_objects_per_detection, 1.5);
    assert_eq!(stats.average_processing_time, 200);
    assert_eq!(stats.category_breakdown.get("vehicles"), Some(&1));
    assert_eq!(stats.category_breakdown.get("people"), Some(&1));
    assert_eq!(stats.category_breakdown.get("animals"), Some(&1));
    assert_eq!(stats.device_breakdown.get("iPhone"), Some(&2));

    let chart = telemetry.chart_data(Timeframe::Day).await;
    assert_eq!(chart.labels.len(), 9);
    assert_eq!(chart.data.iter().sum::<u64>(), 2);

    let metrics = telemetry.dashboard_metrics();
    assert_eq!(metrics.api_calls, 2);
    assert_eq!(metrics.response_time, 200);
    assert_eq!(metrics.error_rate, 50.0);

    let errors = telemetry.error_logs(10).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, "DETECTION_ERROR");
}
