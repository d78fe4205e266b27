//! Per-user dashboard figures derived from stored detections.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::constants::RECENT_SCANS_DAYS;
use crate::db::prelude::{UserAnalytics, WasteDetection};

pub mod achievements;
pub mod activity;
pub mod advice;
pub mod impact;

use activity::{MonthlyComparison, WeeklyStats};
use impact::EnvironmentalImpact;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_scans: i64,
    pub recent_scans: i64,
    pub recycling_score: f64,
    pub environmental_impact: EnvironmentalImpact,
    pub weekly_stats: WeeklyStats,
    pub achievements: Vec<String>,
    pub monthly_comparison: MonthlyComparison,
}

impl Dashboard {
    /// `total_scans` comes from the analytics counters; the badge thresholds count stored
    /// detections instead.
    pub fn compile(
        analytics: &UserAnalytics,
        detections: &[WasteDetection],
        feedback_count: i64,
        now: NaiveDateTime,
    ) -> Self {
        let timestamps: Vec<NaiveDateTime> = detections.iter().map(|d| d.created_at).collect();

        Self {
            total_scans: analytics.total_scans,
            recent_scans: activity::count_since(
                &timestamps,
                now - Duration::days(RECENT_SCANS_DAYS),
            ),
            recycling_score: analytics.recycling_score,
            environmental_impact: total_impact(detections),
            weekly_stats: WeeklyStats::compute(&timestamps, now),
            achievements: achievements::achievements(
                detections.len() as i64,
                analytics.recycling_score,
                feedback_count,
            ),
            monthly_comparison: MonthlyComparison::compute(&timestamps, now),
        }
    }
}

pub fn total_impact(detections: &[WasteDetection]) -> EnvironmentalImpact {
    EnvironmentalImpact::tally(detections.iter().flat_map(|d| d.detected_items.0.iter()))
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use sqlx::types::Json;

    use super::*;
    use crate::db::models::detection::{BinType, DetectedItem};
    use crate::db::prelude::UserId;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn detection(id: i64, created_at: &str, items: Vec<DetectedItem>) -> WasteDetection {
        WasteDetection {
            id,
            user_id: UserId(1),
            image_path: format!("uploads/detection_1_{id}.jpg"),
            detected_items: Json(items),
            confidence_scores: Json(BTreeMap::new()),
            disposal_recommendations: Json(Vec::new()),
            location_lat: None,
            location_lng: None,
            created_at: at(created_at),
        }
    }

    fn analytics(total_scans: i64, recycling_score: f64) -> UserAnalytics {
        UserAnalytics {
            id: 1,
            user_id: UserId(1),
            total_scans,
            total_items_detected: 0,
            recycling_score,
            points_earned: 0,
            created_at: at("2025-01-01 00:00:00"),
            updated_at: at("2025-01-01 00:00:00"),
        }
    }

    #[test]
    fn test_dashboard_compile() {
        let bottle = DetectedItem {
            item: String::from("Plastic Bottle"),
            confidence: 0.9,
            disposal_method: String::from("Recycling"),
            bin_type: BinType::Recycling,
        };
        let detections = vec![
            detection(2, "2025-03-14 10:00:00", vec![bottle.clone(), DetectedItem::unknown()]),
            detection(1, "2024-12-01 10:00:00", vec![bottle]),
        ];

        let dashboard = Dashboard::compile(
            &analytics(7, 120.0),
            &detections,
            1,
            at("2025-03-15 12:00:00"),
        );

        assert_eq!(dashboard.total_scans, 7);
        assert_eq!(dashboard.recent_scans, 1);
        assert_eq!(dashboard.environmental_impact.total_recycled, 2);
        assert_eq!(dashboard.environmental_impact.plastic_items, 2);
        assert_eq!(dashboard.weekly_stats.total_weekly_scans, 1);
        assert_eq!(
            dashboard.achievements,
            vec!["First Scan", "Recycling Hero", "Community Contributor"]
        );
        assert_eq!(dashboard.monthly_comparison.current_month, 1);
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = Dashboard::compile(&analytics(0, 0.0), &[], 0, at("2025-03-15 12:00:00"));

        assert_eq!(dashboard.recent_scans, 0);
        assert_eq!(dashboard.environmental_impact, EnvironmentalImpact::default());
        assert!(dashboard.achievements.is_empty());

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["monthly_comparison"]["trend"], "stable");
        assert_eq!(json["weekly_stats"]["daily_breakdown"]["2025-03-15"], 0);
    }
}
