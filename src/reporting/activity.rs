//! Scan activity over calendar windows, computed from detection timestamps.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::constants::WEEKLY_BREAKDOWN_DAYS;

pub fn count_since(timestamps: &[NaiveDateTime], since: NaiveDateTime) -> i64 {
    timestamps.iter().filter(|ts| **ts >= since).count() as i64
}

fn count_between(timestamps: &[NaiveDateTime], start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    timestamps
        .iter()
        .filter(|ts| **ts >= start && **ts < end)
        .count() as i64
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub total_weekly_scans: i64,
    /// Scans per calendar day, keyed `YYYY-MM-DD`, for today and the six days before.
    pub daily_breakdown: BTreeMap<String, i64>,
    pub average_daily: f64,
}

impl WeeklyStats {
    /// The weekly total is a rolling seven-day window ending at `now`, while the breakdown
    /// buckets by calendar day, so the two may disagree for scans early on the oldest day.
    pub fn compute(timestamps: &[NaiveDateTime], now: NaiveDateTime) -> Self {
        let total_weekly_scans =
            count_since(timestamps, now - Duration::days(WEEKLY_BREAKDOWN_DAYS));

        let daily_breakdown = (0..WEEKLY_BREAKDOWN_DAYS)
            .map(|offset| {
                let day = now.date() - Duration::days(offset);
                let start = start_of_day(day);
                let count = count_between(timestamps, start, start + Duration::days(1));
                (day.format("%Y-%m-%d").to_string(), count)
            })
            .collect();

        Self {
            total_weekly_scans,
            daily_breakdown,
            average_daily: total_weekly_scans as f64 / WEEKLY_BREAKDOWN_DAYS as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyComparison {
    pub current_month: i64,
    pub last_month: i64,
    pub change_percentage: f64,
    pub trend: Trend,
}

impl MonthlyComparison {
    pub fn compute(timestamps: &[NaiveDateTime], now: NaiveDateTime) -> Self {
        let current_start = first_of_month(now.date());
        let last_start = first_of_month(current_start - Duration::days(1));

        let current_month = count_since(timestamps, start_of_day(current_start));
        let last_month = count_between(
            timestamps,
            start_of_day(last_start),
            start_of_day(current_start),
        );

        // no baseline last month reads as no change
        let change = if last_month > 0 {
            (current_month - last_month) as f64 / last_month as f64 * 100.0
        } else {
            0.0
        };
        let change_percentage = (change * 100.0).round() / 100.0;

        let trend = if change_percentage > 0.0 {
            Trend::Up
        } else if change_percentage < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        };

        Self {
            current_month,
            last_month,
            change_percentage,
            trend,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_weekly_breakdown_covers_seven_calendar_days() {
        let now = at("2025-03-10 09:00:00");
        let scans = vec![
            at("2025-03-10 08:59:00"),
            at("2025-03-10 00:00:00"),
            at("2025-03-09 23:59:59"),
            at("2025-03-04 10:00:00"),
            at("2025-03-03 10:00:00"),
            at("2025-03-03 08:00:00"),
            at("2025-03-01 12:00:00"),
        ];

        let stats = WeeklyStats::compute(&scans, now);

        assert_eq!(stats.daily_breakdown.len(), 7);
        assert_eq!(stats.daily_breakdown["2025-03-10"], 2);
        assert_eq!(stats.daily_breakdown["2025-03-09"], 1);
        assert_eq!(stats.daily_breakdown["2025-03-04"], 1);
        assert!(!stats.daily_breakdown.contains_key("2025-03-03"));

        // 2025-03-03 10:00 is inside the rolling window but before the oldest calendar bucket
        assert_eq!(stats.total_weekly_scans, 5);
        assert!((stats.average_daily - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_stats_without_scans() {
        let stats = WeeklyStats::compute(&[], at("2025-01-01 00:00:00"));
        assert_eq!(stats.total_weekly_scans, 0);
        assert!(stats.daily_breakdown.values().all(|n| *n == 0));
        assert!(stats.daily_breakdown.contains_key("2024-12-26"));
    }

    #[test]
    fn test_monthly_comparison_rounds_and_trends() {
        let now = at("2025-03-15 12:00:00");
        let scans = vec![
            at("2025-03-01 00:00:00"),
            at("2025-03-14 10:00:00"),
            at("2025-02-28 23:59:59"),
            at("2025-02-10 10:00:00"),
            at("2025-02-01 00:00:00"),
            at("2025-01-31 23:00:00"),
        ];

        let cmp = MonthlyComparison::compute(&scans, now);
        assert_eq!(cmp.current_month, 2);
        assert_eq!(cmp.last_month, 3);
        assert_eq!(cmp.change_percentage, -33.33);
        assert_eq!(cmp.trend, Trend::Down);
    }

    #[test]
    fn test_monthly_comparison_across_year_boundary() {
        let now = at("2025-01-05 12:00:00");
        let scans = vec![at("2024-12-31 10:00:00"), at("2025-01-02 10:00:00"), at("2025-01-03 10:00:00")];

        let cmp = MonthlyComparison::compute(&scans, now);
        assert_eq!((cmp.current_month, cmp.last_month), (2, 1));
        assert_eq!(cmp.change_percentage, 100.0);
        assert_eq!(cmp.trend, Trend::Up);
    }

    #[test]
    fn test_no_previous_month_is_stable() {
        let cmp = MonthlyComparison::compute(&[at("2025-03-02 10:00:00")], at("2025-03-15 12:00:00"));
        assert_eq!(cmp.change_percentage, 0.0);
        assert_eq!(cmp.trend, Trend::Stable);

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["trend"], "stable");
    }
}
