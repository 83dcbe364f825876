//! Trend history for the line chart.
//!
//! Only a demo source exists today. It fills the series with random values
//! inside fixed bands; nothing here reflects real churn.

use std::ops::RangeInclusive;

use chrono::{Days, Local, NaiveDate};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const CHURN_BAND: RangeInclusive<f64> = 12.0..=20.0;
pub const RETENTION_BAND: RangeInclusive<f64> = 80.0..=88.0;

/// Longest history the demo source will generate.
pub const MAX_TREND_DAYS: u32 = 366;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub churn: Vec<f64>,
    pub retention: Vec<f64>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Anything that can supply the trend chart. A real analytics backend would
/// implement this too.
pub trait TrendSource: Send + Sync {
    fn load(&self) -> TrendSeries;
}

/// Randomized history ending today.
pub struct DemoTrendSource {
    days: u32,
    today: NaiveDate,
    rng: Mutex<StdRng>,
}

impl DemoTrendSource {
    /// `days` before today, plus today itself. Capped at `MAX_TREND_DAYS`.
    pub fn new(days: u32) -> Self {
        Self::with_rng(days, Local::now().date_naive(), StdRng::from_entropy())
    }

    pub fn seeded(days: u32, today: NaiveDate, seed: u64) -> Self {
        Self::with_rng(days, today, StdRng::seed_from_u64(seed))
    }

    fn with_rng(days: u32, today: NaiveDate, rng: StdRng) -> Self {
        if days > MAX_TREND_DAYS {
            tracing::warn!("trend history of {} days capped at {}", days, MAX_TREND_DAYS);
        }
        Self {
            days: days.min(MAX_TREND_DAYS),
            today,
            rng: Mutex::new(rng),
        }
    }
}

impl TrendSource for DemoTrendSource {
    fn load(&self) -> TrendSeries {
        let mut rng = self.rng.lock();
        let mut series = TrendSeries::default();

        for back in (0..=self.days).rev() {
            // Dates before the calendar's start are skipped.
            let Some(date) = self.today.checked_sub_days(Days::new(u64::from(back))) else {
                continue;
            };
            series.labels.push(date.format("%b %-d").to_string());
            // Points are independent draws; churn and retention need not sum to 100.
            series.churn.push(rng.gen_range(CHURN_BAND));
            series.retention.push(rng.gen_range(RETENTION_BAND));
        }

        tracing::debug!("generated {} demo trend points", series.len());
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thirty_one_points_ending_today() {
        let src = DemoTrendSource::seeded(30, day(2024, 3, 15), 7);
        let s = src.load();
        assert_eq!(s.len(), 31);
        assert_eq!(s.churn.len(), 31);
        assert_eq!(s.retention.len(), 31);
        assert_eq!(s.labels.first().unwrap(), "Feb 14");
        assert_eq!(s.labels.last().unwrap(), "Mar 15");
    }

    #[test]
    fn values_within_bands() {
        let s = DemoTrendSource::seeded(30, day(2024, 1, 1), 99).load();
        assert!(s.churn.iter().all(|v| CHURN_BAND.contains(v)));
        assert!(s.retention.iter().all(|v| RETENTION_BAND.contains(v)));
    }

    #[test]
    fn oversized_history_is_capped() {
        let s = DemoTrendSource::seeded(200_000_000, day(2024, 1, 1), 1).load();
        assert_eq!(s.len(), MAX_TREND_DAYS as usize + 1);
        assert_eq!(s.labels.last().unwrap(), "Jan 1");
    }

    #[test]
    fn history_stops_at_earliest_date() {
        let s = DemoTrendSource::seeded(MAX_TREND_DAYS, NaiveDate::MIN, 5).load();
        assert_eq!(s.len(), 1);
        assert_eq!(s.churn.len(), 1);
    }

    #[test]
    fn same_seed_same_series() {
        let a = DemoTrendSource::seeded(30, day(2024, 6, 1), 3).load();
        let b = DemoTrendSource::seeded(30, day(2024, 6, 1), 3).load();
        assert_eq!(a, b);
    }
}
