//! Rolling-window emotion trend.
//!
//! Counts every emotion tag occurrence (not distinct reflections) across a
//! user's reflections created inside the trailing window. Output is sorted by
//! tag name. When nothing matches, the report carries a fixed placeholder
//! distribution flagged with `is_fallback` so clients can tell it apart from
//! real data.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::reflections::models::{EmotionTag, Reflection};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Display default served when a user has no reflections in the window.
/// Order is part of the contract.
pub const FALLBACK_TREND: [(EmotionTag, u32); 4] = [
    (EmotionTag::Calm, 3),
    (EmotionTag::Awareness, 2),
    (EmotionTag::Hope, 2),
    (EmotionTag::Anger, 1),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub emotion: EmotionTag,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub user_id: String,
    pub trend: Vec<TrendPoint>,
    pub window_days: u32,
    pub is_fallback: bool,
}

impl TrendReport {
    /// Wraps aggregated points, substituting the fallback distribution when
    /// `points` is empty and `fallback_enabled` is set.
    pub fn build(
        user_id: String,
        window_days: u32,
        points: Vec<TrendPoint>,
        fallback_enabled: bool,
    ) -> Self {
        let (trend, is_fallback) = if points.is_empty() && fallback_enabled {
            (fallback_points(), true)
        } else {
            (points, false)
        };
        TrendReport {
            user_id,
            trend,
            window_days,
            is_fallback,
        }
    }
}

pub fn fallback_points() -> Vec<TrendPoint> {
    FALLBACK_TREND
        .iter()
        .map(|&(emotion, count)| TrendPoint { emotion, count })
        .collect()
}

/// Start of the trailing window ending at `now`. Inclusive.
pub fn window_start(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(window_days))
}

/// Tallies emotion occurrences for `user_id` over reflections created at or
/// after `now - window_days`.
pub fn aggregate_emotions<'a>(
    reflections: impl IntoIterator<Item = &'a Reflection>,
    user_id: &str,
    window_days: u32,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let since = window_start(now, window_days);

    let mut counts: HashMap<EmotionTag, u32> = HashMap::new();
    for reflection in reflections
        .into_iter()
        .filter(|r| r.user_id == user_id && r.created_at >= since)
    {
        for emotion in &reflection.emotions {
            *counts.entry(*emotion).or_insert(0) += 1;
        }
    }

    let mut trend: Vec<TrendPoint> = counts
        .into_iter()
        .map(|(emotion, count)| TrendPoint { emotion, count })
        .collect();
    sort_by_name(&mut trend);
    trend
}

pub fn sort_by_name(trend: &mut [TrendPoint]) {
    trend.sort_by(|a, b| a.emotion.as_str().cmp(b.emotion.as_str()));
}

/// Resolves the `days` query parameter.
pub fn parse_window_days(days: Option<i64>) -> Result<u32, AppError> {
    let days = days.unwrap_or(i64::from(DEFAULT_WINDOW_DAYS));
    if !(1..=i64::from(MAX_WINDOW_DAYS)).contains(&days) {
        return Err(AppError::Validation(format!(
            "days: must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    Ok(days as u32)
}
