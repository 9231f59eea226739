//! Progress math for the home-screen charts.
//!
//! Weekly scores are cumulative: each day counts every domain answer
//! completed before that day's end, so the series never decreases.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::types::Timestamp;

/// Chart labels for Monday through Sunday.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One point on the weekly progress chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayScore {
    pub day: &'static str,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub score: f64,
}

/// The Mon..Sun series for the week containing `today`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyProgress {
    pub labels: Vec<&'static str>,
    pub scores: Vec<f64>,
    pub days: Vec<DayScore>,
    pub week_average: f64,
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage of `total` that `answered` represents. Zero when `total` is zero.
pub fn progress_percent(answered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        answered as f64 / total as f64 * 100.0
    }
}

/// Build the weekly chart for the ISO week containing `today`.
///
/// `total_questions` is clamped to at least 1. Scores are rounded to one
/// decimal and capped at 100.
pub fn weekly_scores(
    today: NaiveDate,
    completed_at: &[Timestamp],
    total_questions: usize,
) -> WeeklyProgress {
    let total = total_questions.max(1) as f64;
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));

    let mut days = Vec::with_capacity(7);
    let mut scores = Vec::with_capacity(7);

    for (offset, label) in DAY_LABELS.iter().enumerate() {
        let date = monday + Days::new(offset as u64);
        let end_of_day = (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc();

        let count = completed_at.iter().filter(|t| **t < end_of_day).count();
        let score = round_to(count as f64 / total * 100.0, 1).min(100.0);

        days.push(DayScore {
            day: label,
            date: date.format("%Y-%m-%d").to_string(),
            score,
        });
        scores.push(score);
    }

    let week_average = round_to(scores.iter().sum::<f64>() / scores.len() as f64, 1);

    WeeklyProgress {
        labels: DAY_LABELS.to_vec(),
        scores,
        days,
        week_average,
    }
}

// ---------------------------------------------------------------------------
// All-domain overview
// ---------------------------------------------------------------------------

/// Progress summary for a single domain in the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainProgressSummary {
    pub domain: String,
    pub progress_percent: f64,
    pub answered_questions: usize,
    pub total_questions: usize,
    pub is_completed: bool,
}

impl DomainProgressSummary {
    pub fn new(domain: &str, answered: usize, total: usize) -> Self {
        Self {
            domain: domain.to_string(),
            progress_percent: round_to(progress_percent(answered, total), 1),
            answered_questions: answered,
            total_questions: total,
            is_completed: total > 0 && answered == total,
        }
    }
}

/// Aggregates across every domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainsOverview {
    pub domains: Vec<DomainProgressSummary>,
    pub overall_average: f64,
    pub domains_started: usize,
    pub domains_completed: usize,
    pub total_domains: usize,
}

impl DomainsOverview {
    pub fn from_summaries(domains: Vec<DomainProgressSummary>) -> Self {
        let total_domains = domains.len();
        let overall_average = if domains.is_empty() {
            0.0
        } else {
            let sum: f64 = domains.iter().map(|d| d.progress_percent).sum();
            round_to(sum / total_domains as f64, 2)
        };
        let domains_started = domains.iter().filter(|d| d.progress_percent > 0.0).count();
        let domains_completed = domains.iter().filter(|d| d.is_completed).count();

        Self {
            domains,
            overall_average,
            domains_started,
            domains_completed,
            total_domains,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-18 is a Sunday.
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let week = weekly_scores(today, &[], 10);
        assert_eq!(week.days[0].date, "2026-10-12");
        assert_eq!(week.days[6].date, "2026-10-18");
        assert_eq!(week.labels, DAY_LABELS.to_vec());
    }

    #[test]
    fn scores_are_cumulative() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let answers = vec![
            at(2026, 10, 1, 9),  // before the week
            at(2026, 10, 12, 8), // Monday
            at(2026, 10, 14, 23),
        ];
        let week = weekly_scores(today, &answers, 4);
        assert_eq!(week.scores, vec![50.0, 50.0, 75.0, 75.0, 75.0, 75.0, 75.0]);
        assert_eq!(week.week_average, 67.9);
    }

    #[test]
    fn scores_capped_and_zero_total_guarded() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let answers = vec![at(2026, 10, 1, 9), at(2026, 10, 2, 9)];
        let week = weekly_scores(today, &answers, 0);
        assert!(week.scores.iter().all(|s| *s == 100.0));
    }

    #[test]
    fn progress_percent_handles_zero_total() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(1, 4), 25.0);
    }

    #[test]
    fn overview_counts_started_and_completed() {
        let overview = DomainsOverview::from_summaries(vec![
            DomainProgressSummary::new("skincare", 3, 3),
            DomainProgressSummary::new("diet", 1, 3),
            DomainProgressSummary::new("height", 0, 0),
        ]);
        assert_eq!(overview.domains_started, 2);
        assert_eq!(overview.domains_completed, 1);
        assert_eq!(overview.total_domains, 3);
        assert_eq!(overview.domains[1].progress_percent, 33.3);
        assert_eq!(overview.overall_average, 44.43);
    }
}
