//! Weekly report generation
//!
//! Selects the events starting inside a seven-day window, groups them per day
//! and totals their durations. Renders as plain text (`Display`) or JSON.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use ics_event_parser::EventRecord;
use serde::Serialize;
use std::fmt;

const RULE: &str = "==============================";
const DAYS_PER_WEEK: i64 = 7;

/// Seven consecutive days starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(DAYS_PER_WEEK - 1),
        }
    }

    /// Parse a `YYYY-MM-DD` week start
    pub fn parse(week_start: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(week_start.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid week start date {:?} (expected YYYY-MM-DD)", week_start))?;
        Ok(Self::new(start))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..DAYS_PER_WEEK).map(move |offset| start + Duration::days(offset))
    }
}

/// Events of one day in the report
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub day_name: String,
    pub events: Vec<EventRecord>,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub week: WeekRange,
    pub days: Vec<DaySummary>,
    pub total_events: usize,
    pub total_minutes: i64,
    pub average_daily_hours: f64,
}

impl WeeklyReport {
    /// Build the report for `week` out of all parsed events
    ///
    /// An event belongs to the day its start falls on. Negative durations
    /// count as zero in the totals.
    pub fn build(events: &[EventRecord], week: WeekRange) -> Self {
        let mut selected: Vec<&EventRecord> = events
            .iter()
            .filter(|event| week.contains(event.start().date()))
            .collect();
        selected.sort_by_key(|event| event.start());

        let days: Vec<DaySummary> = week
            .days()
            .map(|date| {
                let events: Vec<EventRecord> = selected
                    .iter()
                    .filter(|event| event.start().date() == date)
                    .map(|event| (*event).clone())
                    .collect();
                let total_minutes = events.iter().map(counted_minutes).sum();
                DaySummary {
                    date,
                    day_name: date.format("%A").to_string(),
                    events,
                    total_minutes,
                }
            })
            .collect();

        let total_minutes: i64 = days.iter().map(|day| day.total_minutes).sum();
        log::debug!(
            "Week {} - {}: {} of {} events selected",
            week.start,
            week.end,
            selected.len(),
            events.len()
        );

        Self {
            week,
            days,
            total_events: selected.len(),
            total_minutes,
            average_daily_hours: total_minutes as f64 / 60.0 / DAYS_PER_WEEK as f64,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}

fn counted_minutes(event: &EventRecord) -> i64 {
    event.duration_minutes().max(0)
}

/// `2h 30m`, `2h` or `45m`
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weekly Report")?;
        writeln!(f, "{} - {}", self.week.start, self.week.end)?;
        writeln!(f, "{}", RULE)?;

        for day in &self.days {
            writeln!(f)?;
            if day.events.is_empty() {
                writeln!(f, "{} {}", day.day_name, day.date)?;
                writeln!(f, "  (no events)")?;
                continue;
            }
            writeln!(
                f,
                "{} {} ({})",
                day.day_name,
                day.date,
                format_duration(day.total_minutes)
            )?;
            for event in &day.events {
                writeln!(f, "  - {}", event.describe())?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Events: {}", self.total_events)?;
        writeln!(f, "Total: {}", format_duration(self.total_minutes))?;
        writeln!(f, "Average per day: {:.2}h", self.average_daily_hours)
    }
}
