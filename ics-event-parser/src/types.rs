//! Core types for the ICS event parser
//!
//! This module defines the values the parser emits and the errors it can raise.
//! Records are immutable once built; the parser never constructs one from an
//! incomplete field set.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Timestamp type used throughout the parser (local wall-clock time)
pub type Timestamp = NaiveDateTime;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Display pattern used by [`EventRecord::describe`]
const DESCRIBE_FORMAT: &str = "%m/%d %H:%M";

/// One finished calendar occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    title: String,
    start: Timestamp,
    end: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl EventRecord {
    /// Create a new record. `end` is not required to follow `start`.
    pub fn new(title: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            description: None,
        }
    }

    /// Builder method: attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Elapsed whole minutes between start and end, divided by 60
    ///
    /// Negative when `end` precedes `start`.
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// Elapsed whole minutes between start and end (truncated toward zero)
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Human-readable one-line summary, e.g. `Standup (03/15 09:00 - 03/15 09:30) - 0.5h`
    pub fn describe(&self) -> String {
        format!(
            "{} ({} - {}) - {:?}h",
            self.title,
            self.start.format(DESCRIBE_FORMAT),
            self.end.format(DESCRIBE_FORMAT),
            self.duration_hours()
        )
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// The three date encodings recognized by the date dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateShape {
    /// `YYYYMMDDTHHMMSSZ`
    Utc,
    /// `YYYYMMDDTHHMMSS`
    Local,
    /// `YYYYMMDD`
    AllDay,
}

impl DateShape {
    /// The literal pattern this shape expects
    pub fn pattern(&self) -> &'static str {
        match self {
            DateShape::Utc => "YYYYMMDDTHHMMSSZ",
            DateShape::Local => "YYYYMMDDTHHMMSS",
            DateShape::AllDay => "YYYYMMDD",
        }
    }
}

impl fmt::Display for DateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// A timestamp value that does not match the shape selected for it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse date '{value}': expected {expected}")]
pub struct DateFormatError {
    /// The raw value as it appeared after the field delimiter
    pub value: String,
    /// Shape chosen by the dispatch for this value
    pub expected: DateShape,
}

/// Errors that can occur while parsing calendar content
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    #[error("Line {line}: {source}")]
    DateFormat {
        line: usize,
        #[source]
        source: DateFormatError,
    },

    #[error("Line {line}: {field} has no ':' delimiter")]
    MissingValue { line: usize, field: &'static str },
}

impl ParserError {
    /// 1-based input line the error was raised on
    pub fn line(&self) -> usize {
        match self {
            ParserError::DateFormat { line, .. } => *line,
            ParserError::MissingValue { line, .. } => *line,
        }
    }
}
