//! Line-oriented VEVENT scanner
//!
//! Each line is trimmed, classified into a [`LineKind`] and applied to a
//! [`PendingRecord`]. The rules are:
//! - `BEGIN:VEVENT` clears every pending field, even if the previous record
//!   never closed
//! - field lines overwrite the pending value (last one wins)
//! - `END:VEVENT` emits a record only when title, start and end are all
//!   present, and leaves the pending fields untouched
//! - anything else is ignored
//!
//! Records are yielded in the order their close markers appear.

use crate::config::ParserConfig;
use crate::date::parse_ics_date;
use crate::types::{EventRecord, ParserError, Result, Timestamp};
use std::borrow::Cow;
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

const OPEN_MARKER: &str = "BEGIN:VEVENT";
const CLOSE_MARKER: &str = "END:VEVENT";
const TITLE_PREFIX: &str = "SUMMARY:";
const DESCRIPTION_PREFIX: &str = "DESCRIPTION:";
const START_PREFIX: &str = "DTSTART";
const END_PREFIX: &str = "DTEND";
const VALUE_DELIMITER: char = ':';

/// Classification of a single trimmed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `BEGIN:VEVENT`
    Open,
    /// `END:VEVENT`
    Close,
    /// `SUMMARY:` with the verbatim remainder
    Title(&'a str),
    /// `DESCRIPTION:` with the verbatim remainder
    Description(&'a str),
    /// `DTSTART...` with the text after the first `:` (None if there is no `:`)
    Start(Option<&'a str>),
    /// `DTEND...` with the text after the first `:` (None if there is no `:`)
    End(Option<&'a str>),
    /// Anything else
    Other,
}

impl<'a> LineKind<'a> {
    /// Classify an already trimmed line
    pub fn classify(line: &'a str) -> Self {
        if line == OPEN_MARKER {
            LineKind::Open
        } else if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
            LineKind::Title(title)
        } else if line.starts_with(START_PREFIX) {
            LineKind::Start(field_value(line))
        } else if line.starts_with(END_PREFIX) {
            LineKind::End(field_value(line))
        } else if let Some(description) = line.strip_prefix(DESCRIPTION_PREFIX) {
            LineKind::Description(description)
        } else if line == CLOSE_MARKER {
            LineKind::Close
        } else {
            LineKind::Other
        }
    }
}

/// Everything after the first delimiter; parameters before it are ignored
fn field_value(line: &str) -> Option<&str> {
    line.split_once(VALUE_DELIMITER).map(|(_, value)| value)
}

/// Fields collected since the most recent open marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingRecord {
    pub title: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub description: Option<String>,
    /// Set when a date in this record failed to parse
    pub poisoned: bool,
}

impl PendingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build a record if title, start and end are all present
    ///
    /// The pending state is kept, so a second close marker without an
    /// intervening open marker yields the same record again.
    pub fn complete(&self) -> Option<EventRecord> {
        if self.poisoned {
            return None;
        }
        let (title, start, end) = match (&self.title, self.start, self.end) {
            (Some(title), Some(start), Some(end)) => (title, start, end),
            _ => return None,
        };

        let record = EventRecord::new(title.clone(), start, end);
        Some(match &self.description {
            Some(description) => record.with_description(description.clone()),
            None => record,
        })
    }
}

/// Logical lines of the input, numbered from 1 by their first physical line
struct LogicalLines<'a> {
    raw: Peekable<Enumerate<Lines<'a>>>,
    unfold: bool,
}

impl<'a> LogicalLines<'a> {
    fn new(content: &'a str, unfold: bool) -> Self {
        Self {
            raw: content.lines().enumerate().peekable(),
            unfold,
        }
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = (usize, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, first) = self.raw.next()?;
        let mut line = Cow::Borrowed(first);

        if self.unfold {
            while let Some((_, next)) = self.raw.peek() {
                if !(next.starts_with(' ') || next.starts_with('\t')) {
                    break;
                }
                line.to_mut().push_str(&next[1..]);
                self.raw.next();
            }
        }

        Some((index + 1, line))
    }
}

/// Lazily scans calendar content and yields one item per emitted record
///
/// Under [`ErrorPolicy::Strict`](crate::config::ErrorPolicy::Strict) a bad date
/// is yielded as an `Err` item. The record it belongs to is discarded, so a
/// caller that keeps iterating only sees later records.
pub struct EventIter<'a> {
    lines: LogicalLines<'a>,
    pending: PendingRecord,
    lenient: bool,
}

impl<'a> EventIter<'a> {
    pub fn new(content: &'a str, config: &ParserConfig) -> Self {
        Self {
            lines: LogicalLines::new(content, config.unfold_lines),
            pending: PendingRecord::new(),
            lenient: config.is_lenient(),
        }
    }

    /// Mark the pending record as unusable; returns the error if it must surface
    fn reject(&mut self, err: ParserError) -> Option<ParserError> {
        self.pending.poisoned = true;
        if self.lenient {
            log::warn!("{}; event will be skipped", err);
            None
        } else {
            Some(err)
        }
    }

    fn close(&self, line: usize) -> Option<EventRecord> {
        if self.pending.poisoned {
            log::debug!("Line {}: dropping event with invalid date", line);
            return None;
        }
        match self.pending.complete() {
            Some(record) => {
                log::debug!("Line {}: parsed event {:?}", line, record.title());
                Some(record)
            }
            None => {
                log::debug!("Line {}: skipping incomplete event", line);
                None
            }
        }
    }
}

impl<'a> Iterator for EventIter<'a> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((line_no, raw)) = self.lines.next() {
            match LineKind::classify(raw.trim()) {
                LineKind::Open => self.pending.reset(),
                LineKind::Title(title) => self.pending.title = Some(title.to_string()),
                LineKind::Description(description) => {
                    self.pending.description = Some(description.to_string())
                }
                LineKind::Start(value) => match read_date(line_no, START_PREFIX, value) {
                    Ok(ts) => self.pending.start = Some(ts),
                    Err(e) => {
                        if let Some(e) = self.reject(e) {
                            return Some(Err(e));
                        }
                    }
                },
                LineKind::End(value) => match read_date(line_no, END_PREFIX, value) {
                    Ok(ts) => self.pending.end = Some(ts),
                    Err(e) => {
                        if let Some(e) = self.reject(e) {
                            return Some(Err(e));
                        }
                    }
                },
                LineKind::Close => {
                    if let Some(record) = self.close(line_no) {
                        return Some(Ok(record));
                    }
                }
                LineKind::Other => {}
            }
        }
        None
    }
}

fn read_date(line: usize, field: &'static str, value: Option<&str>) -> Result<Timestamp> {
    let value = value.ok_or(ParserError::MissingValue { line, field })?;
    parse_ics_date(value).map_err(|source| ParserError::DateFormat { line, source })
}

/// Parser entry point holding a configuration
///
/// Every call owns fresh pending state, so one parser can be shared across
/// independent sources.
#[derive(Debug, Clone, Default)]
pub struct EventParser {
    config: ParserConfig,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Stream records out of `content`
    pub fn events<'a>(&self, content: &'a str) -> EventIter<'a> {
        EventIter::new(content, &self.config)
    }

    /// Parse all records in `content`
    ///
    /// With the strict policy the first date error aborts the parse.
    pub fn parse(&self, content: &str) -> Result<Vec<EventRecord>> {
        let events = self.events(content).collect::<Result<Vec<_>>>()?;
        log::info!("Parsed {} events", events.len());
        Ok(events)
    }
}

/// Parse all records in `content` with the default (strict) configuration
pub fn parse_events(content: &str) -> Result<Vec<EventRecord>> {
    EventParser::new().parse(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPolicy;
    use crate::types::DateShape;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn lenient() -> EventParser {
        EventParser::with_config(ParserConfig::new().with_error_policy(ErrorPolicy::Lenient))
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(LineKind::classify("BEGIN:VEVENT"), LineKind::Open);
        assert_eq!(LineKind::classify("END:VEVENT"), LineKind::Close);
        assert_eq!(LineKind::classify("SUMMARY:Lunch"), LineKind::Title("Lunch"));
        assert_eq!(LineKind::classify("SUMMARY:"), LineKind::Title(""));
        assert_eq!(
            LineKind::classify("DTSTART;TZID=Europe/Paris:20240101T090000"),
            LineKind::Start(Some("20240101T090000"))
        );
        assert_eq!(
            LineKind::classify("DTEND;VALUE=DATE:20240102"),
            LineKind::End(Some("20240102"))
        );
        assert_eq!(LineKind::classify("DTSTART"), LineKind::Start(None));
        assert_eq!(
            LineKind::classify("DESCRIPTION:Bring notes"),
            LineKind::Description("Bring notes")
        );
        assert_eq!(LineKind::classify("BEGIN:VCALENDAR"), LineKind::Other);
        assert_eq!(LineKind::classify("DTSTAMP:20240101T000000Z"), LineKind::Other);
        assert_eq!(LineKind::classify(""), LineKind::Other);
    }

    #[test]
    fn test_pending_complete_requires_all_fields() {
        let mut pending = PendingRecord::new();
        pending.title = Some("A".to_string());
        pending.start = Some(ts(2024, 1, 1, 9, 0));
        assert_eq!(pending.complete(), None);

        pending.end = Some(ts(2024, 1, 1, 10, 0));
        let record = pending.complete().unwrap();
        assert_eq!(record.title(), "A");

        pending.poisoned = true;
        assert_eq!(pending.complete(), None);

        pending.reset();
        assert_eq!(pending, PendingRecord::new());
    }

    #[test]
    fn test_single_record_any_field_order() {
        let orders = [
            ["SUMMARY:Sync", "DTSTART:20240101T090000", "DTEND:20240101T100000"],
            ["DTEND:20240101T100000", "SUMMARY:Sync", "DTSTART:20240101T090000"],
            ["DTSTART:20240101T090000", "DTEND:20240101T100000", "SUMMARY:Sync"],
        ];

        for fields in orders {
            let content = format!("BEGIN:VEVENT\n{}\nEND:VEVENT\n", fields.join("\n"));
            let events = parse_events(&content).unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].title(), "Sync");
            assert_eq!(events[0].start(), ts(2024, 1, 1, 9, 0));
            assert_eq!(events[0].end(), ts(2024, 1, 1, 10, 0));
            assert_eq!(events[0].duration_hours(), 1.0);
        }
    }

    #[test]
    fn test_incomplete_records_dropped() {
        let content = "\
BEGIN:VEVENT
SUMMARY:No end
DTSTART:20240101T090000
END:VEVENT
BEGIN:VEVENT
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:No start
DTEND:20240101T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:Kept
DTSTART:20240102T090000
DTEND:20240102T093000
END:VEVENT
";
        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Kept");
    }

    #[test]
    fn test_open_marker_discards_previous_fields() {
        let content = "\
BEGIN:VEVENT
SUMMARY:A
BEGIN:VEVENT
SUMMARY:B
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
";
        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "B");

        // Title from a discarded record never leaks into the next one
        let content = "\
BEGIN:VEVENT
SUMMARY:A
BEGIN:VEVENT
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
";
        assert!(parse_events(content).unwrap().is_empty());
    }

    #[test]
    fn test_summary_overwrite() {
        let content = "\
BEGIN:VEVENT
SUMMARY:First
SUMMARY:Second
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].title(), "Second");
    }

    #[test]
    fn test_order_preserved() {
        let mut content = String::new();
        for (title, day) in [("R1", 3), ("R2", 1), ("R3", 2)] {
            content.push_str(&format!(
                "BEGIN:VEVENT\nSUMMARY:{}\nDTSTART:202401{:02}T090000\nDTEND:202401{:02}T100000\nEND:VEVENT\n",
                title, day, day
            ));
        }
        let titles: Vec<_> = parse_events(&content)
            .unwrap()
            .iter()
            .map(|e| e.title().to_string())
            .collect();
        assert_eq!(titles, vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn test_crlf_and_whitespace() {
        let content = "BEGIN:VEVENT\r\n  SUMMARY:Padded  \r\nDTSTART:20240101T090000\r\n\tDTEND:20240101T100000\r\nEND:VEVENT\r\n";
        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Padded");
    }

    #[test]
    fn test_title_kept_verbatim() {
        let content = "BEGIN:VEVENT\nSUMMARY:Lunch\\, with team: 1:1\nDTSTART:20240101\nDTEND:20240102\nEND:VEVENT";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].title(), "Lunch\\, with team: 1:1");
        assert_eq!(events[0].duration_hours(), 24.0);
    }

    #[test]
    fn test_close_does_not_reset() {
        let content = "\
BEGIN:VEVENT
SUMMARY:Twice
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
END:VEVENT
";
        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], events[1]);
    }

    #[test]
    fn test_strict_aborts_on_bad_date() {
        let content = "\
BEGIN:VEVENT
SUMMARY:Good
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:Bad
DTSTART:2024-01-02
DTEND:20240102T100000
END:VEVENT
";
        let err = parse_events(content).unwrap_err();
        match err {
            ParserError::DateFormat { line, source } => {
                assert_eq!(line, 8);
                assert_eq!(source.value, "2024-01-02");
                assert_eq!(source.expected, DateShape::AllDay);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_streaming_keeps_earlier_records() {
        let content = "\
BEGIN:VEVENT
SUMMARY:Before
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:Bad
DTSTART:garbage
DTEND:20240102T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:After
DTSTART:20240103T090000
DTEND:20240103T100000
END:VEVENT
";
        let items: Vec<_> = EventParser::new().events(content).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().title(), "Before");
        assert!(items[1].is_err());
        assert_eq!(items[2].as_ref().unwrap().title(), "After");
    }

    #[test]
    fn test_lenient_skips_bad_record() {
        let content = "\
BEGIN:VEVENT
SUMMARY:Bad
DTSTART:20240101T090000
DTEND:2024010
END:VEVENT
BEGIN:VEVENT
SUMMARY:Good
DTSTART:20240102T090000
DTEND:20240102T100000
END:VEVENT
";
        let events = lenient().parse(content).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Good");
    }

    #[test]
    fn test_missing_delimiter() {
        let content = "BEGIN:VEVENT\nSUMMARY:X\nDTSTART\nDTEND:20240101\nEND:VEVENT\n";
        assert_eq!(
            parse_events(content).unwrap_err(),
            ParserError::MissingValue { line: 3, field: "DTSTART" }
        );
        assert!(lenient().parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_description_captured() {
        let content = "\
BEGIN:VEVENT
SUMMARY:Planning
DESCRIPTION:Quarterly goals
DTSTART:20240101T090000
DTEND:20240101T100000
END:VEVENT
BEGIN:VEVENT
SUMMARY:Plain
DTSTART:20240101T110000
DTEND:20240101T120000
END:VEVENT
";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].description(), Some("Quarterly goals"));
        assert_eq!(events[1].description(), None);
    }

    #[test]
    fn test_unfolding_is_opt_in() {
        let content = "BEGIN:VEVENT\nSUMMARY:Long meeting\n  title\nDTSTART:20240101T090000\nDTEND:20240101T100000\nEND:VEVENT\n";

        let plain = parse_events(content).unwrap();
        assert_eq!(plain[0].title(), "Long meeting");

        let parser = EventParser::with_config(ParserConfig::new().with_line_unfolding(true));
        let unfolded = parser.parse(content).unwrap();
        assert_eq!(unfolded[0].title(), "Long meeting title");
    }

    #[test]
    fn test_fields_outside_records_are_ignored() {
        let content = "\
BEGIN:VCALENDAR
SUMMARY:Calendar name
DTSTART:20240101T090000
DTEND:20240101T100000
BEGIN:VEVENT
END:VEVENT
END:VCALENDAR
";
        assert!(parse_events(content).unwrap().is_empty());
        assert!(parse_events("").unwrap().is_empty());
    }
}
