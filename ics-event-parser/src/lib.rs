//! ICS Event Parser Library
//!
//! A stateless library for extracting calendar events from iCalendar (ICS) text.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on extraction:
//! - Scans text line by line and emits one [`EventRecord`] per complete `VEVENT`
//! - Normalizes UTC, floating local and all-day date values into local timestamps
//! - Silently drops records missing a title, start or end
//!
//! The library does NOT:
//! - Read files (callers pass content already in memory)
//! - Expand recurrence rules
//! - Filter, sort or report events
//!
//! Reporting lives in the application layer (ics-report-cli).
//!
//! # Example Usage
//!
//! ```
//! use ics_event_parser::{parse_events, EventParser, ErrorPolicy, ParserConfig};
//!
//! let content = "BEGIN:VEVENT\nSUMMARY:Standup\nDTSTART:20240101T090000\nDTEND:20240101T091500\nEND:VEVENT\n";
//!
//! let events = parse_events(content).unwrap();
//! assert_eq!(events[0].duration_hours(), 0.25);
//!
//! // Skip records with bad dates instead of failing
//! let parser = EventParser::with_config(
//!     ParserConfig::new().with_error_policy(ErrorPolicy::Lenient),
//! );
//! for event in parser.parse(content).unwrap() {
//!     println!("{}", event.describe());
//! }
//! ```

// Public modules
pub mod config;
pub mod date;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use config::{ErrorPolicy, ParserConfig};
pub use date::parse_ics_date;
pub use parser::{parse_events, EventIter, EventParser, LineKind, PendingRecord};
pub use types::{DateFormatError, DateShape, EventRecord, ParserError, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
