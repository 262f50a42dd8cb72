//! Fixed-layout text encoding of log events
//!
//! Every event becomes one line:
//!
//! ```text
//! <L><DD><MM> <hh>:<mm>:<ss>.<uuuuuu> <file>:<line>-<message>\n
//! ```
//!
//! Downstream tailers parse this layout, so it must not change. Request-tagged
//! events carry the id as `[<id>] ` right after the dash.

use crate::LogEvent;
use chrono::{Datelike, Timelike};
use std::fmt::Write as FmtWrite;

/// Append the encoded line for `event` to `buf`.
pub fn format_into(event: &LogEvent, buf: &mut String) {
    let ts = &event.timestamp;
    // Leap seconds are reported as nanosecond >= 1_000_000_000.
    let micros = (ts.nanosecond() % 1_000_000_000) / 1_000;

    let _ = write!(
        buf,
        "{}{:02}{:02} {:02}:{:02}:{:02}.{:06} {}:{}-",
        event.level.as_char(),
        ts.day(),
        ts.month(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        micros,
        event.caller.file,
        event.caller.line,
    );

    if let Some(request_id) = &event.request_id {
        buf.push('[');
        buf.push_str(request_id);
        buf.push_str("] ");
    }

    buf.push_str(&event.message);
    buf.push('\n');
}

/// Encode `event` into a freshly allocated line.
#[must_use]
pub fn format_event(event: &LogEvent) -> String {
    let mut buf = String::with_capacity(32 + event.message.len());
    format_into(event, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Caller, Level};
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn event(level: Level, message: &str) -> LogEvent {
        let timestamp = Local
            .with_ymd_and_hms(2024, 3, 5, 9, 2, 7)
            .single()
            .and_then(|ts| ts.with_nanosecond(45_000))
            .unwrap();

        LogEvent::new(Arc::from("app"), level, message)
            .with_timestamp(timestamp)
            .with_caller(Caller {
                file: "app.go",
                line: 12,
            })
    }

    #[test]
    fn test_layout_is_byte_exact() {
        assert_eq!(
            format_event(&event(Level::Info, "started")),
            "I0503 09:02:07.000045 app.go:12-started\n"
        );
    }

    #[test]
    fn test_level_chars() {
        assert!(format_event(&event(Level::Debug, "x")).starts_with('D'));
        assert!(format_event(&event(Level::Error, "x")).starts_with('E'));
    }

    #[test]
    fn test_unknown_caller() {
        let line = format_event(&event(Level::Info, "m").with_caller(Caller::UNKNOWN));
        assert_eq!(line, "I0503 09:02:07.000045 ?:0-m\n");
    }

    #[test]
    fn test_request_tag() {
        let tagged = event(Level::Error, "boom").with_request_id(Some("req-42".into()));
        assert_eq!(
            format_event(&tagged),
            "E0503 09:02:07.000045 app.go:12-[req-42] boom\n"
        );
    }

    #[test]
    fn test_format_into_appends() {
        let mut buf = String::from("prefix|");
        format_into(&event(Level::Info, "a"), &mut buf);
        assert!(buf.starts_with("prefix|I0503"));
        assert!(buf.ends_with("-a\n"));
    }

    #[test]
    fn test_two_digit_fields() {
        let timestamp = Local
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 58)
            .single()
            .and_then(|ts| ts.with_nanosecond(999_999_000))
            .unwrap();
        let line = format_event(&event(Level::Info, "late").with_timestamp(timestamp));
        assert_eq!(line, "I3112 23:59:58.999999 app.go:12-late\n");
    }
}
