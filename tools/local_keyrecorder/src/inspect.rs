//! Read-only summary of an existing log.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::record::{format_timestamp, LogLine, RecordKind};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub tagged: bool,
    pub tag_at_start: bool,
    pub sessions: usize,
    pub char_records: usize,
    pub nonchar_records: usize,
    pub unrecognized: usize,
    pub first_record: Option<DateTime<Utc>>,
    pub last_record: Option<DateTime<Utc>>,
}

impl LogSummary {
    pub fn from_content(content: &str, tag: &str) -> Self {
        let mut summary = LogSummary {
            tagged: content.contains(tag),
            tag_at_start: content.lines().next() == Some(tag),
            ..Default::default()
        };
        for line in content.lines() {
            let timestamp = match LogLine::parse(line, tag) {
                LogLine::Tag => continue,
                LogLine::Unrecognized => {
                    if !line.is_empty() {
                        summary.unrecognized += 1;
                    }
                    continue;
                }
                LogLine::SessionStart(ts) => {
                    summary.sessions += 1;
                    ts
                }
                LogLine::Key(record) => {
                    match record.kind() {
                        RecordKind::Char => summary.char_records += 1,
                        RecordKind::NonChar => summary.nonchar_records += 1,
                    }
                    record.timestamp
                }
            };
            summary.first_record.get_or_insert(timestamp);
            summary.last_record = Some(timestamp);
        }
        summary
    }
}

impl fmt::Display for LogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag_state = match (self.tagged, self.tag_at_start) {
            (true, true) => "present (first line)",
            (true, false) => "present (not at start)",
            (false, _) => "missing",
        };
        writeln!(f, "Identification tag: {tag_state}")?;
        writeln!(f, "Sessions: {}", self.sessions)?;
        writeln!(f, "CHAR records: {}", self.char_records)?;
        writeln!(f, "NONCHAR records: {}", self.nonchar_records)?;
        writeln!(f, "Unrecognized lines: {}", self.unrecognized)?;
        if let (Some(first), Some(last)) = (self.first_record, self.last_record) {
            writeln!(f, "Span: {} .. {}", format_timestamp(first), format_timestamp(last))?;
        }
        Ok(())
    }
}

pub fn summarize_log(path: &Path, tag: &str) -> Result<LogSummary> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read log file {}", path.display()))?;
    Ok(LogSummary::from_content(&String::from_utf8_lossy(&bytes), tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TAG: &str = "TEST_TAG_v1";

    #[test]
    fn counts_each_kind_of_line() {
        let content = "TEST_TAG_v1\n\
                       --- AUTO START 2024-05-01T12:00:00Z ---\n\
                       2024-05-01T12:00:01Z\tCHAR\t'h'\tkeysym=h\n\
                       2024-05-01T12:00:02Z\tNONCHAR\tkeysym=Shift_L\n\
                       stray text\n\
                       --- AUTO START 2024-05-02T08:00:00Z ---\n\
                       2024-05-02T08:00:03Z\tCHAR\t'i'\tkeysym=i\n";
        let summary = LogSummary::from_content(content, TAG);

        assert!(summary.tagged);
        assert!(summary.tag_at_start);
        assert_eq!(summary.sessions, 2);
        assert_eq!(summary.char_records, 2);
        assert_eq!(summary.nonchar_records, 1);
        assert_eq!(summary.unrecognized, 1);
        assert_eq!(summary.first_record.map(format_timestamp).as_deref(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(summary.last_record.map(format_timestamp).as_deref(), Some("2024-05-02T08:00:03Z"));
    }

    #[test]
    fn reports_missing_tag() {
        let summary = LogSummary::from_content("hello\n", TAG);
        assert!(!summary.tagged);
        assert!(summary.to_string().starts_with("Identification tag: missing\n"));
        assert!(!summary.to_string().contains("Span"));
    }

    #[test]
    fn tag_with_trailing_text_is_not_at_start() {
        let summary = LogSummary::from_content("TEST_TAG_v1xyz\n", TAG);
        assert!(summary.tagged);
        assert!(!summary.tag_at_start);

        let summary = LogSummary::from_content("TEST_TAG_v1\r\nrest\n", TAG);
        assert!(summary.tag_at_start);
    }

    #[test]
    fn summarize_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keys.log");
        fs::write(&path, "x\nTEST_TAG_v1\n").unwrap();

        let summary = summarize_log(&path, TAG).unwrap();
        assert!(summary.tagged);
        assert!(!summary.tag_at_start);
        assert_eq!(summary.unrecognized, 1);

        assert!(summarize_log(&dir.path().join("absent.log"), TAG).is_err());
    }
}
