//! Key events, log records and their line format.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use unicode_general_category::{get_general_category, GeneralCategory};

const SESSION_START_PREFIX: &str = "--- AUTO START ";
const SESSION_START_SUFFIX: &str = " ---";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A key press as delivered by the host surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Text produced by the key, if any. May be empty or a control character.
    pub character: Option<String>,
    /// Symbolic key name, always present.
    pub keysym: String,
}

impl KeyEvent {
    pub fn new(character: Option<impl Into<String>>, keysym: impl Into<String>) -> Self {
        Self {
            character: character.map(Into::into),
            keysym: keysym.into(),
        }
    }

    /// The character value when it is non-empty and printable.
    pub fn printable_char(&self) -> Option<&str> {
        self.character.as_deref().filter(|text| is_printable(text))
    }
}

/// Non-empty and made only of characters that render as themselves.
pub fn is_printable(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_printable_char)
}

/// Control, format, surrogate, private-use, unassigned and separator
/// characters are not printable; the ASCII space is.
fn is_printable_char(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Char,
    NonChar,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Char => "CHAR",
            RecordKind::NonChar => "NONCHAR",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per-event log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub timestamp: DateTime<Utc>,
    /// Present only for `CHAR` records.
    pub character: Option<String>,
    pub keysym: String,
}

impl KeyRecord {
    pub fn from_event(timestamp: DateTime<Utc>, event: &KeyEvent) -> Self {
        Self {
            timestamp: truncate_to_seconds(timestamp),
            character: event.printable_char().map(str::to_string),
            keysym: event.keysym.clone(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        if self.character.is_some() {
            RecordKind::Char
        } else {
            RecordKind::NonChar
        }
    }

    /// Tab-separated line including the trailing newline.
    pub fn to_line(&self) -> String {
        let ts = format_timestamp(self.timestamp);
        let kind = self.kind();
        match &self.character {
            Some(ch) => format!("{ts}\t{kind}\t'{ch}'\tkeysym={}\n", self.keysym),
            None => format!("{ts}\t{kind}\tkeysym={}\n", self.keysym),
        }
    }
}

/// `--- AUTO START <ts> ---` followed by a newline.
pub fn session_start_line(timestamp: DateTime<Utc>) -> String {
    format!(
        "{SESSION_START_PREFIX}{}{SESSION_START_SUFFIX}\n",
        format_timestamp(timestamp)
    )
}

/// ISO-8601 UTC with second resolution and a trailing `Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn truncate_to_seconds(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.timestamp(), 0).unwrap_or(timestamp)
}

/// Source of record timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Classification of a line read back from a log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Tag,
    SessionStart(DateTime<Utc>),
    Key(KeyRecord),
    Unrecognized,
}

impl LogLine {
    /// Parses one line without its trailing newline.
    pub fn parse(line: &str, tag: &str) -> Self {
        if line == tag {
            return LogLine::Tag;
        }
        if let Some(ts) = line
            .strip_prefix(SESSION_START_PREFIX)
            .and_then(|rest| rest.strip_suffix(SESSION_START_SUFFIX))
            .and_then(parse_timestamp)
        {
            return LogLine::SessionStart(ts);
        }
        parse_key_line(line).map_or(LogLine::Unrecognized, LogLine::Key)
    }
}

fn parse_key_line(line: &str) -> Option<KeyRecord> {
    let (ts, rest) = line.split_once('\t')?;
    let timestamp = parse_timestamp(ts)?;
    let (kind, rest) = rest.split_once('\t')?;
    match kind {
        "CHAR" => {
            // The character is not escaped, so it may itself be a quote or a tab.
            let (quoted, keysym) = rest.rsplit_once("\tkeysym=")?;
            let character = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
            if character.is_empty() {
                return None;
            }
            Some(KeyRecord {
                timestamp,
                character: Some(character.to_string()),
                keysym: keysym.to_string(),
            })
        }
        "NONCHAR" => Some(KeyRecord {
            timestamp,
            character: None,
            keysym: rest.strip_prefix("keysym=")?.to_string(),
        }),
        _ => None,
    }
}
