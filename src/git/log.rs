//! Parsing of `git log` text into structured revisions

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `commit <id>\nAuthor: <raw>\nDate: <raw>\n\n<summary>\n<details>`
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^commit (\w+)\nAuthor: (.*)\nDate: (.*)\n\n(.*)\n?((?s).*)$")
        .expect("entry pattern is valid")
});

/// Start of every entry after the first
static ENTRY_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\ncommit ").expect("boundary pattern is valid"));

/// git's default `--date` format, e.g. `Thu Jan 4 10:00:00 2024 +0800`
const GIT_DEFAULT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// Indent git puts in front of every message line
const MESSAGE_INDENT: &str = "    ";

/// One historical change to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Full commit id as printed by git
    pub id: String,
    /// Raw `Name <email>` author string
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// First line of the commit message
    pub summary: String,
    /// Remaining message body with git's indent removed
    pub details: String,
}

/// Reason a log entry could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry(pub String);

/// Parse one trimmed log entry into a [`Revision`]
pub fn parse_revision(entry: &str) -> Result<Revision, MalformedEntry> {
    let entry = entry.replace("\r\n", "\n");
    let caps = ENTRY_RE.captures(&entry).ok_or_else(|| {
        MalformedEntry(format!(
            "entry does not match 'commit/Author/Date/message': {}",
            first_line(&entry)
        ))
    })?;

    let raw_date = caps[3].trim();
    let timestamp = parse_git_date(raw_date)
        .ok_or_else(|| MalformedEntry(format!("unparsable date '{}'", raw_date)))?;

    Ok(Revision {
        id: caps[1].trim().to_string(),
        author: caps[2].trim().to_string(),
        timestamp,
        summary: caps[4].trim().to_string(),
        details: dedent(&caps[5]).trim().to_string(),
    })
}

/// Split a `git log` blob into trimmed entries, newest first
///
/// Entries are returned in emission order; nothing is filtered or reordered.
pub fn split_log(log: &str) -> Vec<String> {
    if log.trim().is_empty() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    let mut start = 0;
    for boundary in ENTRY_BOUNDARY_RE.find_iter(log) {
        // keep "commit " with the following entry
        entries.push(log[start..boundary.start()].trim().to_string());
        start = boundary.start() + 1;
    }
    entries.push(log[start..].trim().to_string());
    entries
}

/// Parse a whole log blob
pub fn parse_log(log: &str) -> Result<Vec<Revision>, MalformedEntry> {
    split_log(log).iter().map(|e| parse_revision(e)).collect()
}

/// Parse the dates `git log` may print
///
/// Accepts git's default format, ISO 8601 strict (RFC 3339) and RFC 2822.
pub fn parse_git_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, GIT_DEFAULT_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

fn dedent(body: &str) -> String {
    body.lines()
        .map(|line| line.strip_prefix(MESSAGE_INDENT).unwrap_or(line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_line(entry: &str) -> &str {
    entry.lines().next().unwrap_or("")
}
