//! Author roster and resolution of raw commit authors

use crate::document::Document;
use crate::error::AuthorError;
use chrono::{DateTime, Utc};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// `邮箱：a@x.com; b@y.com`, half- or full-width colon
static EMAIL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:邮箱|[Ee]mail)[：:](.*)$").expect("email line pattern is valid")
});

static EMAIL_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,；，]").expect("separator pattern is valid"));

/// Divider between the header fields and the profile body
static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n-{2,}\r?\n").expect("divider pattern is valid"));

/// One roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Profile file name without extension
    pub name: String,
    /// Creation date of the profile file
    pub join_date: DateTime<Utc>,
    /// Addresses commits by this author may carry; matched case-sensitively
    pub emails: Vec<String>,
    pub profile: String,
}

impl Author {
    /// Parse a roster profile document
    pub fn parse(path: &str, content: &str, join_date: DateTime<Utc>) -> Self {
        let name = Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().trim().to_string())
            .unwrap_or_default();

        let emails = EMAIL_LINE_RE
            .captures(content)
            .map(|caps| {
                EMAIL_SEPARATOR_RE
                    .split(&caps[1])
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // no divider keeps the whole body
        let profile = match DIVIDER_RE.find(content) {
            Some(divider) => content[divider.end()..].trim(),
            None => content.trim(),
        }
        .to_string();

        Self {
            name,
            join_date,
            emails,
            profile,
        }
    }

    /// Build from a loaded roster document; joined when the file was created
    pub fn from_document(doc: &Document) -> Self {
        let author = Self::parse(&doc.path, &doc.content, doc.oldest().timestamp);
        if author.emails.is_empty() {
            tracing::warn!(
                "Roster entry {} lists no email; no commit can resolve to it",
                doc.path
            );
        }
        author
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e == email)
    }
}

/// Email portion of a raw `Name <email>` author string
pub fn email_of(raw_author: &str) -> &str {
    if let Some(open) = raw_author.rfind('<')
        && let Some(close) = raw_author[open..].find('>')
    {
        return raw_author[open + 1..open + close].trim();
    }
    raw_author.trim()
}

/// All known authors
#[derive(Debug, Clone, Default)]
pub struct AuthorRegistry {
    authors: Vec<Author>,
}

impl AuthorRegistry {
    pub fn new(authors: Vec<Author>) -> Self {
        Self { authors }
    }

    /// Author whose email set contains the email of `raw_author`
    pub fn find(&self, raw_author: &str) -> Option<&Author> {
        let email = email_of(raw_author);
        self.authors.iter().find(|author| author.has_email(email))
    }

    /// Like [`find`](Self::find), but a miss is an error naming the raw string
    pub fn resolve(&self, raw_author: &str) -> Result<&Author, AuthorError> {
        self.find(raw_author).ok_or_else(|| AuthorError::Unknown {
            raw: raw_author.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn into_authors(self) -> Vec<Author> {
        self.authors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn joined() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()
    }

    const PROFILE: &str = "邮箱：alice@example.com， alice@work.example.com;alice@old.example\n\
GitHub: alice\n\
\n\
---\n\
\n\
Writes about routing.\n";

    #[test]
    fn test_parse_author() {
        let author = Author::parse("authors/ Alice .md", PROFILE, joined());
        assert_eq!(author.name, "Alice");
        assert_eq!(author.join_date, joined());
        assert_eq!(
            author.emails,
            vec!["alice@example.com", "alice@work.example.com", "alice@old.example"]
        );
        assert_eq!(author.profile, "Writes about routing.");
    }

    #[test]
    fn test_parse_author_half_width_colon() {
        let author = Author::parse("Bob.md", "邮箱:bob@example.com\n", joined());
        assert_eq!(author.emails, vec!["bob@example.com"]);
    }

    #[test]
    fn test_parse_author_english_label() {
        let author = Author::parse("Carol.md", "Email: carol@example.com, \n", joined());
        assert_eq!(author.emails, vec!["carol@example.com"]);
    }

    #[test]
    fn test_parse_author_without_email_line() {
        let author = Author::parse("Dan.md", "Just a bio", joined());
        assert!(author.emails.is_empty());
    }

    #[test]
    fn test_parse_author_without_divider_keeps_whole_body() {
        let author = Author::parse("Eve.md", "  邮箱：eve@example.com\nLikes RxJS.\n", joined());
        assert_eq!(author.profile, "邮箱：eve@example.com\nLikes RxJS.");
    }

    #[test]
    fn test_email_of() {
        assert_eq!(email_of("Alice <alice@example.com>"), "alice@example.com");
        assert_eq!(email_of("alice@example.com"), "alice@example.com");
        assert_eq!(email_of("A <b> <c@example.com>"), "c@example.com");
    }

    #[test]
    fn test_registry_resolves_any_listed_email() {
        let registry = AuthorRegistry::new(vec![
            Author::parse("Alice.md", PROFILE, joined()),
            Author::parse("Bob.md", "邮箱:bob@example.com\n", joined()),
        ]);

        let alice = registry.resolve("A. Smith <alice@work.example.com>").unwrap();
        assert_eq!(alice.name, "Alice");
        let bob = registry.resolve("Bob <bob@example.com>").unwrap();
        assert_eq!(bob.name, "Bob");
    }

    #[test]
    fn test_registry_match_is_case_sensitive() {
        let registry =
            AuthorRegistry::new(vec![Author::parse("Bob.md", "邮箱:bob@example.com\n", joined())]);
        assert!(registry.find("Bob <Bob@Example.com>").is_none());
    }

    #[test]
    fn test_registry_unknown_author() {
        let registry = AuthorRegistry::default();
        let err = registry.resolve("Ghost <ghost@example.com>").unwrap_err();
        assert!(matches!(err, AuthorError::Unknown { ref raw } if raw == "Ghost <ghost@example.com>"));
    }
}
