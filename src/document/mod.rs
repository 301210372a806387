//! Tracked content files and their stable identifiers

use crate::error::{ContentError, DuplicateIdentifier, HistoryError};
use crate::git::{HistoryProvider, Revision, parse_log};
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Conventional-commit prefix such as `feat(scope): `
static COMMIT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_()]+:\s+").expect("prefix pattern is valid"));

/// Anything that is not an ASCII word character, `-` or a CJK ideograph
static UNSAFE_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\-\x{4e00}-\x{9fa5}A-Za-z0-9_]").expect("identifier pattern is valid")
});

/// First level-1 Markdown heading
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*\r?$").expect("title pattern is valid"));

const SHORT_REV_LEN: usize = 8;

/// One tracked content file plus its history
#[derive(Debug, Clone)]
pub struct Document {
    /// Repository-relative path with `/` separators
    pub path: String,
    pub identifier: String,
    pub title: String,
    /// Newest first, never empty
    pub revisions: Vec<Revision>,
    /// Current file content
    pub content: String,
}

impl Document {
    /// Revision that created the document
    pub fn oldest(&self) -> &Revision {
        // revisions is non-empty by construction
        &self.revisions[self.revisions.len() - 1]
    }

    pub fn newest(&self) -> &Revision {
        &self.revisions[0]
    }
}

/// Source of current file contents
pub trait ContentSource: Send + Sync {
    fn read(&self, path: &str) -> Result<String, ContentError>;
}

/// [`ContentSource`] reading from a directory on disk
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsContentSource {
    fn read(&self, path: &str) -> Result<String, ContentError> {
        std::fs::read_to_string(self.root.join(path)).map_err(|e| ContentError::FileReadFailed {
            file: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Derive the stable identifier of a document from its creation revision
///
/// `<first 8 chars of id>_<summary without commit prefix, unsafe chars as _>`
pub fn build_identifier(oldest: &Revision) -> String {
    let summary = COMMIT_PREFIX_RE.replace(&oldest.summary, "");
    let initial_title = UNSAFE_CHAR_RE.replace_all(&summary, "_");
    let short_rev: String = oldest.id.chars().take(SHORT_REV_LEN).collect();
    format!("{}_{}", short_rev, initial_title)
}

/// Text of the first `# ` heading, if any
pub fn extract_title(content: &str) -> Option<String> {
    TITLE_RE
        .captures(content)
        .map(|caps| caps[1].to_string())
        .filter(|title| !title.is_empty())
}

/// Load one document: history, identifier and title
pub fn load_document(
    path: &str,
    history: &dyn HistoryProvider,
    source: &dyn ContentSource,
) -> crate::error::Result<Document> {
    let log = history
        .history(path)?
        .ok_or_else(|| HistoryError::NoHistory(path.to_string()))?;

    let revisions = parse_log(&log).map_err(|e| HistoryError::Malformed {
        path: path.to_string(),
        reason: e.0,
    })?;
    let Some(oldest) = revisions.last() else {
        return Err(HistoryError::NoHistory(path.to_string()).into());
    };

    let identifier = build_identifier(oldest);
    let content = source.read(path)?;
    let title = extract_title(&content).unwrap_or_else(|| identifier.clone());

    tracing::debug!(
        "Loaded {} with {} revision(s) as {}",
        path,
        revisions.len(),
        identifier
    );

    Ok(Document {
        path: path.to_string(),
        identifier,
        title,
        revisions,
        content,
    })
}

/// Every document whose identifier was already used by an earlier one
///
/// The first occurrence of an identifier is never reported.
pub fn find_duplicate_ids(documents: &[Document]) -> Vec<DuplicateIdentifier> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter(|&doc| !seen.insert(doc.identifier.as_str()))
        .map(|doc| DuplicateIdentifier {
            identifier: doc.identifier.clone(),
            path: doc.path.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn revision(id: &str, summary: &str) -> Revision {
        Revision {
            id: id.to_string(),
            author: "Alice <alice@example.com>".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 4, 2, 0, 0).unwrap(),
            summary: summary.to_string(),
            details: String::new(),
        }
    }

    fn document(path: &str, identifier: &str) -> Document {
        Document {
            path: path.to_string(),
            identifier: identifier.to_string(),
            title: identifier.to_string(),
            revisions: vec![revision("abc", "x")],
            content: String::new(),
        }
    }

    struct MapHistory(HashMap<String, String>);

    impl HistoryProvider for MapHistory {
        fn history(&self, path: &str) -> Result<Option<String>, HistoryError> {
            Ok(self.0.get(path).cloned())
        }
    }

    struct MapContent(HashMap<String, String>);

    impl ContentSource for MapContent {
        fn read(&self, path: &str) -> Result<String, ContentError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ContentError::FileReadFailed {
                    file: path.to_string(),
                    reason: "missing".to_string(),
                })
        }
    }

    #[test]
    fn test_build_identifier_strips_commit_prefix() {
        let rev = revision("0123456789abcdef", "feat(angular): Getting started");
        assert_eq!(build_identifier(&rev), "01234567_Getting_started");
    }

    #[test]
    fn test_build_identifier_keeps_cjk_and_hyphen() {
        let rev = revision("deadbeefcafe", "docs: 初识 Angular-CLI!");
        assert_eq!(build_identifier(&rev), "deadbeef_初识_Angular-CLI_");
    }

    #[test]
    fn test_build_identifier_is_stable() {
        let rev = revision("0123456789abcdef", "Intro to routing");
        assert_eq!(build_identifier(&rev), build_identifier(&rev.clone()));
    }

    #[test]
    fn test_build_identifier_ignores_punctuation_choice() {
        let a = revision("0123456789abcdef", "Intro, to routing?");
        let b = revision("0123456789abcdef", "Intro. to routing!");
        assert_eq!(build_identifier(&a), build_identifier(&b));
    }

    #[test]
    fn test_build_identifier_short_revision() {
        let rev = revision("abc", "Hello");
        assert_eq!(build_identifier(&rev), "abc_Hello");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("intro text\n\n# Routing basics\n\nbody"),
            Some("Routing basics".to_string())
        );
        assert_eq!(extract_title("## Only a subheading\n"), None);
        assert_eq!(extract_title("no heading at all"), None);
    }

    #[test]
    fn test_find_duplicate_ids_reports_every_later_occurrence() {
        let docs = vec![
            document("a1.md", "a"),
            document("a2.md", "a"),
            document("b1.md", "b"),
            document("c1.md", "c"),
            document("c2.md", "c"),
            document("c3.md", "c"),
        ];

        let dups = find_duplicate_ids(&docs);
        let paths: Vec<_> = dups.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a2.md", "c2.md", "c3.md"]);
    }

    #[test]
    fn test_find_duplicate_ids_none() {
        let docs = vec![document("a.md", "a"), document("b.md", "b")];
        assert!(find_duplicate_ids(&docs).is_empty());
    }

    #[test]
    fn test_load_document() {
        let log = "commit 2222222222\nAuthor: Bob <bob@example.com>\nDate:   2024-02-01T00:00:00Z\n\n    Fix typo\n\n\
commit 1111111111\nAuthor: Alice <alice@example.com>\nDate:   2024-01-01T00:00:00Z\n\n    feat: Routing basics\n";
        let history = MapHistory(HashMap::from([("a/1.md".to_string(), log.to_string())]));
        let content = MapContent(HashMap::from([(
            "a/1.md".to_string(),
            "# Routing\n\ntext".to_string(),
        )]));

        let doc = load_document("a/1.md", &history, &content).unwrap();
        assert_eq!(doc.identifier, "11111111_Routing_basics");
        assert_eq!(doc.title, "Routing");
        assert_eq!(doc.revisions.len(), 2);
        assert_eq!(doc.newest().id, "2222222222");
        assert_eq!(doc.oldest().id, "1111111111");
    }

    #[test]
    fn test_load_document_title_falls_back_to_identifier() {
        let log = "commit 1111111111\nAuthor: Alice <alice@example.com>\nDate:   2024-01-01T00:00:00Z\n\n    Notes\n";
        let history = MapHistory(HashMap::from([("n.md".to_string(), log.to_string())]));
        let content = MapContent(HashMap::from([("n.md".to_string(), "plain".to_string())]));

        let doc = load_document("n.md", &history, &content).unwrap();
        assert_eq!(doc.title, doc.identifier);
    }

    #[test]
    fn test_load_document_without_history() {
        let history = MapHistory(HashMap::new());
        let content = MapContent(HashMap::new());

        let err = load_document("new.md", &history, &content).unwrap_err();
        assert!(matches!(
            err,
            BuildError::History(HistoryError::NoHistory(ref p)) if p == "new.md"
        ));
    }

    #[test]
    fn test_load_document_malformed_history() {
        let history = MapHistory(HashMap::from([(
            "bad.md".to_string(),
            "commit abc\nDate: 2024-01-01T00:00:00Z\n\n    msg".to_string(),
        )]));
        let content = MapContent(HashMap::new());

        let err = load_document("bad.md", &history, &content).unwrap_err();
        assert!(matches!(
            err,
            BuildError::History(HistoryError::Malformed { .. })
        ));
        assert!(err.is_user_error());
    }
}
