//! Fully attributed content records

use crate::authors::AuthorRegistry;
use crate::document::Document;
use crate::error::AuthorError;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of an article's change history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleHistory {
    pub date: DateTime<Utc>,
    pub summary: String,
    pub details: String,
    /// Display name of the resolved author
    pub author: String,
}

/// A document ready for publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    /// Directory below the articles root, `/`-prefixed; empty at top level
    pub path: String,
    pub filename: String,
    pub creation_date: DateTime<Utc>,
    /// Only set for documents with more than one revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub content: String,
    /// Newest first
    pub history: Vec<ArticleHistory>,
    pub author: String,
    /// Everyone else who changed the article, in history order
    pub reviewers: Vec<String>,
    /// Depth in the tree; assigned by the tree builder
    pub level: usize,
    pub is_cover: bool,
}

impl Article {
    /// Assemble an article from a loaded document
    ///
    /// `articles_dir` is the repository-relative directory holding all
    /// articles; it is stripped when deriving the group path.
    pub fn assemble(
        doc: &Document,
        authors: &AuthorRegistry,
        articles_dir: &Path,
    ) -> Result<Self, AuthorError> {
        let oldest = doc.oldest();
        let creation_date = oldest.timestamp;
        // one revision means creation and last update are the same event
        let last_updated = (doc.revisions.len() > 1).then(|| doc.newest().timestamp);

        let history = doc
            .revisions
            .iter()
            .map(|rev| -> Result<ArticleHistory, AuthorError> {
                Ok(ArticleHistory {
                    date: rev.timestamp,
                    summary: rev.summary.clone(),
                    details: rev.details.clone(),
                    author: authors.resolve(&rev.author)?.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let author = authors.resolve(&oldest.author)?.name.clone();

        let mut reviewers: Vec<String> = Vec::new();
        for entry in &history {
            if entry.author != author && !reviewers.contains(&entry.author) {
                reviewers.push(entry.author.clone());
            }
        }

        Ok(Self {
            id: doc.identifier.clone(),
            title: doc.title.clone(),
            path: group_path_of(&doc.path, articles_dir),
            filename: filename_of(&doc.path),
            creation_date,
            last_updated,
            content: doc.content.clone(),
            history,
            author,
            reviewers,
            level: 0,
            is_cover: false,
        })
    }

    /// Leading decimal digits of the filename; files without any count as 0
    pub fn order_id(&self) -> u64 {
        order_id_of(&self.filename)
    }
}

/// Group path of a document: its directory below `articles_dir`
///
/// `articles/a/b/01-x.md` becomes `/a/b`; a file directly in
/// `articles_dir` belongs to the top-level group `""`.
pub fn group_path_of(path: &str, articles_dir: &Path) -> String {
    let prefix = articles_dir.to_string_lossy().replace('\\', "/");
    let prefix = prefix.trim_start_matches("./").trim_end_matches('/');
    let relative = path.trim_start_matches("./");
    let relative = relative
        .strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(relative);

    let mut segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();

    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Last segment of a `/`-separated path
pub fn filename_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Value of a filename's leading digits; 0 when it has none
pub fn order_id_of(filename: &str) -> u64 {
    let digits: &str = filename
        .find(|c: char| !c.is_ascii_digit())
        .map_or(filename, |end| &filename[..end]);
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}
