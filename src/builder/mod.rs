//! Whole-build orchestration
//!
//! A build discovers content files, loads their histories in parallel,
//! aborts on identifier collisions, resolves authors, assembles articles and
//! finally builds the article tree. Every error is fatal and nothing is
//! written unless the whole build succeeds.

use crate::article::Article;
use crate::authors::{Author, AuthorRegistry};
use crate::config::Config;
use crate::document::{ContentSource, Document, FsContentSource, find_duplicate_ids, load_document};
use crate::error::{BuildError, ContentError, Result};
use crate::git::{GitCliHistory, HistoryProvider};
use crate::glob_utils::PathFilter;
use crate::tree::{Group, TreeStats, build_tree};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Everything handed to the renderer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildOutput {
    /// Article tree rooted at the articles directory
    pub root: Group,
    /// Flat article list, most recently changed first
    pub articles: Vec<Article>,
    pub authors: Vec<Author>,
}

/// Counts reported after a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub articles: usize,
    pub authors: usize,
    pub groups: usize,
    pub covers: usize,
}

impl BuildOutput {
    pub fn stats(&self) -> BuildStats {
        let TreeStats { groups, covers, .. } = self.root.stats();
        BuildStats {
            articles: self.articles.len(),
            authors: self.authors.len(),
            groups,
            covers,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| ContentError::SerializeFailed(e.to_string()).into())
    }

    /// Serialize fully, then write, so a failed build leaves no partial file
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        tracing::info!("Wrote build output to {}", path.display());
        Ok(())
    }
}

/// Runs content builds against a history provider and a content source
pub struct ContentBuilder {
    config: Config,
    history: Box<dyn HistoryProvider>,
    source: Box<dyn ContentSource>,
}

impl ContentBuilder {
    /// Builder reading history through `git` and files from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the repository
    /// root is not inside a git work tree.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let root = config.content.repo_root.clone();
        let history = GitCliHistory::discover(&root, config.git.program.clone())?;
        Ok(Self::with_providers(
            config,
            Box::new(history),
            Box::new(FsContentSource::new(root)),
        ))
    }

    /// Builder with custom collaborators
    pub fn with_providers(
        config: Config,
        history: Box<dyn HistoryProvider>,
        source: Box<dyn ContentSource>,
    ) -> Self {
        tracing::debug!("Articles dir: {}", config.content.articles_dir.display());
        tracing::debug!("Authors dir: {}", config.content.authors_dir.display());
        Self {
            config,
            history,
            source,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Content files below `base`, as sorted repository-relative paths with
    /// `/` separators
    ///
    /// Include and exclude patterns are matched against the
    /// repository-relative path.
    pub fn discover(&self, base: &Path) -> Result<Vec<String>> {
        if !base.is_dir() {
            return Err(ContentError::DirectoryNotFound(base.display().to_string()).into());
        }

        let repo_root = &self.config.content.repo_root;
        let filter = PathFilter::new(
            &self.config.content.include_patterns,
            &self.config.content.exclude_patterns,
        )?;

        let mut paths = Vec::new();
        for entry in WalkDir::new(base).follow_links(true) {
            let entry = entry.map_err(|e| ContentError::WalkFailed(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = relative_slash_path(entry.path(), repo_root);
            if !filter.matches(&path) {
                tracing::debug!("Skipping {}", path);
                continue;
            }
            paths.push(path);
        }

        paths.sort();
        tracing::info!("Discovered {} content file(s) in {}", paths.len(), base.display());
        Ok(paths)
    }

    /// Load documents in parallel, most recently changed first
    pub fn load_documents(&self, paths: &[String]) -> Result<Vec<Document>> {
        let history = self.history.as_ref();
        let source = self.source.as_ref();

        let mut documents = paths
            .par_iter()
            .map(|path| load_document(path, history, source))
            .collect::<Result<Vec<_>>>()?;

        documents.sort_by(|a, b| {
            b.newest()
                .timestamp
                .cmp(&a.newest().timestamp)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(documents)
    }

    /// Load the roster from the given profile documents
    pub fn build_authors(&self, paths: &[String]) -> Result<AuthorRegistry> {
        let authors: Vec<Author> = self
            .load_documents(paths)?
            .iter()
            .map(Author::from_document)
            .collect();
        let registry = AuthorRegistry::new(authors);
        if registry.is_empty() {
            tracing::warn!("Author roster is empty");
        } else {
            tracing::info!("Loaded {} author(s)", registry.len());
        }
        Ok(registry)
    }

    /// Load and assemble the given article documents
    ///
    /// Aborts with every colliding identifier if any two documents share one.
    pub fn build_articles(&self, paths: &[String], authors: &AuthorRegistry) -> Result<Vec<Article>> {
        let documents = self.load_documents(paths)?;

        let duplicates = find_duplicate_ids(&documents);
        if !duplicates.is_empty() {
            for dup in &duplicates {
                tracing::error!("Duplicate id {} at {}", dup.identifier, dup.path);
            }
            return Err(BuildError::DuplicateIdentifiers(duplicates));
        }

        let articles_dir = &self.config.content.articles_dir;
        let articles = documents
            .iter()
            .map(|doc| Article::assemble(doc, authors, articles_dir))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::info!("Assembled {} article(s)", articles.len());
        Ok(articles)
    }

    /// Build from explicit file lists instead of directory discovery
    pub fn build_from_paths(&self, article_paths: &[String], author_paths: &[String]) -> Result<BuildOutput> {
        let authors = self.build_authors(author_paths)?;
        let mut articles = self.build_articles(article_paths, &authors)?;
        let root = build_tree(&mut articles, &self.config.tree.cover_title);

        Ok(BuildOutput {
            root,
            articles,
            authors: authors.into_authors(),
        })
    }

    /// Run a full build over the configured directories
    pub fn build(&self) -> Result<BuildOutput> {
        let start = Instant::now();

        let author_paths = self.discover(&self.config.authors_path())?;
        let article_paths = self.discover(&self.config.articles_path())?;
        let output = self.build_from_paths(&article_paths, &author_paths)?;

        let stats = output.stats();
        tracing::info!(
            "Build finished in {}ms: {} article(s), {} author(s), {} group(s), {} cover(s)",
            start.elapsed().as_millis(),
            stats.articles,
            stats.authors,
            stats.groups,
            stats.covers
        );
        Ok(output)
    }
}

fn relative_slash_path(path: &Path, base: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(base).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
