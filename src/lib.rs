//! # content-tree - Content Model Builder for Static Sites
//!
//! Reads the per-file git history of a directory of Markdown documents and
//! derives the content model a static-site renderer consumes: stable
//! identifiers, author and reviewer attribution, revision history, and a
//! tree of groups built from the directory layout.
//!
//! ## Pipeline
//!
//! ```text
//! git log --follow ──► split_log / parse_revision ──► Document (id, title)
//!                                                        │
//! roster profiles ──► AuthorRegistry ──────────────► Article::assemble
//!                                                        │
//!                                                   build_tree ──► BuildOutput
//! ```
//!
//! Every failure is fatal: malformed or missing history, an author missing
//! from the roster, or two documents sharing an identifier all abort the
//! build with a diagnostic instead of producing partial output.
//!
//! ## Modules
//!
//! - [`git`]: history providers and log parsing
//! - [`document`]: identifiers, titles, duplicate detection
//! - [`authors`]: roster parsing and author resolution
//! - [`article`]: article assembly
//! - [`tree`]: group hierarchy, covers and ordering
//! - [`builder`]: whole-build orchestration
//! - [`config`]: configuration with environment variable support
//! - [`error`]: error types and result alias
//! - [`glob_utils`]: content discovery filters
//!
//! ## Usage Example
//!
//! ```no_run
//! use content_tree::{Config, ContentBuilder};
//!
//! fn main() -> anyhow::Result<()> {
//!     let builder = ContentBuilder::new(Config::new()?)?;
//!     let output = builder.build()?;
//!     println!("{}", output.to_json(true)?);
//!     Ok(())
//! }
//! ```

/// Article assembly from documents and the author roster
pub mod article;

/// Author roster and identity resolution
pub mod authors;

/// Whole-build orchestration and output
pub mod builder;

/// Configuration management with environment variable overrides
pub mod config;

/// Tracked documents and their identifiers
pub mod document;

/// Error types and utilities
pub mod error;

/// Git history access and log parsing
pub mod git;

/// Glob filters for content discovery
pub mod glob_utils;

/// Article tree building
pub mod tree;

pub use article::{Article, ArticleHistory};
pub use authors::{Author, AuthorRegistry};
pub use builder::{BuildOutput, BuildStats, ContentBuilder};
pub use config::Config;
pub use document::{ContentSource, Document, FsContentSource};
pub use error::{BuildError, Result};
pub use git::{GitCliHistory, HistoryProvider, Revision};
pub use tree::{Group, TreeNode, build_tree};
