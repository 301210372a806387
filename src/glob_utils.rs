//! Glob pattern matching utilities for content discovery

use crate::error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Include/exclude filter over paths relative to a content directory
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathFilter {
    /// Compile include and exclude patterns
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: compile_patterns("content.include_patterns", include_patterns)?,
            exclude: compile_patterns("content.exclude_patterns", exclude_patterns)?,
        })
    }

    /// A path matches when it hits an include pattern and no exclude pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use content_tree::glob_utils::PathFilter;
    ///
    /// let filter = PathFilter::new(&["**/*.md".to_string()], &["drafts/**".to_string()]).unwrap();
    /// assert!(filter.matches("guide/01-intro.md"));
    /// assert!(filter.matches("index.md"));
    /// assert!(!filter.matches("drafts/wip.md"));
    /// assert!(!filter.matches("guide/logo.png"));
    /// ```
    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}

fn compile_patterns(key: &str, patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("invalid glob '{}': {}", pattern, e),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
