/// Configuration system for content-tree
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{BuildError, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "content-tree.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Content locations and discovery patterns
    #[serde(default)]
    pub content: ContentConfig,

    /// Tree building options
    #[serde(default)]
    pub tree: TreeConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,

    /// Version-control tool options
    #[serde(default)]
    pub git: GitConfig,
}

/// Content locations, relative to the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Repository work tree that holds the content
    #[serde(default = "default_repo_root")]
    pub repo_root: PathBuf,

    /// Directory holding the articles; stripped from every group path
    #[serde(default = "default_articles_dir")]
    pub articles_dir: PathBuf,

    /// Directory holding one profile document per author
    #[serde(default = "default_authors_dir")]
    pub authors_dir: PathBuf,

    /// Glob patterns a content file must match, against its
    /// repository-relative path
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Glob patterns that exclude a content file, against its
    /// repository-relative path
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Tree building configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Title given to a cover article once its own title moves to its group
    #[serde(default = "default_cover_title")]
    pub cover_title: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Output file; stdout when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[serde(default)]
    pub pretty: bool,
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Git executable used to read per-file history
    #[serde(default = "default_git_program")]
    pub program: String,
}

fn default_repo_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_articles_dir() -> PathBuf {
    PathBuf::from("src/assets/content/articles")
}

fn default_authors_dir() -> PathBuf {
    PathBuf::from("src/assets/content/authors")
}

fn default_include_patterns() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

fn default_cover_title() -> String {
    "连载简介".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            repo_root: default_repo_root(),
            articles_dir: default_articles_dir(),
            authors_dir: default_authors_dir(),
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            cover_title: default_cover_title(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `content-tree.toml` from the working directory, or defaults
    pub fn load_or_default() -> Result<Self, BuildError> {
        let config_path = Path::new(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), BuildError> {
        for (key, dir) in [
            ("content.articles_dir", &self.content.articles_dir),
            ("content.authors_dir", &self.content.authors_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(invalid(key, "must not be empty"));
            }
        }

        if self.content.include_patterns.is_empty() {
            return Err(invalid(
                "content.include_patterns",
                "must contain at least one pattern",
            ));
        }

        for pattern in self
            .content
            .include_patterns
            .iter()
            .chain(&self.content.exclude_patterns)
        {
            if let Err(e) = globset::Glob::new(pattern) {
                return Err(invalid(
                    "content.include_patterns",
                    &format!("invalid glob '{}': {}", pattern, e),
                ));
            }
        }

        if self.tree.cover_title.trim().is_empty() {
            return Err(invalid("tree.cover_title", "must not be empty"));
        }

        if self.git.program.trim().is_empty() {
            return Err(invalid("git.program", "must not be empty"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("CONTENT_TREE_REPO_ROOT") {
            self.content.repo_root = PathBuf::from(root);
        }

        if let Ok(dir) = std::env::var("CONTENT_TREE_ARTICLES_DIR") {
            self.content.articles_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("CONTENT_TREE_AUTHORS_DIR") {
            self.content.authors_dir = PathBuf::from(dir);
        }

        if let Ok(path) = std::env::var("CONTENT_TREE_OUTPUT") {
            self.output.path = Some(PathBuf::from(path));
        }

        if let Ok(program) = std::env::var("CONTENT_TREE_GIT") {
            self.git.program = program;
        }
    }

    /// Create a new Config from the default file with environment overrides
    pub fn new() -> Result<Self, BuildError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Absolute-or-relative location of the articles directory
    pub fn articles_path(&self) -> PathBuf {
        self.content.repo_root.join(&self.content.articles_dir)
    }

    /// Absolute-or-relative location of the authors directory
    pub fn authors_path(&self) -> PathBuf {
        self.content.repo_root.join(&self.content.authors_dir)
    }
}

fn invalid(key: &str, reason: &str) -> BuildError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests;
