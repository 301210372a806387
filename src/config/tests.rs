use super::*;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.content.repo_root, PathBuf::from("."));
    assert_eq!(
        config.content.articles_dir,
        PathBuf::from("src/assets/content/articles")
    );
    assert_eq!(
        config.content.authors_dir,
        PathBuf::from("src/assets/content/authors")
    );
    assert_eq!(config.content.include_patterns, vec!["**/*.md"]);
    assert_eq!(config.tree.cover_title, "连载简介");
    assert_eq!(config.git.program, "git");
    assert!(config.output.path.is_none());
    assert!(!config.output.pretty);
}

#[test]
fn test_validate_valid_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_empty_cover_title() {
    let mut config = Config::default();
    config.tree.cover_title = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(BuildError::Config(ConfigError::InvalidValue { ref key, .. })) if key == "tree.cover_title"
    ));
}

#[test]
fn test_validate_empty_articles_dir() {
    let mut config = Config::default();
    config.content.articles_dir = PathBuf::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_no_include_patterns() {
    let mut config = Config::default();
    config.content.include_patterns.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_invalid_glob() {
    let mut config = Config::default();
    config.content.exclude_patterns = vec!["drafts/[".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_save_and_load() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    let mut config = Config::default();
    config.tree.cover_title = "Series overview".to_string();
    config.output.pretty = true;
    config.content.exclude_patterns = vec!["**/drafts/**".to_string()];

    config.save(path).unwrap();
    let loaded = Config::from_file(path).unwrap();

    assert_eq!(loaded.tree.cover_title, "Series overview");
    assert!(loaded.output.pretty);
    assert_eq!(loaded.content.exclude_patterns, vec!["**/drafts/**"]);
}

#[test]
fn test_partial_file_uses_defaults() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(
        temp_file.path(),
        "[content]\narticles_dir = \"docs\"\n",
    )
    .unwrap();

    let loaded = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(loaded.content.articles_dir, PathBuf::from("docs"));
    assert_eq!(
        loaded.content.authors_dir,
        PathBuf::from("src/assets/content/authors")
    );
    assert_eq!(loaded.tree.cover_title, "连载简介");
}

#[test]
fn test_load_nonexistent_file() {
    let result = Config::from_file(Path::new("/nonexistent/content-tree.toml"));
    assert!(matches!(
        result.unwrap_err(),
        BuildError::Config(ConfigError::FileNotFound(_))
    ));
}

#[test]
fn test_load_invalid_toml() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "[content\narticles_dir = ").unwrap();

    let result = Config::from_file(temp_file.path());
    assert!(matches!(
        result.unwrap_err(),
        BuildError::Config(ConfigError::ParseFailed(_))
    ));
}

#[test]
fn test_paths_join_repo_root() {
    let mut config = Config::default();
    config.content.repo_root = PathBuf::from("/site");
    assert_eq!(
        config.articles_path(),
        PathBuf::from("/site/src/assets/content/articles")
    );
    assert_eq!(
        config.authors_path(),
        PathBuf::from("/site/src/assets/content/authors")
    );
}

#[test]
fn test_apply_env_overrides() {
    // Safety: This test is single-threaded and we clean up after ourselves
    unsafe {
        std::env::set_var("CONTENT_TREE_ARTICLES_DIR", "content/posts");
        std::env::set_var("CONTENT_TREE_OUTPUT", "dist/tree.json");
    }

    let mut config = Config::default();
    config.apply_env_overrides();

    assert_eq!(config.content.articles_dir, PathBuf::from("content/posts"));
    assert_eq!(config.output.path, Some(PathBuf::from("dist/tree.json")));

    unsafe {
        std::env::remove_var("CONTENT_TREE_ARTICLES_DIR");
        std::env::remove_var("CONTENT_TREE_OUTPUT");
    }
}
