//! Hierarchical grouping of articles by directory
//!
//! Groups are derived from the distinct article paths. Each group may promote
//! one cover article (filename order 0) to supply its title, id and summary.
//! Creation dates propagate upward as the minimum over children.
//!
//! Ordering:
//! - the root group orders its children by ascending creation date
//! - deeper groups order articles by filename order and sub-groups by
//!   creation date, merging the two runs by creation date

use crate::article::Article;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A directory node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Cumulative `/`-prefixed path; `""` for the root
    pub path: String,
    pub title: String,
    /// Id of the cover article, if the group has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Content of the cover article, if the group has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Earliest creation date among the children; unset only for an empty tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    pub level: usize,
    pub children: Vec<TreeNode>,
}

/// Child of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeNode {
    Group(Group),
    Article(Article),
}

impl TreeNode {
    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        match self {
            TreeNode::Group(group) => group.creation_date,
            TreeNode::Article(article) => Some(article.creation_date),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            TreeNode::Group(group) => Some(group),
            TreeNode::Article(_) => None,
        }
    }

    pub fn as_article(&self) -> Option<&Article> {
        match self {
            TreeNode::Group(_) => None,
            TreeNode::Article(article) => Some(article),
        }
    }
}

/// Counts over a built tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Groups including the root
    pub groups: usize,
    pub articles: usize,
    pub covers: usize,
}

impl Group {
    fn new(path: String, title: String, level: usize) -> Self {
        Self {
            path,
            title,
            id: None,
            summary: None,
            creation_date: None,
            level,
            children: Vec::new(),
        }
    }

    /// Direct sub-groups
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(TreeNode::as_group)
    }

    /// Direct articles
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.children.iter().filter_map(TreeNode::as_article)
    }

    /// Group with the given path anywhere below (or at) this one
    pub fn find_group(&self, path: &str) -> Option<&Group> {
        if same_path(&self.path, path) {
            return Some(self);
        }
        self.groups().find_map(|group| group.find_group(path))
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            groups: 1,
            ..TreeStats::default()
        };
        for child in &self.children {
            match child {
                TreeNode::Group(group) => {
                    let sub = group.stats();
                    stats.groups += sub.groups;
                    stats.articles += sub.articles;
                    stats.covers += sub.covers;
                }
                TreeNode::Article(article) => {
                    stats.articles += 1;
                    if article.is_cover {
                        stats.covers += 1;
                    }
                }
            }
        }
        stats
    }

    /// Insert the groups for `path` and every ancestor of it
    fn ensure_path(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let path = format!("{}/{}", self.path, first);

        let index = match self
            .children
            .iter()
            .position(|child| matches!(child, TreeNode::Group(g) if g.path == path))
        {
            Some(index) => index,
            None => {
                let group = Group::new(path, first.to_string(), self.level + 1);
                self.children.push(TreeNode::Group(group));
                self.children.len() - 1
            }
        };

        if let TreeNode::Group(child) = &mut self.children[index] {
            child.ensure_path(rest);
        }
    }
}

/// Build the article tree
///
/// Every article gets its `level` (and `is_cover` / cover title) assigned in
/// `articles` as well as in the returned tree, so the flat list and the tree
/// agree. The result is rooted at the articles directory (`path == ""`).
pub fn build_tree(articles: &mut [Article], cover_title: &str) -> Group {
    let dir_list: BTreeSet<&str> = articles.iter().map(|a| a.path.as_str()).collect();

    let mut root = Group::new(String::new(), String::new(), 0);
    for dir in &dir_list {
        let segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
        root.ensure_path(&segments);
    }

    add_articles_to_group(&mut root, articles, cover_title);
    fill_creation_date(&mut root);
    sort_group(&mut root);

    let stats = root.stats();
    tracing::info!(
        "Built article tree: {} group(s), {} article(s), {} cover(s)",
        stats.groups,
        stats.articles,
        stats.covers
    );
    root
}

fn same_path(a: &str, b: &str) -> bool {
    a.trim_start_matches('/') == b.trim_start_matches('/')
}

/// Post-order: sub-groups take their articles before the group does
fn add_articles_to_group(group: &mut Group, articles: &mut [Article], cover_title: &str) {
    for child in group.children.iter_mut() {
        if let TreeNode::Group(sub) = child {
            add_articles_to_group(sub, articles, cover_title);
        }
    }

    let group_path = group.path.clone();
    let mut cover_found = false;
    for article in articles.iter_mut().filter(|a| same_path(&a.path, &group_path)) {
        article.level = group.level + 1;

        if article.order_id() == 0 {
            if cover_found {
                tracing::warn!(
                    "Group '{}' has several cover candidates; {} stays a plain article",
                    group_path,
                    article.filename
                );
            } else {
                cover_found = true;
                article.is_cover = true;
                group.title = std::mem::replace(&mut article.title, cover_title.to_string());
                group.id = Some(article.id.clone());
                group.summary = Some(article.content.clone());
            }
        }

        group.children.push(TreeNode::Article(article.clone()));
    }
}

/// Post-order: a group's date is the minimum over its direct children
fn fill_creation_date(group: &mut Group) {
    for child in group.children.iter_mut() {
        if let TreeNode::Group(sub) = child {
            fill_creation_date(sub);
        }
    }
    group.creation_date = group
        .children
        .iter()
        .filter_map(TreeNode::creation_date)
        .min();
}

fn sort_group(group: &mut Group) {
    let children = std::mem::take(&mut group.children);
    group.children = if group.level == 0 {
        let mut children = children;
        children.sort_by_key(TreeNode::creation_date);
        children
    } else {
        sort_by_filename(children)
    };

    for child in group.children.iter_mut() {
        if let TreeNode::Group(sub) = child {
            sort_group(sub);
        }
    }
}

/// Articles by filename order, sub-groups by creation date, merged by date
///
/// Comparing an article with a group by date while comparing two articles by
/// filename is not a total order, so the two runs are sorted separately and
/// merged: a group goes before an article only if it was created earlier.
fn sort_by_filename(children: Vec<TreeNode>) -> Vec<TreeNode> {
    let (mut articles, mut groups): (Vec<TreeNode>, Vec<TreeNode>) = children
        .into_iter()
        .partition(|child| matches!(child, TreeNode::Article(_)));

    articles.sort_by_key(|child| child.as_article().map_or(0, Article::order_id));
    groups.sort_by_key(TreeNode::creation_date);

    let mut merged = Vec::with_capacity(articles.len() + groups.len());
    let mut articles = articles.into_iter().peekable();
    let mut groups = groups.into_iter().peekable();
    loop {
        let take_group = match (articles.peek(), groups.peek()) {
            (Some(article), Some(group)) => group.creation_date() < article.creation_date(),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_group {
            groups.next()
        } else {
            articles.next()
        };
        merged.extend(next);
    }
    merged
}
