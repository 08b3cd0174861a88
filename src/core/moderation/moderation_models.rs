// Moderation domain models - data structures for the mark-and-sweep engine.
//
// These are pure domain types with no HTTP or wire-format dependencies.

use chrono::{DateTime, Utc};

/// Identifies a repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses an `owner/repo` slug.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, repo) = raw.trim().split_once('/')?;
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(owner, repo))
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Whether an item is open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Open,
    Closed,
}

/// One issue or pull request as observed on the platform. The engine
/// never creates or destroys items; it only mutates their labels, text,
/// state and comment bodies through the platform client.
#[derive(Debug, Clone)]
pub struct Item {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub state: ItemState,
    pub locked: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}

/// A comment on an item.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: u64,
    pub body: String,
}

/// Redacted replacement text for one offending comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRedaction {
    pub id: u64,
    pub body: String,
}

/// Redactions for the text fields of one item; a field is present iff
/// the detector flagged it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffenseResult {
    pub title: Option<String>,
    pub body: Option<String>,
    pub comments: Vec<CommentRedaction>,
}

impl OffenseResult {
    /// An item is offending iff at least one field needed redaction.
    pub fn is_offending(&self) -> bool {
        self.title.is_some() || self.body.is_some() || !self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_repo_slugs() {
        let repo = RepoRef::parse(" octo/sandbox ").expect("slug should parse");
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.repo, "sandbox");
        assert_eq!(repo.slug(), "octo/sandbox");
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(RepoRef::parse("justowner").is_none());
        assert!(RepoRef::parse("owner/").is_none());
        assert!(RepoRef::parse("/repo").is_none());
        assert!(RepoRef::parse("a/b/c").is_none());
    }

    #[test]
    fn empty_offense_result_is_clean() {
        assert!(!OffenseResult::default().is_offending());
        let offending = OffenseResult {
            title: Some("****".to_string()),
            ..OffenseResult::default()
        };
        assert!(offending.is_offending());
    }
}
