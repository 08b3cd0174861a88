// Policy domain models - the effective moderation configuration for one
// repository.
//
// These are pure domain types with no platform or YAML dependencies.
// The schema pass in `policy_schema.rs` builds them from raw config.

/// Hard ceiling on mutating actions per sweep, regardless of what
/// `limitPerRun` asks for.
pub const MAX_ACTIONS_PER_RUN: u32 = 30;

pub(crate) const DEFAULT_PROFANITY_LABEL: &str = "inappropriate";

pub(crate) const DEFAULT_MARK_COMMENT: &str = "This issue has been automatically \
     marked as inappropriate because it contains forbidden words. It will be \
     closed if no further edit occurs. Thank you for your contributions.";

/// Which content type an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Issues,
    Pulls,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Issues => "issues",
            ItemType::Pulls => "pulls",
        }
    }
}

/// Fully-defaulted values for every per-type-resolvable policy key.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyValues {
    /// Dry-run switch: when false, actions are decided and logged but
    /// never executed.
    pub perform: bool,
    /// Rewrite offending text in place instead of labeling.
    pub censor: bool,
    /// Glyph used to replace the characters of a forbidden word.
    pub placeholder: char,
    /// Label applied when marking an item.
    pub profanity_label: String,
    /// Comment posted when marking; `None` disables the comment.
    pub mark_comment: Option<String>,
    pub unmark_comment: Option<String>,
    pub close_comment: Option<String>,
    /// Days of inactivity before a marked item is closed; `None` means
    /// marked items are never auto-closed.
    pub days_until_close: Option<f64>,
    /// Items carrying any of these labels are never swept.
    pub exempt_labels: Vec<String>,
    pub exempt_projects: bool,
    pub exempt_milestones: bool,
    /// Requested ceiling on mutating actions per sweep (1..=30).
    pub limit_per_run: u32,
}

impl Default for PolicyValues {
    fn default() -> Self {
        Self {
            perform: true,
            censor: false,
            placeholder: '*',
            profanity_label: DEFAULT_PROFANITY_LABEL.to_string(),
            mark_comment: Some(DEFAULT_MARK_COMMENT.to_string()),
            unmark_comment: None,
            close_comment: None,
            days_until_close: Some(2.0),
            exempt_labels: Vec::new(),
            exempt_projects: false,
            exempt_milestones: false,
            limit_per_run: MAX_ACTIONS_PER_RUN,
        }
    }
}

/// Per-type (`issues` / `pulls`) partial override of [`PolicyValues`].
///
/// The outer `Option` records whether the key appeared in the override
/// block at all; for the comment and close-threshold keys the inner
/// `Option` is the configured value, `None` when disabled with `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyOverride {
    pub perform: Option<bool>,
    pub censor: Option<bool>,
    pub placeholder: Option<char>,
    pub profanity_label: Option<String>,
    pub mark_comment: Option<Option<String>>,
    pub unmark_comment: Option<Option<String>>,
    pub close_comment: Option<Option<String>>,
    pub days_until_close: Option<Option<f64>>,
    pub exempt_labels: Option<Vec<String>>,
    pub exempt_projects: Option<bool>,
    pub exempt_milestones: Option<bool>,
    pub limit_per_run: Option<u32>,
}

/// The validated, immutable policy for one repository and one invocation.
///
/// Key lookups resolve through the type-specific override first and fall
/// back to the top-level value, as a pure function over both layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    pub base: PolicyValues,
    pub issues: PolicyOverride,
    pub pulls: PolicyOverride,
    /// Restricts processing to one content type when set.
    pub only: Option<ItemType>,
    /// Additional forbidden terms fed to the profanity filter.
    pub extra_words: Vec<String>,
    /// Terms removed from the filter's built-in list.
    pub exempt_words: Vec<String>,
}

impl Policy {
    /// The stand-in policy for a repository without configuration: all
    /// defaults, but nothing is ever performed.
    pub fn disabled() -> Self {
        Self {
            base: PolicyValues {
                perform: false,
                ..PolicyValues::default()
            },
            ..Self::default()
        }
    }

    fn scoped(&self, scope: ItemType) -> &PolicyOverride {
        match scope {
            ItemType::Issues => &self.issues,
            ItemType::Pulls => &self.pulls,
        }
    }

    pub fn perform(&self, scope: ItemType) -> bool {
        self.scoped(scope).perform.unwrap_or(self.base.perform)
    }

    pub fn censor(&self, scope: ItemType) -> bool {
        self.scoped(scope).censor.unwrap_or(self.base.censor)
    }

    pub fn placeholder(&self, scope: ItemType) -> char {
        self.scoped(scope).placeholder.unwrap_or(self.base.placeholder)
    }

    pub fn profanity_label(&self, scope: ItemType) -> &str {
        self.scoped(scope)
            .profanity_label
            .as_deref()
            .unwrap_or(&self.base.profanity_label)
    }

    pub fn mark_comment(&self, scope: ItemType) -> Option<&str> {
        match &self.scoped(scope).mark_comment {
            Some(value) => value.as_deref(),
            None => self.base.mark_comment.as_deref(),
        }
    }

    pub fn unmark_comment(&self, scope: ItemType) -> Option<&str> {
        match &self.scoped(scope).unmark_comment {
            Some(value) => value.as_deref(),
            None => self.base.unmark_comment.as_deref(),
        }
    }

    pub fn close_comment(&self, scope: ItemType) -> Option<&str> {
        match &self.scoped(scope).close_comment {
            Some(value) => value.as_deref(),
            None => self.base.close_comment.as_deref(),
        }
    }

    pub fn days_until_close(&self, scope: ItemType) -> Option<f64> {
        match self.scoped(scope).days_until_close {
            Some(value) => value,
            None => self.base.days_until_close,
        }
    }

    pub fn exempt_labels(&self, scope: ItemType) -> &[String] {
        self.scoped(scope)
            .exempt_labels
            .as_deref()
            .unwrap_or(&self.base.exempt_labels)
    }

    pub fn exempt_projects(&self, scope: ItemType) -> bool {
        self.scoped(scope)
            .exempt_projects
            .unwrap_or(self.base.exempt_projects)
    }

    pub fn exempt_milestones(&self, scope: ItemType) -> bool {
        self.scoped(scope)
            .exempt_milestones
            .unwrap_or(self.base.exempt_milestones)
    }

    pub fn limit_per_run(&self, scope: ItemType) -> u32 {
        self.scoped(scope)
            .limit_per_run
            .unwrap_or(self.base.limit_per_run)
    }
}
