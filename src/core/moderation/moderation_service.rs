// Moderation engine - core business logic for marking, censoring,
// closing and unmarking items.
//
// One service instance is scoped to a single repository and a single
// resolved policy. Each sweep owns one ActionBudget that both candidate
// pipelines share; the event-triggered path gets a fresh budget per call.
//
// NO platform or HTTP dependencies here - everything flows through the
// PlatformClient port.

use chrono::Utc;
use tracing::{info, trace, warn};

use crate::core::detector::{ProfanityFilter, RedactMode};
use crate::core::policy::{ItemType, Policy, MAX_ACTIONS_PER_RUN};

use super::action_budget::ActionBudget;
use super::moderation_models::{
    Comment, CommentRedaction, Item, ItemState, OffenseResult, RepoRef,
};
use super::platform::{PlatformClient, PlatformError};
use super::search_query;

/// Color the moderation label is created with when missing.
const LABEL_COLOR: &str = "dc3023";

/// Drives the moderation state machine for one repository.
pub struct ModerationService<C: PlatformClient, F: ProfanityFilter> {
    client: C,
    filter: F,
    repo: RepoRef,
    policy: Policy,
}

impl<C, F> ModerationService<C, F>
where
    C: PlatformClient,
    F: ProfanityFilter,
{
    pub fn new(client: C, filter: F, repo: RepoRef, policy: Policy) -> Self {
        Self {
            client,
            filter,
            repo,
            policy,
        }
    }

    // ========================================================================
    // SWEEP ORCHESTRATION
    // ========================================================================

    /// One scheduled batch pass over the repository's open items of one
    /// content type.
    ///
    /// Issues the offense-candidate and closable-candidate searches and
    /// drives every surviving item through the evaluator. Both pipelines
    /// share a single action budget, and one item's failure never aborts
    /// its siblings. In dry-run the same decisions are computed and
    /// logged, with no mutating call issued.
    pub async fn mark_and_sweep(&self, scope: ItemType) -> Result<(), PlatformError> {
        if self.policy.only.is_some_and(|only| only != scope) {
            return Ok(());
        }

        info!(
            owner = %self.repo.owner,
            repo = %self.repo.repo,
            scope = scope.as_str(),
            "starting mark and sweep"
        );

        let budget = ActionBudget::new(self.policy.limit_per_run(scope));
        let page_size = self.policy.limit_per_run(scope).min(MAX_ACTIONS_PER_RUN);

        // Creating the label is itself a mutation, so dry-run skips it.
        if self.policy.perform(scope) {
            self.ensure_label_exists(scope).await?;
        }

        let offense_pass = async {
            let query = search_query::offense_query(&self.repo, &self.policy, scope);
            match self.client.search_items(&query, page_size).await {
                Ok(items) => {
                    for item in items.iter().filter(|item| !item.locked) {
                        if let Err(err) = self.target_item(scope, item, None, &budget).await {
                            warn!(number = item.number, %err, "failed to moderate item");
                        }
                    }
                }
                Err(err) => warn!(%err, "offense candidate search failed"),
            }
        };

        let close_pass = async {
            let Some(days) = self.policy.days_until_close(scope) else {
                trace!(
                    owner = %self.repo.owner,
                    repo = %self.repo.repo,
                    "configured to leave marked items open"
                );
                return;
            };
            trace!(
                owner = %self.repo.owner,
                repo = %self.repo.repo,
                "configured to close marked items"
            );
            let query =
                search_query::closable_query(&self.repo, &self.policy, scope, days, Utc::now());
            match self.client.search_items(&query, page_size).await {
                Ok(items) => {
                    for item in items.iter().filter(|item| !item.locked) {
                        if let Err(err) = self.close(scope, item, &budget).await {
                            warn!(number = item.number, %err, "failed to close item");
                        }
                    }
                }
                Err(err) => warn!(%err, "closable candidate search failed"),
            }
        };

        tokio::join!(offense_pass, close_pass);
        Ok(())
    }

    // ========================================================================
    // ITEM EVALUATOR
    // ========================================================================

    /// Event-triggered single-item pass: removes the moderation label
    /// from a marked, open item whose text has been edited clean.
    ///
    /// `labeling_event` must be true when the triggering event is the
    /// label addition itself, so a fresh mark is not immediately undone.
    /// Locked items are not filtered here: the edit predates the lock.
    pub async fn evaluate_and_act(
        &self,
        scope: ItemType,
        item: &Item,
        comments: Option<&[Comment]>,
        labeling_event: bool,
    ) -> Result<(), PlatformError> {
        if labeling_event
            || item.state != ItemState::Open
            || !item.has_label(self.policy.profanity_label(scope))
        {
            return Ok(());
        }
        if self.offense_result(item, comments).is_offending() {
            return Ok(());
        }

        // Only sweeps share a budget; the event path owns a fresh one.
        let budget = ActionBudget::new(self.policy.limit_per_run(scope));
        self.unmark(scope, item, &budget).await
    }

    /// Censor-or-mark dispatch for one offense candidate. Comments are
    /// fetched lazily, and only when censoring is on for this type.
    async fn target_item(
        &self,
        scope: ItemType,
        item: &Item,
        comments: Option<&[Comment]>,
        budget: &ActionBudget,
    ) -> Result<(), PlatformError> {
        if self.policy.censor(scope) {
            let fetched;
            let comments = match comments {
                Some(comments) => comments,
                None => {
                    fetched = self.client.list_comments(&self.repo, item.number).await?;
                    &fetched
                }
            };
            self.censor(scope, item, comments, budget).await
        } else {
            self.mark(scope, item, budget).await
        }
    }

    /// Runs the detector over every text field of the item. Titles render
    /// as plain text, bodies and comments as markdown.
    fn offense_result(&self, item: &Item, comments: Option<&[Comment]>) -> OffenseResult {
        let title = self
            .filter
            .is_offending(&item.title)
            .then(|| self.filter.redact(&item.title, RedactMode::Plain));
        let body = self
            .filter
            .is_offending(&item.body)
            .then(|| self.filter.redact(&item.body, RedactMode::Markdown));
        let comments = comments
            .unwrap_or(&[])
            .iter()
            .filter(|comment| self.filter.is_offending(&comment.body))
            .map(|comment| CommentRedaction {
                id: comment.id,
                body: self.filter.redact(&comment.body, RedactMode::Markdown),
            })
            .collect();

        OffenseResult {
            title,
            body,
            comments,
        }
    }

    /// Marks an offending item: posts the mark comment (if configured),
    /// then adds the moderation label.
    async fn mark(
        &self,
        scope: ItemType,
        item: &Item,
        budget: &ActionBudget,
    ) -> Result<(), PlatformError> {
        if !self.offense_result(item, None).is_offending() {
            return Ok(());
        }
        if !budget.try_consume() {
            info!(number = item.number, "skipping mark, action budget exhausted");
            return Ok(());
        }
        if !self.policy.perform(scope) {
            info!(
                owner = %self.repo.owner,
                repo = %self.repo.repo,
                number = item.number,
                "would have been marked (dry run)"
            );
            return Ok(());
        }

        info!(
            owner = %self.repo.owner,
            repo = %self.repo.repo,
            number = item.number,
            "marking item"
        );
        if let Some(comment) = self.policy.mark_comment(scope) {
            self.client
                .create_comment(&self.repo, item.number, comment)
                .await?;
        }
        self.client
            .add_label(&self.repo, item.number, self.policy.profanity_label(scope))
            .await
    }

    /// Rewrites every offending field of the item in place. The sub-edits
    /// touch disjoint fields, so a failure in one must not stop the
    /// others; the first failure is reported once all have been attempted.
    async fn censor(
        &self,
        scope: ItemType,
        item: &Item,
        comments: &[Comment],
        budget: &ActionBudget,
    ) -> Result<(), PlatformError> {
        let offense = self.offense_result(item, Some(comments));
        if !offense.is_offending() {
            return Ok(());
        }
        if !budget.try_consume() {
            info!(number = item.number, "skipping censor, action budget exhausted");
            return Ok(());
        }
        if !self.policy.perform(scope) {
            info!(
                owner = %self.repo.owner,
                repo = %self.repo.repo,
                number = item.number,
                "would have been censored (dry run)"
            );
            return Ok(());
        }

        info!(
            owner = %self.repo.owner,
            repo = %self.repo.repo,
            number = item.number,
            "censoring item"
        );

        let mut first_error = None;
        if let Some(title) = &offense.title {
            if let Err(err) = self.client.edit_title(&self.repo, item.number, title).await {
                warn!(number = item.number, %err, "failed to censor title");
                first_error.get_or_insert(err);
            }
        }
        if let Some(body) = &offense.body {
            if let Err(err) = self.client.edit_body(&self.repo, item.number, body).await {
                warn!(number = item.number, %err, "failed to censor body");
                first_error.get_or_insert(err);
            }
        }
        for redaction in &offense.comments {
            if let Err(err) = self
                .client
                .edit_comment(&self.repo, redaction.id, &redaction.body)
                .await
            {
                warn!(comment_id = redaction.id, %err, "failed to censor comment");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Closes a marked item that has been inactive past the configured
    /// threshold. Never runs when auto-close is disabled.
    async fn close(
        &self,
        scope: ItemType,
        item: &Item,
        budget: &ActionBudget,
    ) -> Result<(), PlatformError> {
        let Some(days) = self.policy.days_until_close(scope) else {
            return Ok(());
        };
        if !item.has_label(self.policy.profanity_label(scope))
            || item.state != ItemState::Open
            || item.locked
        {
            return Ok(());
        }
        match item.updated_at {
            Some(updated) if updated < search_query::since(days, Utc::now()) => {}
            _ => return Ok(()),
        }
        if !budget.try_consume() {
            info!(number = item.number, "skipping close, action budget exhausted");
            return Ok(());
        }
        if !self.policy.perform(scope) {
            info!(
                owner = %self.repo.owner,
                repo = %self.repo.repo,
                number = item.number,
                "would have been closed (dry run)"
            );
            return Ok(());
        }

        info!(
            owner = %self.repo.owner,
            repo = %self.repo.repo,
            number = item.number,
            "closing item"
        );
        if let Some(comment) = self.policy.close_comment(scope) {
            self.client
                .create_comment(&self.repo, item.number, comment)
                .await?;
        }
        self.client
            .set_state(&self.repo, item.number, ItemState::Closed)
            .await
    }

    /// Removes the moderation label: posts the unmark comment (if
    /// configured), then removes the label. A label that is already gone
    /// means a concurrent unmark got there first, which is fine.
    async fn unmark(
        &self,
        scope: ItemType,
        item: &Item,
        budget: &ActionBudget,
    ) -> Result<(), PlatformError> {
        if !budget.try_consume() {
            info!(number = item.number, "skipping unmark, action budget exhausted");
            return Ok(());
        }
        if !self.policy.perform(scope) {
            info!(
                owner = %self.repo.owner,
                repo = %self.repo.repo,
                number = item.number,
                "would have been unmarked (dry run)"
            );
            return Ok(());
        }

        info!(
            owner = %self.repo.owner,
            repo = %self.repo.repo,
            number = item.number,
            "unmarking item"
        );
        if let Some(comment) = self.policy.unmark_comment(scope) {
            self.client
                .create_comment(&self.repo, item.number, comment)
                .await?;
        }
        match self
            .client
            .remove_label(&self.repo, item.number, self.policy.profanity_label(scope))
            .await
        {
            Err(PlatformError::NotFound) => Ok(()),
            result => result,
        }
    }

    // ========================================================================
    // LABEL LIFECYCLE
    // ========================================================================

    /// Creates the moderation label if the repository does not have it
    /// yet. Idempotent and tolerant of racing with a concurrent creator.
    pub async fn ensure_label_exists(&self, scope: ItemType) -> Result<(), PlatformError> {
        let label = self.policy.profanity_label(scope);
        match self.client.get_label(&self.repo, label).await {
            Ok(()) => Ok(()),
            // The expected path on first contact: label missing, create it.
            Err(PlatformError::NotFound) => {
                match self.client.create_label(&self.repo, label, LABEL_COLOR).await {
                    Ok(()) | Err(PlatformError::AlreadyExists) => Ok(()),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
