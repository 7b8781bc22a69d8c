use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::draft::{CommentDraft, ValidationError};
use crate::error::Result;
use crate::models::{Comment, NewComment};
use crate::status::{ErrorInfo, StatusTracker};
use crate::store::PostStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(Comment),
    Invalid(ValidationError),
    Failed(ErrorInfo),
    /// Another submission from this form is still running.
    Busy,
}

#[derive(Default)]
struct FormState {
    draft: CommentDraft,
    state: SubmissionState,
    is_submitting: bool,
    field_error: Option<ValidationError>,
    comments: Vec<Comment>,
}

/// Comment box for a single article.
///
/// The form lock is only held between store calls, never across them.
pub struct CommentForm {
    article_id: String,
    store: Arc<dyn PostStore>,
    status: StatusTracker,
    inner: Mutex<FormState>,
}

/// Closes a started submission: back to `Idle`, then `finish` and
/// `app_loaded` on the tracker. Runs on drop, so a submit future dropped
/// mid-flight still releases the form and the tracker.
struct SubmissionGuard<'a> {
    form: &'a CommentForm,
    settled: bool,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(
                "Comment submission for article {} was cancelled",
                self.form.article_id
            );
        }

        {
            let mut form = self.form.lock();
            form.is_submitting = false;
            form.state = SubmissionState::Idle;
        }
        self.form.status.finish();
        self.form.status.app_loaded();
    }
}

impl CommentForm {
    pub fn new(article_id: impl Into<String>, store: Arc<dyn PostStore>, status: StatusTracker) -> Self {
        Self {
            article_id: article_id.into(),
            store,
            status,
            inner: Mutex::new(FormState::default()),
        }
    }

    // Every critical section is short and panic-free; a poisoned lock still
    // holds consistent state.
    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn set_comment(&self, text: impl Into<String>) {
        let mut form = self.lock();
        form.draft.comment = text.into();
        form.field_error = None;
    }

    pub fn draft(&self) -> CommentDraft {
        self.lock().draft.clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().is_submitting
    }

    pub fn field_error(&self) -> Option<ValidationError> {
        self.lock().field_error
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.lock().comments.clone()
    }

    /// Replace the comment list with the store's current view.
    pub async fn load_comments(&self) -> Result<()> {
        let comments = self.store.fetch_comments(&self.article_id).await?;
        tracing::debug!(
            "Loaded {} comments for article {}",
            comments.len(),
            self.article_id
        );
        self.lock().comments = comments;
        Ok(())
    }

    /// Validate the draft, create the comment, then refresh the list.
    ///
    /// Never fails: problems come back as the outcome and, for store errors,
    /// on the shared status tracker. Whatever happens to the create call, the
    /// list is refreshed and the tracker sees `finish` and `app_loaded`. If
    /// the future is dropped mid-flight the refresh is skipped but the form
    /// and tracker are still released.
    pub async fn submit(&self) -> SubmitOutcome {
        let text = {
            let mut form = self.lock();
            if form.state != SubmissionState::Idle {
                tracing::debug!("Ignoring submit for article {}: already submitting", self.article_id);
                return SubmitOutcome::Busy;
            }

            form.state = SubmissionState::Validating;
            let text = match form.draft.validate() {
                Ok(text) => text.to_string(),
                Err(err) => {
                    form.field_error = Some(err);
                    form.state = SubmissionState::Idle;
                    return SubmitOutcome::Invalid(err);
                }
            };

            form.field_error = None;
            form.state = SubmissionState::Submitting;
            form.is_submitting = true;
            text
        };

        self.status.start();
        let mut guard = SubmissionGuard {
            form: self,
            settled: false,
        };

        let request = NewComment {
            post_id: self.article_id.clone(),
            comment: text,
        };

        let outcome = match self.store.add_comment(request).await {
            Ok(comment) => {
                let mut form = self.lock();
                form.draft.clear();
                form.state = SubmissionState::Succeeded;
                SubmitOutcome::Submitted(comment)
            }
            Err(e) => {
                tracing::error!("Failed to add comment to article {}: {}", self.article_id, e);
                let info = ErrorInfo::from(&e);
                self.status.error(info.clone());
                self.lock().state = SubmissionState::Failed;
                SubmitOutcome::Failed(info)
            }
        };

        if let Err(e) = self.load_comments().await {
            tracing::error!("Failed to refresh comments for article {}: {}", self.article_id, e);
            self.status.error(ErrorInfo::from(&e));
        }

        guard.settled = true;
        drop(guard);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Post;
    use crate::status::StatusEvent;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::{broadcast, Notify};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        AddComment(NewComment),
        FetchComments(String),
    }

    #[derive(Default)]
    struct FakeStore {
        calls: StdMutex<Vec<Call>>,
        comments: StdMutex<Vec<Comment>>,
        fail_add: bool,
        fail_fetch: bool,
        gate: Option<Arc<Notify>>,
        add_delay: Option<Duration>,
    }

    impl FakeStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PostStore for FakeStore {
        async fn fetch_single_post(&self, post_id: &str) -> Result<Post> {
            Err(AppError::ArticleNotFound(post_id.to_string()))
        }

        async fn fetch_posts(&self) -> Result<Vec<Post>> {
            Ok(Vec::new())
        }

        async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::FetchComments(post_id.to_string()));
            if self.fail_fetch {
                return Err(AppError::Store("listing unavailable".to_string()));
            }
            Ok(self.comments.lock().unwrap().clone())
        }

        async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::AddComment(comment.clone()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(delay) = self.add_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_add {
                return Err(AppError::Store("write rejected".to_string()));
            }
            let created = Comment {
                id: "1".to_string(),
                post_id: comment.post_id,
                comment: comment.comment,
                created_at: None,
            };
            self.comments.lock().unwrap().push(created.clone());
            Ok(created)
        }
    }

    fn drain(events: &mut broadcast::Receiver<StatusEvent>) -> Vec<StatusEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        seen
    }

    fn form_with(store: FakeStore) -> (Arc<FakeStore>, StatusTracker, CommentForm) {
        let store = Arc::new(store);
        let status = StatusTracker::new();
        let form = CommentForm::new("42", store.clone(), status.clone());
        (store, status, form)
    }

    #[tokio::test]
    async fn test_empty_draft_never_reaches_store() {
        let (store, status, form) = form_with(FakeStore::default());
        let mut events = status.events();

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Invalid(ValidationError::Required));
        assert_eq!(
            form.field_error().map(|e| e.to_string()).as_deref(),
            Some("Comment is required")
        );
        assert!(store.calls().is_empty());
        assert!(drain(&mut events).is_empty());
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (store, status, form) = form_with(FakeStore::default());
        let mut events = status.events();
        form.set_comment("nice post");

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(ref c) if c.comment == "nice post"));
        assert_eq!(
            store.calls(),
            vec![
                Call::AddComment(NewComment {
                    post_id: "42".to_string(),
                    comment: "nice post".to_string(),
                }),
                Call::FetchComments("42".to_string()),
            ]
        );
        assert_eq!(
            drain(&mut events),
            vec![StatusEvent::Start, StatusEvent::Finish, StatusEvent::AppLoaded]
        );
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(!form.is_submitting());
        assert_eq!(form.draft(), CommentDraft::default());
        assert_eq!(form.comments().len(), 1);

        let snapshot = status.snapshot();
        assert!(!snapshot.busy);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_submission_still_refreshes() {
        let (store, status, form) = form_with(FakeStore {
            fail_add: true,
            ..FakeStore::default()
        });
        let mut events = status.events();
        form.set_comment("nice post");

        let outcome = form.submit().await;

        let info = ErrorInfo::new("Store error: write rejected");
        assert_eq!(outcome, SubmitOutcome::Failed(info.clone()));
        assert_eq!(
            store.calls()[1..],
            [Call::FetchComments("42".to_string())]
        );
        assert_eq!(
            drain(&mut events),
            vec![
                StatusEvent::Start,
                StatusEvent::Error(info.clone()),
                StatusEvent::Finish,
                StatusEvent::AppLoaded,
            ]
        );
        assert_eq!(form.draft(), CommentDraft::new("nice post"));
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(status.snapshot().error, Some(info));
    }

    #[tokio::test]
    async fn test_refresh_failure_is_recorded() {
        let (_store, status, form) = form_with(FakeStore {
            fail_fetch: true,
            ..FakeStore::default()
        });
        form.set_comment("nice post");

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(
            status.snapshot().error,
            Some(ErrorInfo::new("Store error: listing unavailable"))
        );
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let gate = Arc::new(Notify::new());
        let (store, _status, form) = form_with(FakeStore {
            gate: Some(gate.clone()),
            ..FakeStore::default()
        });
        let form = Arc::new(form);
        form.set_comment("nice post");

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.submit().await }
        });

        while form.state() != SubmissionState::Submitting {
            tokio::task::yield_now().await;
        }
        assert!(form.is_submitting());
        assert_eq!(form.submit().await, SubmitOutcome::Busy);

        gate.notify_one();
        assert!(matches!(first.await.unwrap(), SubmitOutcome::Submitted(_)));
        assert_eq!(
            store
                .calls()
                .iter()
                .filter(|c| matches!(c, Call::AddComment(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_comment_is_sent_as_typed() {
        let (store, _status, form) = form_with(FakeStore::default());
        form.set_comment("  nice post\n");

        form.submit().await;

        assert_eq!(
            store.calls()[0],
            Call::AddComment(NewComment {
                post_id: "42".to_string(),
                comment: "  nice post\n".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_cancelled_submission_releases_form() {
        let (store, status, form) = form_with(FakeStore {
            add_delay: Some(Duration::from_secs(5)),
            ..FakeStore::default()
        });
        let mut events = status.events();
        form.set_comment("nice post");

        let cancelled = tokio::time::timeout(Duration::from_millis(50), form.submit()).await;
        assert!(cancelled.is_err());

        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(!form.is_submitting());
        assert!(!status.snapshot().busy);
        assert_eq!(
            drain(&mut events),
            vec![StatusEvent::Start, StatusEvent::Finish, StatusEvent::AppLoaded]
        );
        // The draft survives so the reader can retry
        assert_eq!(form.draft(), CommentDraft::new("nice post"));
        // Cancelled before the refresh
        assert!(!store.calls().iter().any(|c| matches!(c, Call::FetchComments(_))));
    }

    #[tokio::test]
    async fn test_resubmit_after_cancel_is_not_busy() {
        let gate = Arc::new(Notify::new());
        let (_store, _status, form) = form_with(FakeStore {
            gate: Some(gate.clone()),
            ..FakeStore::default()
        });
        form.set_comment("nice post");

        let cancelled = tokio::time::timeout(Duration::from_millis(20), form.submit()).await;
        assert!(cancelled.is_err());

        // Let the next add_comment through straight away
        gate.notify_one();
        assert!(matches!(form.submit().await, SubmitOutcome::Submitted(_)));
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_submit_from_sync_code() {
        let (store, _status, form) = form_with(FakeStore::default());
        assert_eq!(
            tokio_test::block_on(form.submit()),
            SubmitOutcome::Invalid(ValidationError::Required)
        );
        assert!(store.calls().is_empty());
        assert_eq!(form.article_id(), "42");
    }
}
