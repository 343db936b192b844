//! ConversationController drives the question/answer loop against the
//! recommendation API and remembers the final recommendation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::model::{Answer, NextStep, Question, ServiceType};
use super::state::{ConversationState, ConversationStatus, StepState};
use super::summary::RecommendationSummary;
use super::tips::LoadingTip;
use crate::client::RecommendationClient;
use crate::config::ConversationSettings;
use crate::error::{AdvisorError, ClientError};
use crate::store::RecommendationStore;

/// State plus the bookkeeping that must not take part in state equality.
#[derive(Debug, Default)]
struct Inner {
    /// Bumped on every open/reset; responses for older sessions are dropped.
    session: u64,
    state: ConversationState,
    fetch_started: Option<Instant>,
}

/// What a fetch needs once the lock is released.
struct FetchTicket {
    session: u64,
    answers: Vec<String>,
    service_type: ServiceType,
}

/// Read-only view of the wizard for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub session: u64,
    #[serde(flatten)]
    pub state: ConversationState,
    pub current_question: Option<Question>,
    /// The current question expects typed text rather than a choice.
    pub free_text: bool,
    pub step_index: usize,
    pub step_states: Vec<StepState>,
    pub progress_percent: u8,
    pub max_steps: usize,
    pub can_submit: bool,
    pub can_go_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading_tip: Option<LoadingTip>,
}

/// Owns one wizard session.
///
/// Every mutating operation is refused while a fetch is in flight; the lock
/// is never held across the network call.
pub struct ConversationController {
    client: Arc<dyn RecommendationClient>,
    store: Arc<dyn RecommendationStore>,
    settings: ConversationSettings,
    inner: RwLock<Inner>,
}

impl ConversationController {
    pub fn new(
        client: Arc<dyn RecommendationClient>,
        store: Arc<dyn RecommendationStore>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            client,
            store,
            settings,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// Start a fresh session.
    pub async fn open(&self) {
        let mut inner = self.inner.write().await;
        inner.session += 1;
        inner.state = ConversationState::default();
        inner.fetch_started = None;
        debug!(session = inner.session, "Advisor session opened");
    }

    /// Same as `open()`: drops the recommendation and any prior-choice prompt.
    pub async fn reset(&self) {
        self.open().await;
    }

    pub async fn state(&self) -> ConversationState {
        self.inner.read().await.state.clone()
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        let inner = self.inner.read().await;
        let state = &inner.state;
        let loading_tip = match (state.status.is_busy(), inner.fetch_started) {
            (true, Some(started)) => self
                .settings
                .loading_tips
                .tip_for(started.elapsed())
                .cloned(),
            _ => None,
        };
        ConversationSnapshot {
            session: inner.session,
            current_question: state.current_question().cloned(),
            free_text: state.current_question().is_some_and(Question::is_free_text),
            step_index: state.current_step_index(),
            step_states: (0..state.history.len())
                .map(|i| state.step_state(i))
                .collect(),
            progress_percent: state.progress_percent(self.settings.max_steps),
            max_steps: self.settings.max_steps,
            can_submit: state.can_submit(),
            can_go_back: state.history.len() > 1 && state.awaiting_answer(),
            loading_tip,
            state: state.clone(),
        }
    }

    /// Parsed view of the terminal recommendation, if any.
    pub async fn summary(&self) -> Option<RecommendationSummary> {
        match &self.inner.read().await.state.status {
            ConversationStatus::Terminal { recommendation } => {
                Some(RecommendationSummary::parse(recommendation))
            }
            _ => None,
        }
    }

    /// Choose the audience segment.
    ///
    /// Offers the saved recommendation for the segment if there is one,
    /// otherwise asks the API for the first question. Also retries a failed
    /// first fetch.
    pub async fn select_service_type(&self, service_type: ServiceType) -> Result<(), AdvisorError> {
        let session = {
            let mut inner = self.inner.write().await;
            let status = &inner.state.status;
            if status.is_busy() {
                return Err(AdvisorError::Busy);
            }
            let first_fetch_failed =
                matches!(status, ConversationStatus::Failed { .. }) && inner.state.history.is_empty();
            if *status != ConversationStatus::Idle && !first_fetch_failed {
                return Err(invalid_state("select a service type", status));
            }
            inner.state.service_type = Some(service_type);
            inner.state.validation_error = None;
            inner.state.status = ConversationStatus::Submitting;
            inner.fetch_started = Some(Instant::now());
            inner.session
        };

        let key = self.settings.storage_keys.key_for(service_type);
        let saved = self
            .store
            .get(key)
            .await
            .filter(|previous| !previous.trim().is_empty());

        {
            let mut inner = self.inner.write().await;
            if inner.session != session {
                debug!(session, "Discarding store lookup for a session that was reset");
                return Err(AdvisorError::Stale);
            }
            if let Some(previous) = saved {
                inner.fetch_started = None;
                inner.state.status = ConversationStatus::PriorChoicePending { previous };
                info!(session, service_type = %service_type, "Saved recommendation found");
                return Ok(());
            }
        }

        self.run_fetch(FetchTicket {
            session,
            answers: Vec::new(),
            service_type,
        })
        .await
    }

    /// Show the saved recommendation instead of starting over.
    pub async fn view_previous(&self) -> Result<(), AdvisorError> {
        let mut inner = self.inner.write().await;
        match &inner.state.status {
            ConversationStatus::PriorChoicePending { previous } => {
                let recommendation = previous.clone();
                inner.state.status = ConversationStatus::Terminal { recommendation };
                debug!(session = inner.session, "Showing saved recommendation");
                Ok(())
            }
            ConversationStatus::Submitting => Err(AdvisorError::Busy),
            other => Err(invalid_state("view the previous recommendation", other)),
        }
    }

    /// Ignore the saved recommendation and start a new conversation.
    pub async fn start_new(&self) -> Result<(), AdvisorError> {
        let ticket = {
            let mut inner = self.inner.write().await;
            match &inner.state.status {
                ConversationStatus::PriorChoicePending { .. } => {}
                ConversationStatus::Submitting => return Err(AdvisorError::Busy),
                other => return Err(invalid_state("start a new analysis", other)),
            }
            inner.state.history.clear();
            inner.state.answers.clear();
            inner.state.pending_answer = None;
            self.begin_fetch(&mut inner, "start a new analysis")?
        };
        self.run_fetch(ticket).await
    }

    /// Replace the answer being composed.
    pub async fn select_pending_answer(&self, value: &str) -> Result<(), AdvisorError> {
        let mut inner = self.inner.write().await;
        self.ensure_answerable(&inner.state, "select an answer")?;
        inner.state.pending_answer = Some(Answer::single(value));
        inner.state.validation_error = None;
        Ok(())
    }

    /// Toggle `value` in a multi-select answer being composed.
    pub async fn toggle_pending_multi_value(&self, value: &str) -> Result<(), AdvisorError> {
        let mut inner = self.inner.write().await;
        self.ensure_answerable(&inner.state, "select an answer")?;
        inner.state.pending_answer = match inner.state.pending_answer.take() {
            Some(answer) => answer.toggled(value),
            None => Some(Answer::Multiple(vec![value.to_string()])),
        };
        inner.state.validation_error = None;
        Ok(())
    }

    /// Submit the pending answer.
    pub async fn submit_pending(&self) -> Result<(), AdvisorError> {
        let pending = self
            .inner
            .read()
            .await
            .state
            .pending_answer
            .clone()
            .unwrap_or_else(|| Answer::single(""));
        self.submit_answer(pending).await
    }

    /// Answer the current question and fetch the next step.
    ///
    /// A blank answer sets the validation message and changes nothing else.
    pub async fn submit_answer(&self, answer: impl Into<Answer>) -> Result<(), AdvisorError> {
        let answer = answer.into();
        let ticket = {
            let mut inner = self.inner.write().await;
            self.ensure_answerable(&inner.state, "submit an answer")?;
            if answer.is_blank() {
                let message = self.settings.validation_message.clone();
                inner.state.validation_error = Some(message.clone());
                return Err(AdvisorError::Validation(message));
            }
            inner.state.push_answer(answer);
            self.begin_fetch(&mut inner, "submit an answer")?
        };
        self.run_fetch(ticket).await
    }

    /// Re-issue the fetch that failed.
    pub async fn retry(&self) -> Result<(), AdvisorError> {
        let ticket = {
            let mut inner = self.inner.write().await;
            match &inner.state.status {
                ConversationStatus::Failed { .. } => {}
                ConversationStatus::Submitting => return Err(AdvisorError::Busy),
                other => return Err(invalid_state("retry", other)),
            }
            self.begin_fetch(&mut inner, "retry")?
        };
        self.run_fetch(ticket).await
    }

    /// Return to the previous question.
    ///
    /// Returns `Ok(false)` without touching anything on the first question.
    pub async fn go_back(&self) -> Result<bool, AdvisorError> {
        let mut inner = self.inner.write().await;
        self.ensure_answerable(&inner.state, "go back")?;
        let moved = inner.state.step_back();
        if moved {
            debug!(
                session = inner.session,
                step = inner.state.current_step_index(),
                "Advisor stepped back"
            );
        }
        Ok(moved)
    }

    fn ensure_answerable(
        &self,
        state: &ConversationState,
        operation: &'static str,
    ) -> Result<(), AdvisorError> {
        if state.status.is_busy() {
            return Err(AdvisorError::Busy);
        }
        if !state.awaiting_answer() {
            return Err(invalid_state(operation, &state.status));
        }
        Ok(())
    }

    fn begin_fetch(
        &self,
        inner: &mut Inner,
        operation: &'static str,
    ) -> Result<FetchTicket, AdvisorError> {
        let service_type = inner
            .state
            .service_type
            .ok_or_else(|| invalid_state(operation, &inner.state.status))?;
        inner.state.validation_error = None;
        inner.state.status = ConversationStatus::Submitting;
        inner.fetch_started = Some(Instant::now());
        Ok(FetchTicket {
            session: inner.session,
            answers: inner.state.wire_answers(),
            service_type,
        })
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<(), AdvisorError> {
        let FetchTicket {
            session,
            answers,
            service_type,
        } = ticket;

        info!(
            session,
            service_type = %service_type,
            step = answers.len(),
            "Fetching next advisor step"
        );
        let result = self.client.fetch_next(&answers, service_type).await;

        let mut inner = self.inner.write().await;
        if inner.session != session {
            debug!(session, "Discarding response for a session that was reset");
            return Err(AdvisorError::Stale);
        }
        inner.fetch_started = None;

        match result {
            Ok(NextStep::Question(question)) => {
                let max_steps = self.settings.max_steps;
                if inner.state.push_question(question, max_steps) {
                    debug!(session, step = inner.state.current_step_index(), "Question received");
                    Ok(())
                } else {
                    warn!(session, max_steps, "Recommendation API asked past the step limit");
                    inner.state.status = ConversationStatus::Failed {
                        message: self.settings.step_limit_message.clone(),
                    };
                    Err(AdvisorError::Fetch(ClientError::Protocol {
                        reason: format!("question received after {max_steps} steps"),
                    }))
                }
            }
            Ok(NextStep::Recommendation(recommendation)) => {
                inner.state.pending_answer = None;
                inner.state.status = ConversationStatus::Terminal {
                    recommendation: recommendation.clone(),
                };
                drop(inner);

                if recommendation.trim().is_empty() {
                    warn!(session, "Recommendation API returned an empty recommendation");
                } else {
                    let key = self.settings.storage_keys.key_for(service_type);
                    self.store.set(key, &recommendation).await;
                }
                info!(session, service_type = %service_type, "Recommendation received");
                Ok(())
            }
            Err(e) => {
                warn!(session, error = %e, "Advisor fetch failed");
                let message = e
                    .api_message()
                    .map(String::from)
                    .unwrap_or_else(|| self.settings.fallback_error_message.clone());
                inner.state.status = ConversationStatus::Failed { message };
                Err(AdvisorError::Fetch(e))
            }
        }
    }
}

fn invalid_state(operation: &'static str, status: &ConversationStatus) -> AdvisorError {
    AdvisorError::InvalidState {
        operation,
        status: status.to_string(),
    }
}
