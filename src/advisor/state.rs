//! Conversation state machine: what the wizard has asked, what the user
//! answered, and where the exchange currently stands.

use serde::{Deserialize, Serialize};

use super::model::{Answer, Question, ServiceType};

/// Where the conversation stands.
///
/// `Idle → Submitting → Ready ⇄ Submitting → Terminal`, with `Failed`
/// reachable from every fetch and `PriorChoicePending` reachable when a
/// saved recommendation exists for the chosen segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationStatus {
    Idle,
    /// A recommendation from an earlier session exists for this segment.
    PriorChoicePending { previous: String },
    Submitting,
    Ready,
    Terminal { recommendation: String },
    Failed { message: String },
}

impl ConversationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    /// A fetch is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PriorChoicePending { .. } => "prior_choice_pending",
            Self::Submitting => "submitting",
            Self::Ready => "ready",
            Self::Terminal { .. } => "terminal",
            Self::Failed { .. } => "failed",
        }
    }
}

impl Default for ConversationStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display state of one step in the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Active,
    Inactive,
}

/// All wizard state for one session.
///
/// While `Ready`, `answers.len() == history.len() - 1`: the last question
/// has no answer yet. While the answer to it is in flight (or its fetch
/// failed) the lengths are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub service_type: Option<ServiceType>,
    pub history: Vec<Question>,
    pub answers: Vec<Answer>,
    pub pending_answer: Option<Answer>,
    pub validation_error: Option<String>,
    pub status: ConversationStatus,
}

impl ConversationState {
    /// The question currently displayed.
    pub fn current_question(&self) -> Option<&Question> {
        self.history.last()
    }

    pub fn current_step_index(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    pub fn step_state(&self, index: usize) -> StepState {
        let current = self.current_step_index();
        if index < current {
            StepState::Completed
        } else if index == current {
            StepState::Active
        } else {
            StepState::Inactive
        }
    }

    /// Progress through the maximum number of steps, capped at 100.
    pub fn progress_percent(&self, max_steps: usize) -> u8 {
        if max_steps == 0 {
            return 100;
        }
        let pct = (self.current_step_index() + 1) * 100 / max_steps;
        pct.min(100) as u8
    }

    /// The last answer was submitted but no further question confirmed it.
    pub fn has_unconfirmed_answer(&self) -> bool {
        !self.history.is_empty() && self.answers.len() == self.history.len()
    }

    /// A question is on screen and can be answered.
    pub fn awaiting_answer(&self) -> bool {
        !self.history.is_empty()
            && matches!(
                self.status,
                ConversationStatus::Ready | ConversationStatus::Failed { .. }
            )
    }

    /// A submit would be accepted right now.
    pub fn can_submit(&self) -> bool {
        self.status == ConversationStatus::Ready
            && self
                .pending_answer
                .as_ref()
                .is_some_and(|answer| !answer.is_blank())
    }

    /// Record the answer to the current question.
    ///
    /// Re-answering after a failed fetch replaces the unconfirmed answer.
    pub fn push_answer(&mut self, answer: Answer) {
        if self.has_unconfirmed_answer() {
            if let Some(last) = self.answers.last_mut() {
                *last = answer;
            }
        } else {
            self.answers.push(answer);
        }
    }

    /// Append a question unless the history is already at `max_steps`.
    pub fn push_question(&mut self, question: Question, max_steps: usize) -> bool {
        if self.history.len() >= max_steps {
            return false;
        }
        self.history.push(question);
        self.pending_answer = None;
        self.validation_error = None;
        self.status = ConversationStatus::Ready;
        true
    }

    /// Return to the previous question. No-op on the first question.
    pub fn step_back(&mut self) -> bool {
        if self.history.len() <= 1 || self.status.is_busy() {
            return false;
        }
        if self.has_unconfirmed_answer() {
            self.answers.pop();
        }
        self.history.pop();
        self.answers.pop();
        self.pending_answer = None;
        self.validation_error = None;
        self.status = ConversationStatus::Ready;
        true
    }

    /// Answers flattened for the recommendation API.
    pub fn wire_answers(&self) -> Vec<String> {
        self.answers.iter().map(Answer::to_wire).collect()
    }
}
