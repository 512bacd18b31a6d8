//! One-request orchestration.
//!
//! A submission walks a small state machine: `Idle -> Sending -> Idle`.
//! `begin` validates the input and stages the user-visible effects (user
//! message, thinking placeholder) strictly before the network dispatch;
//! `complete` routes the finished request to an assistant message and a
//! balance update, or to an error banner. The pipeline owns the session
//! and transcript and is fully synchronous, so every transition can be
//! unit tested without an event loop or a live socket.

use crate::balance::BalanceState;
use crate::client::{AskReply, ClientError};
use crate::session::ChatSession;
use crate::transcript::Transcript;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a question.";

/// Where the pipeline is in the current submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Sending,
}

/// Why `begin` refused to start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefusal {
    /// Trimmed input was empty. A validation banner has been appended.
    EmptyInput,
    /// A request is already outstanding. Nothing was changed.
    Busy,
}

pub struct RequestPipeline {
    state: PipelineState,
    session: ChatSession,
    transcript: Transcript,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            session: ChatSession::new(),
            transcript: Transcript::new(),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.state == PipelineState::Sending
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Validate and stage a submission.
    ///
    /// On success the user message is in the session and the transcript,
    /// the thinking placeholder is up, the state is `Sending`, and the
    /// trimmed question is returned ready for dispatch. The caller clears
    /// the input field. While a request is outstanding further submissions
    /// are refused untouched.
    pub fn begin(&mut self, input: &str) -> Result<String, SubmitRefusal> {
        if self.state == PipelineState::Sending {
            return Err(SubmitRefusal::Busy);
        }

        let question = input.trim();
        if question.is_empty() {
            self.transcript.push_error(EMPTY_INPUT_MESSAGE.to_string());
            return Err(SubmitRefusal::EmptyInput);
        }

        let question = question.to_string();
        self.session.push_user(question.clone());
        self.transcript.push_user(question.clone());
        self.transcript.show_loading();
        self.state = PipelineState::Sending;
        Ok(question)
    }

    /// Route a finished request.
    ///
    /// The placeholder comes down before anything else renders. A success
    /// appends the assistant message and yields the new balance state for
    /// display; a failure appends an error banner with the most specific
    /// message available. Either way the pipeline is idle and retryable
    /// afterwards.
    pub fn complete(&mut self, outcome: Result<AskReply, ClientError>) -> Option<BalanceState> {
        self.transcript.clear_loading();
        self.state = PipelineState::Idle;

        match outcome {
            Ok(reply) => {
                self.session.push_assistant(reply.answer.clone());
                self.transcript.push_assistant(reply.answer);
                Some(BalanceState {
                    amount: reply.final_balance,
                    currency: reply.currency,
                    last_cost: reply.balance_difference,
                })
            }
            Err(err) => {
                self.transcript.push_error(err.user_message());
                None
            }
        }
    }
}

impl Default for RequestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChatRole;
    use crate::transcript::TranscriptEntry;

    fn reply(answer: &str, balance: f64, cost: f64) -> AskReply {
        AskReply {
            answer: answer.to_string(),
            final_balance: balance,
            balance_difference: cost,
            currency: "sats".to_string(),
        }
    }

    #[test]
    fn test_begin_appends_user_message_before_dispatch() {
        let mut pipeline = RequestPipeline::new();
        let question = pipeline.begin("  what is a sat?  ").unwrap();

        assert_eq!(question, "what is a sat?");
        assert!(pipeline.is_sending());

        // Exactly one user message, already in place when dispatch happens
        assert_eq!(pipeline.session().len(), 1);
        assert_eq!(pipeline.session().messages()[0].role, ChatRole::User);
        assert_eq!(pipeline.session().messages()[0].content, "what is a sat?");

        // Transcript shows the message and then the placeholder
        assert_eq!(
            pipeline.transcript().entries(),
            &[
                TranscriptEntry::User("what is a sat?".to_string()),
                TranscriptEntry::Loading,
            ]
        );
    }

    #[test]
    fn test_begin_refuses_whitespace_input_without_dispatch() {
        let mut pipeline = RequestPipeline::new();
        let refusal = pipeline.begin("   \t  ").unwrap_err();

        assert_eq!(refusal, SubmitRefusal::EmptyInput);
        assert!(!pipeline.is_sending());
        assert!(pipeline.session().is_empty());
        assert_eq!(
            pipeline.transcript().entries(),
            &[TranscriptEntry::Error(EMPTY_INPUT_MESSAGE.to_string())]
        );
    }

    #[test]
    fn test_begin_refuses_while_sending() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("first").unwrap();

        let entries_before = pipeline.transcript().entries().to_vec();
        let refusal = pipeline.begin("second").unwrap_err();

        assert_eq!(refusal, SubmitRefusal::Busy);
        assert_eq!(pipeline.session().len(), 1);
        assert_eq!(pipeline.transcript().entries(), entries_before.as_slice());
    }

    #[test]
    fn test_success_appends_assistant_and_updates_balance() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("question").unwrap();

        let balance = pipeline
            .complete(Ok(reply("**answer**", 979.0, 21.0)))
            .expect("balance update");

        assert_eq!(balance.amount, 979.0);
        assert_eq!(balance.last_cost, 21.0);
        assert_eq!(balance.currency, "sats");

        assert!(!pipeline.is_sending());
        assert!(!pipeline.transcript().is_loading());
        assert_eq!(pipeline.session().len(), 2);
        assert_eq!(pipeline.session().messages()[1].role, ChatRole::Assistant);
        assert_eq!(
            pipeline.transcript().entries(),
            &[
                TranscriptEntry::User("question".to_string()),
                TranscriptEntry::Assistant("**answer**".to_string()),
            ]
        );
    }

    #[test]
    fn test_backend_error_is_surfaced_verbatim_with_no_assistant_message() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("question").unwrap();

        let balance = pipeline.complete(Err(ClientError::Backend {
            status: reqwest::StatusCode::PAYMENT_REQUIRED,
            message: "insufficient funds".to_string(),
        }));

        assert!(balance.is_none());
        assert!(!pipeline.is_sending());
        assert!(!pipeline.transcript().is_loading());
        assert_eq!(pipeline.session().len(), 1); // user message only
        assert_eq!(
            pipeline.transcript().entries()[1],
            TranscriptEntry::Error("insufficient funds".to_string())
        );
    }

    #[test]
    fn test_task_failure_removes_placeholder_and_keeps_error_text() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("question").unwrap();
        assert!(pipeline.transcript().is_loading());

        pipeline.complete(Err(ClientError::Task("connection reset".to_string())));

        assert!(!pipeline.transcript().is_loading());
        match &pipeline.transcript().entries()[1] {
            TranscriptEntry::Error(msg) => assert!(msg.contains("connection reset")),
            other => panic!("expected error banner, got {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_is_retryable_after_failure() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("question").unwrap();
        pipeline.complete(Err(ClientError::Task("boom".to_string())));

        assert!(pipeline.begin("again").is_ok());
        assert!(pipeline.is_sending());
    }

    #[test]
    fn test_zero_cost_reply_yields_no_suffix() {
        let mut pipeline = RequestPipeline::new();
        pipeline.begin("question").unwrap();

        let balance = pipeline.complete(Ok(reply("free", 1000.0, 0.0))).unwrap();
        assert_eq!(balance.cost_suffix(), None);
    }
}
