//! Chat transcript state machine
//!
//! The controller owns the ordered transcript and the input buffer, and
//! enforces one in-flight query at a time. The view layer drives it: submit
//! returns the query to send, and the request outcome is fed back through
//! [`ChatController::resolve`].

use tracing::warn;

use crate::api::{ApiError, QueryResponse};
use crate::core::message::{ChatMessage, MessageIdGenerator};

/// Fallback bot reply shown whenever a query fails.
pub const QUERY_FAILED_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The user turn was appended and the query should be sent now.
    Submitted { query: String },
    /// Input was empty after trimming; nothing happened.
    EmptyInput,
    /// A query is already in flight; re-entrant submits are rejected, not
    /// queued.
    Busy,
}

pub struct ChatController {
    messages: Vec<ChatMessage>,
    input: String,
    state: ChatState,
    ids: MessageIdGenerator,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            state: ChatState::Idle,
            ids: MessageIdGenerator::default(),
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state == ChatState::AwaitingResponse
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Try to submit the current input as a query.
    ///
    /// On success the user turn is appended to the transcript immediately,
    /// the input buffer is cleared before the request goes out, and the
    /// controller enters `AwaitingResponse`.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.input.trim().is_empty() {
            return SubmitOutcome::EmptyInput;
        }
        if self.state == ChatState::AwaitingResponse {
            return SubmitOutcome::Busy;
        }

        let query = std::mem::take(&mut self.input);
        let id = self.ids.next();
        self.messages.push(ChatMessage::user(id, query.clone()));
        self.state = ChatState::AwaitingResponse;
        SubmitOutcome::Submitted { query }
    }

    /// Feed the outcome of the in-flight query back into the transcript.
    ///
    /// Success appends a bot turn with the response text, sources, and
    /// optional confidence; failure appends the fixed fallback reply with
    /// neither. Both paths return the controller to `Idle` — the user's turn
    /// is never dropped, and no state is left stuck on error.
    pub fn resolve(&mut self, result: Result<QueryResponse, ApiError>) -> &ChatMessage {
        let message = match result {
            Ok(response) => {
                let id = self.ids.next();
                ChatMessage::bot(id, response.response, response.sources, response.confidence)
            }
            Err(error) => {
                warn!(%error, "query failed");
                let id = self.ids.next();
                ChatMessage::bot(id, QUERY_FAILED_MESSAGE, Vec::new(), None)
            }
        };
        self.messages.push(message);
        self.state = ChatState::Idle;
        self.messages.last().expect("transcript cannot be empty after append")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceRef;
    use crate::core::message::Sender;

    fn submitted(controller: &mut ChatController, text: &str) -> String {
        for c in text.chars() {
            controller.push_input(c);
        }
        match controller.submit() {
            SubmitOutcome::Submitted { query } => query,
            other => panic!("expected submission, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_whitespace_input_is_rejected() {
        let mut controller = ChatController::new();
        assert_eq!(controller.submit(), SubmitOutcome::EmptyInput);

        controller.push_input(' ');
        controller.push_input('\t');
        assert_eq!(controller.submit(), SubmitOutcome::EmptyInput);
        assert!(controller.messages().is_empty());
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[test]
    fn submission_appends_user_turn_and_clears_input() {
        let mut controller = ChatController::new();
        let query = submitted(&mut controller, "what is ROS2?");

        assert_eq!(query, "what is ROS2?");
        assert_eq!(controller.input(), "");
        assert_eq!(controller.state(), ChatState::AwaitingResponse);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].sender, Sender::User);
        assert_eq!(controller.messages()[0].text, "what is ROS2?");
    }

    #[test]
    fn reentrant_submit_is_rejected_not_queued() {
        let mut controller = ChatController::new();
        submitted(&mut controller, "first");

        controller.push_input('x');
        assert_eq!(controller.submit(), SubmitOutcome::Busy);
        // The rejected input stays in the buffer for the user to resend.
        assert_eq!(controller.input(), "x");
        assert_eq!(controller.messages().len(), 1);
    }

    #[test]
    fn successful_query_appends_bot_turn_with_sources_and_confidence() {
        let mut controller = ChatController::new();
        submitted(&mut controller, "what is ROS2?");

        let response = QueryResponse {
            response: "ROS2 is...".to_string(),
            sources: vec![SourceRef {
                chapter_title: "ROS2".to_string(),
                page_reference: "p.12".to_string(),
            }],
            confidence: Some(0.92),
        };
        controller.resolve(Ok(response));

        assert_eq!(controller.state(), ChatState::Idle);
        let last = controller.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "ROS2 is...");
        assert_eq!(last.sources.len(), 1);
        assert_eq!(last.confidence_label().as_deref(), Some("Confidence: 92.0%"));
    }

    #[test]
    fn failed_query_returns_to_idle_with_one_fallback_turn() {
        let mut controller = ChatController::new();
        submitted(&mut controller, "what is ROS2?");

        let error = ApiError::Http {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "Internal server error".to_string(),
        };
        controller.resolve(Err(error));

        assert_eq!(controller.state(), ChatState::Idle);
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[0].sender, Sender::User);

        let last = controller.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, QUERY_FAILED_MESSAGE);
        assert!(last.sources.is_empty());
        assert!(last.confidence.is_none());
    }

    #[test]
    fn message_ids_stay_monotonic_across_turns() {
        let mut controller = ChatController::new();
        submitted(&mut controller, "one");
        controller.resolve(Ok(QueryResponse {
            response: "a".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        submitted(&mut controller, "two");
        controller.resolve(Ok(QueryResponse {
            response: "b".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));

        let ids: Vec<i64> = controller.messages().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }
}
