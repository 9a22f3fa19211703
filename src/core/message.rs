use chrono::{DateTime, Utc};

use crate::api::SourceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }
}

/// One turn in the chat transcript. Never mutated after creation; the
/// transcript only appends.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
    /// Answer confidence in [0, 1]. Absent is a distinct display state from
    /// zero and must never be coerced to 0.0.
    pub confidence: Option<f64>,
}

impl ChatMessage {
    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            sources: Vec::new(),
            timestamp: Utc::now(),
            confidence: None,
        }
    }

    pub fn bot(
        id: i64,
        text: impl Into<String>,
        sources: Vec<SourceRef>,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            sources,
            timestamp: Utc::now(),
            confidence,
        }
    }

    /// Display line for the confidence value, `None` when no confidence was
    /// reported.
    pub fn confidence_label(&self) -> Option<String> {
        self.confidence
            .map(|confidence| format!("Confidence: {:.1}%", confidence * 100.0))
    }
}

/// Timestamp-derived message ids, strictly increasing even when several
/// messages land within one millisecond.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: i64,
}

impl MessageIdGenerator {
    pub fn next(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last + 1);
        self.last = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase_within_one_millisecond() {
        let mut ids = MessageIdGenerator::default();
        let mut previous = ids.next();
        for _ in 0..100 {
            let id = ids.next();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn confidence_label_formats_one_decimal_percent() {
        let message = ChatMessage::bot(1, "ROS2 is...", Vec::new(), Some(0.92));
        assert_eq!(message.confidence_label().as_deref(), Some("Confidence: 92.0%"));
    }

    #[test]
    fn zero_confidence_renders_distinctly_from_absent() {
        let zero = ChatMessage::bot(1, "x", Vec::new(), Some(0.0));
        assert_eq!(zero.confidence_label().as_deref(), Some("Confidence: 0.0%"));

        let absent = ChatMessage::bot(2, "x", Vec::new(), None);
        assert_eq!(absent.confidence_label(), None);
    }

    #[test]
    fn user_messages_carry_no_sources_or_confidence() {
        let message = ChatMessage::user(1, "what is ROS2?");
        assert!(message.sender.is_user());
        assert!(message.sources.is_empty());
        assert!(message.confidence.is_none());
    }
}
