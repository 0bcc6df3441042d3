//! The in-memory transcript of the active conversation.

use super::message::{Message, MessageId, Sender};

/// Id given to the welcome message of a fresh transcript.
pub const WELCOME_MESSAGE_ID: MessageId = 1;

/// A question removed by an edit, together with the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    pub question: Message,
    pub answer: Option<Message>,
}

/// Ordered messages of one conversation.
///
/// Ids are assigned here so they stay unique and increasing within the
/// transcript. Ids of retracted messages are never handed out again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Transcript {
    /// A fresh transcript holding only the welcome message.
    pub fn welcome(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::bot(WELCOME_MESSAGE_ID, text)],
            next_id: WELCOME_MESSAGE_ID + 1,
        }
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        let next_id = messages
            .iter()
            .map(|m| m.id)
            .max()
            .map_or(WELCOME_MESSAGE_ID, |max| max.saturating_add(1));
        Self { messages, next_id }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True once the user has said anything in this conversation.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    pub fn find(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Appends a user message and returns a copy of it.
    pub fn push_user(&mut self, text: impl Into<String>) -> Message {
        self.push(Sender::User, text.into())
    }

    /// Appends a bot message and returns a copy of it.
    pub fn push_bot(&mut self, text: impl Into<String>) -> Message {
        self.push(Sender::Bot, text.into())
    }

    fn push(&mut self, sender: Sender, text: String) -> Message {
        let id = self.next_id.max(WELCOME_MESSAGE_ID);
        self.next_id = id.saturating_add(1);
        let message = Message { id, text, sender };
        self.messages.push(message.clone());
        message
    }

    /// Removes the user message `id` and, if the next entry is a bot reply,
    /// that reply as well.
    ///
    /// Returns `None` when `id` is unknown or names a bot message; the
    /// transcript is left untouched in that case.
    pub fn retract(&mut self, id: MessageId) -> Option<Retraction> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        if !self.messages[index].is_user() {
            return None;
        }

        let answer = match self.messages.get(index + 1) {
            Some(next) if next.is_bot() => Some(self.messages.remove(index + 1)),
            _ => None,
        };
        let question = self.messages.remove(index);

        Some(Retraction { question, answer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_transcript() {
        let t = Transcript::welcome("hi");
        assert_eq!(t.len(), 1);
        assert_eq!(t.messages()[0].id, WELCOME_MESSAGE_ID);
        assert!(!t.has_user_message());
    }

    #[test]
    fn test_ids_increase() {
        let mut t = Transcript::welcome("hi");
        let a = t.push_user("a");
        let b = t.push_bot("b");
        assert_eq!(a.id, 2);
        assert_eq!(b.id, 3);
        assert!(t.has_user_message());
    }

    #[test]
    fn test_retract_pair() {
        let mut t = Transcript::welcome("hi");
        let q = t.push_user("X");
        t.push_bot("Y");

        let r = t.retract(q.id).unwrap();
        assert_eq!(r.question.text, "X");
        assert_eq!(r.answer.unwrap().text, "Y");
        assert_eq!(t.messages(), Transcript::welcome("hi").messages());
    }

    #[test]
    fn test_retract_unanswered_question_keeps_following_user_message() {
        let mut t = Transcript::welcome("hi");
        let q = t.push_user("first");
        t.push_user("second");

        let r = t.retract(q.id).unwrap();
        assert!(r.answer.is_none());
        assert_eq!(t.len(), 2);
        assert_eq!(t.messages()[1].text, "second");
    }

    #[test]
    fn test_retract_bot_message_is_refused() {
        let mut t = Transcript::welcome("hi");
        assert!(t.retract(WELCOME_MESSAGE_ID).is_none());
        assert!(t.retract(99).is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_ids_stay_unique_after_retraction() {
        let mut t = Transcript::welcome("hi");
        t.push_user("a");
        let last = t.push_bot("b");
        let q = t.push_user("c");
        t.retract(q.id);
        let next = t.push_user("d");
        assert!(next.id > last.id);
    }

    #[test]
    fn test_retracting_last_pair_does_not_reuse_ids() {
        let mut t = Transcript::welcome("hi");
        let q = t.push_user("X");
        let a = t.push_bot("Y");

        t.retract(q.id).unwrap();
        let next = t.push_user("Z");
        assert!(next.id > q.id && next.id > a.id);
    }

    #[test]
    fn test_restored_transcript_continues_after_largest_id() {
        let mut t = Transcript::from_messages(vec![
            Message::bot(WELCOME_MESSAGE_ID, "hi"),
            Message::user(7, "a"),
            Message::bot(8, "b"),
        ]);
        assert_eq!(t.push_user("c").id, 9);

        let mut empty = Transcript::default();
        assert_eq!(empty.push_bot("hello").id, WELCOME_MESSAGE_ID);
    }
}
