//! Append-only conversation log owned by one refinement.

use crate::model::{CompletionRequest, Turn};

/// Ordered prompts and replies of a single refinement.
///
/// Turns can only be appended. Each stage takes the log by value and hands
/// back the extended log, so no two stages ever hold it at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Request carrying the whole history.
    pub fn to_request(&self) -> CompletionRequest {
        CompletionRequest::conversation(self.turns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TurnRole;

    #[test]
    fn turns_accumulate_in_order() {
        let conversation = Conversation::new()
            .with_turn(Turn::user("q"))
            .with_turn(Turn::assistant("a"));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.turns()[0].role, TurnRole::User);
        assert_eq!(conversation.turns()[1].text, "a");
        assert_eq!(conversation.to_request().turns, conversation.turns());
    }
}
