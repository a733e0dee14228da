//! Context window for the generative backend: recent exchanges flattened to turns.
//!
//! The transcript store hands back exchanges newest-first (its native order);
//! the builder reverses them so the backend sees the conversation oldest-first,
//! each exchange as a customer turn followed by the bot turn. The current
//! inbound message is never part of the window — the generator appends it.

use serde::{Deserialize, Serialize};

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Customer,
    Bot,
}

/// A single message in a conversation, read-only snapshot at decision time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Customer,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Bot,
            text: text.into(),
        }
    }
}

/// One completed exchange: what the customer sent and what the bot answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub customer_message: String,
    pub bot_response: String,
}

/// Build the context window from exchanges in newest-first store order.
///
/// Takes at most `window` exchanges and returns their turns in chronological
/// order (oldest first), two turns per exchange. Empty history is valid and
/// yields an empty window.
pub fn build_context(exchanges: &[Exchange], window: usize) -> Vec<ConversationTurn> {
    let mut turns = Vec::with_capacity(2 * window.min(exchanges.len()));
    for ex in exchanges.iter().take(window).rev() {
        turns.push(ConversationTurn::customer(ex.customer_message.clone()));
        turns.push(ConversationTurn::bot(ex.bot_response.clone()));
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> Exchange {
        Exchange {
            customer_message: format!("question {}", n),
            bot_response: format!("answer {}", n),
        }
    }

    #[test]
    fn empty_history_builds_empty_window() {
        assert!(build_context(&[], 5).is_empty());
    }

    #[test]
    fn window_caps_turn_count() {
        // Newest-first: exchange 8 happened last.
        let history: Vec<Exchange> = (0..8).rev().map(exchange).collect();
        let turns = build_context(&history, 5);
        assert_eq!(turns.len(), 10);
    }

    #[test]
    fn turns_are_chronological_and_alternate() {
        let history = vec![exchange(3), exchange(2), exchange(1)];
        let turns = build_context(&history, 5);
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[0].role, TurnRole::Customer);
        assert_eq!(turns[0].text, "question 1");
        assert_eq!(turns[1].role, TurnRole::Bot);
        assert_eq!(turns[1].text, "answer 1");
        assert_eq!(turns[4].text, "question 3");
        assert_eq!(turns[5].text, "answer 3");
    }

    #[test]
    fn keeps_the_most_recent_exchanges() {
        let history: Vec<Exchange> = (0..4).rev().map(exchange).collect();
        let turns = build_context(&history, 2);
        // Exchanges 0 and 1 fall out of the window.
        assert_eq!(turns[0].text, "question 2");
        assert_eq!(turns[3].text, "answer 3");
    }
}
