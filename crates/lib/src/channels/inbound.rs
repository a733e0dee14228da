//! Inbound message from the messaging platform: one decision per message.

/// An already-parsed inbound message: which bot it is for, who sent it, and
/// the text. Transport parsing happens before this point.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub bot_id: String,
    pub customer_id: String,
    pub text: String,
}
