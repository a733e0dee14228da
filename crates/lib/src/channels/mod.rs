//! Delivery channel (Instagram).
//!
//! Responder trait so the relay can deliver replies without knowing the
//! platform; inbound messages arrive already parsed (the core owns no wire
//! format, webhook handshaking lives outside this crate).

mod inbound;
mod instagram;

pub use inbound::InboundMessage;
pub use instagram::InstagramResponder;

use async_trait::async_trait;

/// Handle for delivering a reply to a customer. Failures are logged by the
/// caller and never retried.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn deliver(&self, customer_id: &str, text: &str, credential: &str)
        -> Result<(), String>;
}
