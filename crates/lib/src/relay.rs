//! Relay: decision, transcript, delivery — in that order.
//!
//! The transcript row is appended before delivery is attempted, so analytics
//! see every decision even when the customer can no longer be reached.
//! Delivery failures are logged, never retried.

use chrono::Utc;
use std::sync::Arc;

use crate::channels::{InboundMessage, Responder};
use crate::pipeline::{Decision, Pipeline, PipelineError};
use crate::store::{BotConfigProvider, DecisionRecord, TranscriptStore};

pub struct Relay {
    bots: Arc<dyn BotConfigProvider>,
    pipeline: Pipeline,
    transcript: Arc<dyn TranscriptStore>,
    responder: Arc<dyn Responder>,
}

impl Relay {
    pub fn new(
        bots: Arc<dyn BotConfigProvider>,
        pipeline: Pipeline,
        transcript: Arc<dyn TranscriptStore>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            bots,
            pipeline,
            transcript,
            responder,
        }
    }

    /// Handle one inbound message end to end. Blank input returns `Ok(None)`
    /// with nothing persisted or delivered.
    pub async fn handle(&self, inbound: &InboundMessage) -> Result<Option<Decision>, PipelineError> {
        let decision = match self.pipeline.decide(inbound).await? {
            Some(d) => d,
            None => {
                log::debug!("relay: blank message from {}, skipping", inbound.customer_id);
                return Ok(None);
            }
        };

        let record = DecisionRecord {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            bot_id: inbound.bot_id.clone(),
            customer_id: inbound.customer_id.clone(),
            customer_message: inbound.text.clone(),
            bot_response: decision.response.clone(),
            kind: decision.kind,
            latency_ms: decision.latency_ms,
            created_at: Utc::now(),
        };
        if let Err(e) = self.transcript.append(record).await {
            log::warn!("relay: transcript append failed for bot {}: {}", inbound.bot_id, e);
        }
        log::info!(
            "relay: bot {} answered {} via {} in {}ms",
            inbound.bot_id,
            inbound.customer_id,
            decision.kind.as_str(),
            decision.latency_ms
        );

        // Re-read the config for the credential; the decision snapshot is
        // already closed and must not change.
        match self.bots.config(&inbound.bot_id).await {
            Ok(bot) => match bot.access_token {
                Some(token) => {
                    if let Err(e) = self
                        .responder
                        .deliver(&inbound.customer_id, &decision.response, &token)
                        .await
                    {
                        log::warn!(
                            "relay: delivery to {} failed (not retried): {}",
                            inbound.customer_id,
                            e
                        );
                    }
                }
                None => log::debug!("relay: bot {} has no credential, skipping delivery", bot.id),
            },
            Err(e) => log::warn!("relay: config re-read failed, skipping delivery: {}", e),
        }

        Ok(Some(decision))
    }
}
