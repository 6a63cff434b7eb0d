//! Message retrieval and deletion over the Discord REST API.
//!
//! The scan workflow only sees the [`MessageStore`] trait and
//! [`CandidateMessage`] snapshots — serenity types stay inside this module.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::{Http, HttpError, MessagePagination};
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, MessageId};

use sweep_core::config::HISTORY_PAGE_SIZE;
use sweep_core::types::CandidateMessage;

use crate::error::PurgeError;

/// Capability interface over a channel's message history.
///
/// Implementations must be `Send + Sync` so a single store can serve
/// concurrent scans.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch up to `limit` most recent messages, newest first.
    async fn fetch_recent(
        &self,
        channel_id: u64,
        limit: u32,
    ) -> Result<Vec<CandidateMessage>, PurgeError>;

    /// Delete one message. `Ok(false)` means the message was already gone
    /// (deleted by a concurrent request) — a non-fatal skip.
    async fn delete_message(&self, channel_id: u64, message_id: u64)
        -> Result<bool, PurgeError>;
}

/// Production store backed by serenity's REST client.
pub struct RestMessageStore {
    http: Arc<Http>,
}

impl RestMessageStore {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageStore for RestMessageStore {
    async fn fetch_recent(
        &self,
        channel_id: u64,
        limit: u32,
    ) -> Result<Vec<CandidateMessage>, PurgeError> {
        let channel = ChannelId::new(channel_id);
        let mut messages: Vec<CandidateMessage> = Vec::new();
        let mut before: Option<MessageId> = None;

        // Discord serves history newest-first in pages of at most 100.
        while (messages.len() as u32) < limit {
            let remaining = limit - messages.len() as u32;
            let page_size = remaining.min(u32::from(HISTORY_PAGE_SIZE)) as u8;
            let target = before.map(MessagePagination::Before);

            let page = self
                .http
                .get_messages(channel, target, Some(page_size))
                .await
                .map_err(|e| classify(e, channel_id))?;

            let exhausted = (page.len() as u8) < page_size;
            before = page.last().map(|m| m.id);
            messages.extend(page.into_iter().map(wrap_message));

            if exhausted {
                break;
            }
        }

        Ok(messages)
    }

    async fn delete_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<bool, PurgeError> {
        let result = self
            .http
            .delete_message(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                Some("matched sweep deletion criteria"),
            )
            .await;

        match result {
            Ok(()) => Ok(true),
            // Already deleted — most likely a concurrent scan won the race.
            Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)))
                if resp.status_code.as_u16() == 404 =>
            {
                Ok(false)
            }
            Err(e) => Err(classify(e, channel_id)),
        }
    }
}

/// Wrap a serenity message into a platform-agnostic snapshot.
///
/// Embed titles, descriptions, and fields are flattened into `embed_text`
/// since restock webhooks put the product details there.
fn wrap_message(msg: Message) -> CandidateMessage {
    let mut embed_text = Vec::new();
    for embed in &msg.embeds {
        if let Some(title) = &embed.title {
            embed_text.push(title.clone());
        }
        if let Some(description) = &embed.description {
            embed_text.push(description.clone());
        }
        for field in &embed.fields {
            embed_text.push(format!("{}: {}", field.name, field.value));
        }
    }

    CandidateMessage {
        message_id: msg.id.get(),
        author: msg.author.tag(),
        author_is_webhook: msg.webhook_id.is_some() || msg.author.bot,
        timestamp: msg.timestamp.to_string(),
        content: msg.content,
        embed_text,
    }
}

/// Map a serenity error onto the purge taxonomy by HTTP status class.
fn classify(err: serenity::Error, channel_id: u64) -> PurgeError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            match resp.status_code.as_u16() {
                404 => PurgeError::ChannelAccess { channel_id },
                403 => PurgeError::Permission {
                    channel_id,
                    reason: resp.error.message.clone(),
                },
                429 => PurgeError::Unavailable("rate limited by Discord".to_string()),
                code if code >= 500 => {
                    PurgeError::Unavailable(format!("Discord returned {}", code))
                }
                _ => PurgeError::Platform(serenity::Error::Http(HttpError::UnsuccessfulRequest(
                    resp,
                ))),
            }
        }
        other => PurgeError::Platform(other),
    }
}
