//! The scan-and-delete workflow.
//!
//! Messages are examined strictly newest-to-oldest; matches are deleted
//! immediately as they are found, never batched. Partial progress is not
//! undone when a later delete fails.

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use sweep_core::types::{DeletedMessage, SearchCriteria};

use crate::error::PurgeError;
use crate::store::MessageStore;

/// Outcome of one scan. The HTTP layer turns this into a wire report.
#[derive(Debug)]
pub struct PurgeSummary {
    /// Messages examined, match or not. Never exceeds the requested limit.
    pub messages_checked: u32,
    /// Snapshots of deleted messages, in scan (newest-first) order.
    pub deleted: Vec<DeletedMessage>,
    /// The deadline passed mid-scan; counts reflect progress so far.
    pub timed_out: bool,
    /// At least one matched message failed to delete and none succeeded.
    pub all_deletes_failed: bool,
}

/// Scan up to `limit` recent messages in `channel_id` and delete every one
/// matching `criteria`. The whole scan (history fetch + deletions) is bounded
/// by `deadline`.
pub async fn run(
    store: &dyn MessageStore,
    channel_id: u64,
    criteria: &SearchCriteria,
    limit: u32,
    deadline: Instant,
) -> Result<PurgeSummary, PurgeError> {
    let mut summary = PurgeSummary {
        messages_checked: 0,
        deleted: Vec::new(),
        timed_out: false,
        all_deletes_failed: false,
    };
    let mut failed_deletes: u32 = 0;

    let messages = match timeout_at(deadline, store.fetch_recent(channel_id, limit)).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(channel_id, "history fetch hit the scan deadline");
            summary.timed_out = true;
            return Ok(summary);
        }
    };

    debug!(channel_id, fetched = messages.len(), "scanning channel history");

    for msg in &messages {
        if Instant::now() >= deadline {
            summary.timed_out = true;
            break;
        }

        summary.messages_checked += 1;

        if !criteria.matches(msg) {
            continue;
        }

        // Snapshot before deletion — the message is unrecoverable afterwards.
        let snapshot = msg.snapshot();

        match timeout_at(deadline, store.delete_message(channel_id, msg.message_id)).await {
            Ok(Ok(true)) => {
                info!(channel_id, message_id = msg.message_id, author = %msg.author, "deleted message");
                summary.deleted.push(snapshot);
            }
            Ok(Ok(false)) => {
                // Lost a race with a concurrent request — the message is gone
                // either way, so this is not a failure.
                debug!(channel_id, message_id = msg.message_id, "message already deleted");
            }
            Ok(Err(e)) => {
                warn!(channel_id, message_id = msg.message_id, error = %e, "delete failed, continuing scan");
                failed_deletes += 1;
            }
            Err(_) => {
                warn!(channel_id, message_id = msg.message_id, "delete hit the scan deadline");
                summary.timed_out = true;
                break;
            }
        }
    }

    summary.all_deletes_failed = failed_deletes > 0 && summary.deleted.is_empty();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;
    use sweep_core::types::CandidateMessage;

    /// In-memory store: `messages` is newest-first, deletes remove entries so
    /// a second scan sees the shorter remaining history.
    #[derive(Default)]
    struct FakeStore {
        messages: Mutex<Vec<CandidateMessage>>,
        deleted: Mutex<Vec<u64>>,
        fail_all_deletes: bool,
        fail_delete_ids: HashSet<u64>,
        already_gone_ids: HashSet<u64>,
        unknown_channel: bool,
        deny_channel: bool,
        delete_delay: Option<Duration>,
    }

    impl FakeStore {
        fn with_messages(messages: Vec<CandidateMessage>) -> Self {
            Self {
                messages: Mutex::new(messages),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MessageStore for FakeStore {
        async fn fetch_recent(
            &self,
            channel_id: u64,
            limit: u32,
        ) -> Result<Vec<CandidateMessage>, PurgeError> {
            if self.unknown_channel {
                return Err(PurgeError::ChannelAccess { channel_id });
            }
            if self.deny_channel {
                return Err(PurgeError::Permission {
                    channel_id,
                    reason: "Missing Access".to_string(),
                });
            }
            let messages = self.messages.lock().unwrap();
            Ok(messages.iter().take(limit as usize).cloned().collect())
        }

        async fn delete_message(
            &self,
            _channel_id: u64,
            message_id: u64,
        ) -> Result<bool, PurgeError> {
            if let Some(delay) = self.delete_delay {
                tokio::time::sleep(delay).await;
            }
            if self.already_gone_ids.contains(&message_id) {
                return Ok(false);
            }
            if self.fail_all_deletes || self.fail_delete_ids.contains(&message_id) {
                return Err(PurgeError::Unavailable("transient failure".to_string()));
            }
            self.messages
                .lock()
                .unwrap()
                .retain(|m| m.message_id != message_id);
            self.deleted.lock().unwrap().push(message_id);
            Ok(true)
        }
    }

    fn msg(id: u64, content: &str, webhook: bool) -> CandidateMessage {
        CandidateMessage {
            message_id: id,
            content: content.to_string(),
            author: if webhook {
                "restock-monitor#0000".to_string()
            } else {
                "someuser#1234".to_string()
            },
            author_is_webhook: webhook,
            timestamp: "2024-03-01T12:00:00Z".to_string(),
            embed_text: Vec::new(),
        }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            product_name: "Nike Air Max".to_string(),
            sku: "ABC123".to_string(),
            size: "US 9".to_string(),
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    /// Five webhook messages, two matching — both deleted, all five checked.
    #[tokio::test]
    async fn deletes_matching_webhook_messages() {
        let store = FakeStore::with_messages(vec![
            msg(5, "Nike Air Max ABC123 US 9 in stock", true),
            msg(4, "Adidas Samba XYZ999 US 8", true),
            msg(3, "nike air max abc123 us 9 restock", true),
            msg(2, "Unrelated announcement", true),
            msg(1, "Nike Air Max but wrong sku US 9", true),
        ]);

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        assert_eq!(summary.messages_checked, 5);
        assert_eq!(summary.deleted.len(), 2);
        assert!(!summary.timed_out);
        assert!(!summary.all_deletes_failed);
    }

    /// `deleted` preserves newest-first scan order.
    #[tokio::test]
    async fn deletion_order_is_newest_first() {
        let store = FakeStore::with_messages(vec![
            msg(9, "Nike Air Max ABC123 US 9", true),
            msg(5, "filler", true),
            msg(3, "Nike Air Max ABC123 US 9", true),
            msg(1, "Nike Air Max ABC123 US 9", true),
        ]);

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        let ids: Vec<u64> = summary.deleted.iter().map(|d| d.message_id).collect();
        assert_eq!(ids, vec![9, 3, 1]);
    }

    /// `limit` bounds how many messages are examined, not deleted.
    #[tokio::test]
    async fn limit_bounds_messages_checked() {
        let messages = (1..=10)
            .rev()
            .map(|id| msg(id, "filler", true))
            .collect::<Vec<_>>();
        let store = FakeStore::with_messages(messages);

        let summary = run(&store, 10, &criteria(), 3, far_deadline())
            .await
            .unwrap();

        assert_eq!(summary.messages_checked, 3);
    }

    /// Matching content posted by a regular user is never deleted.
    #[tokio::test]
    async fn regular_user_messages_are_excluded() {
        let store = FakeStore::with_messages(vec![msg(1, "Nike Air Max ABC123 US 9", false)]);

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        assert_eq!(summary.messages_checked, 1);
        assert!(summary.deleted.is_empty());
    }

    /// A second scan after a successful one finds nothing left to delete and
    /// a shorter remaining history.
    #[tokio::test]
    async fn rerun_after_success_deletes_nothing() {
        let store = FakeStore::with_messages(vec![
            msg(3, "Nike Air Max ABC123 US 9", true),
            msg(2, "filler", true),
            msg(1, "other filler", true),
        ]);

        let first = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();
        assert_eq!(first.deleted.len(), 1);
        assert_eq!(first.messages_checked, 3);

        let second = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();
        assert_eq!(second.deleted.len(), 0);
        assert_eq!(second.messages_checked, 2);
    }

    #[tokio::test]
    async fn unknown_channel_is_reported() {
        let store = FakeStore {
            unknown_channel: true,
            ..FakeStore::default()
        };

        let err = run(&store, 42, &criteria(), 10, far_deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, PurgeError::ChannelAccess { channel_id: 42 }));
    }

    #[tokio::test]
    async fn permission_denied_is_reported() {
        let store = FakeStore {
            deny_channel: true,
            ..FakeStore::default()
        };

        let err = run(&store, 42, &criteria(), 10, far_deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, PurgeError::Permission { .. }));
    }

    /// A message deleted by a concurrent request is a silent skip.
    #[tokio::test]
    async fn already_gone_message_is_skipped() {
        let store = FakeStore {
            already_gone_ids: HashSet::from([2]),
            ..FakeStore::with_messages(vec![
                msg(2, "Nike Air Max ABC123 US 9", true),
                msg(1, "Nike Air Max ABC123 US 9", true),
            ])
        };

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        assert_eq!(summary.deleted.len(), 1);
        assert_eq!(summary.deleted[0].message_id, 1);
        assert!(!summary.all_deletes_failed);
    }

    /// An isolated delete failure is absorbed; the scan continues.
    #[tokio::test]
    async fn isolated_delete_failure_is_absorbed() {
        let store = FakeStore {
            fail_delete_ids: HashSet::from([2]),
            ..FakeStore::with_messages(vec![
                msg(2, "Nike Air Max ABC123 US 9", true),
                msg(1, "Nike Air Max ABC123 US 9", true),
            ])
        };

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        assert_eq!(summary.messages_checked, 2);
        assert_eq!(summary.deleted.len(), 1);
        assert!(!summary.all_deletes_failed);
    }

    /// When every candidate fails to delete, the failure is surfaced.
    #[tokio::test]
    async fn surfaces_failure_when_every_delete_fails() {
        let store = FakeStore {
            fail_all_deletes: true,
            ..FakeStore::with_messages(vec![
                msg(2, "Nike Air Max ABC123 US 9", true),
                msg(1, "Nike Air Max ABC123 US 9", true),
            ])
        };

        let summary = run(&store, 10, &criteria(), 10, far_deadline())
            .await
            .unwrap();

        assert!(summary.deleted.is_empty());
        assert!(summary.all_deletes_failed);
    }

    /// An already-expired deadline stops the scan before any fetch completes.
    #[tokio::test]
    async fn expired_deadline_yields_timed_out_summary() {
        let store = FakeStore {
            delete_delay: Some(Duration::from_secs(1)),
            ..FakeStore::with_messages(vec![msg(1, "Nike Air Max ABC123 US 9", true)])
        };

        let summary = run(&store, 10, &criteria(), 10, Instant::now())
            .await
            .unwrap();

        assert!(summary.timed_out);
        assert_eq!(summary.messages_checked, 0);
        assert!(summary.deleted.is_empty());
    }

    /// Deadline passing mid-scan returns the partial progress.
    #[tokio::test(start_paused = true)]
    async fn deadline_mid_scan_returns_partial_progress() {
        let store = FakeStore {
            delete_delay: Some(Duration::from_secs(10)),
            ..FakeStore::with_messages(vec![
                msg(2, "Nike Air Max ABC123 US 9", true),
                msg(1, "Nike Air Max ABC123 US 9", true),
            ])
        };

        // First delete finishes at t=10s, second would finish at t=20s but
        // the deadline cuts it off at t=15s.
        let deadline = Instant::now() + Duration::from_secs(15);
        let summary = run(&store, 10, &criteria(), 10, deadline).await.unwrap();

        assert!(summary.timed_out);
        assert_eq!(summary.deleted.len(), 1);
        assert_eq!(summary.messages_checked, 2);
    }
}
