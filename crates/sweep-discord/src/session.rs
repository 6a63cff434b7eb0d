//! Shared handle to the one Discord session per process.
//!
//! The adapter task owns the serenity client; everything else (HTTP handlers,
//! health checks) goes through a cheap clone of [`SessionHandle`].

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serenity::http::Http;
use tokio::sync::watch;
use tracing::info;

use sweep_core::config::PurgeConfig;
use sweep_core::types::{ConnectionState, SearchCriteria};

use crate::error::PurgeError;
use crate::purge::{self, PurgeSummary};
use crate::store::RestMessageStore;

#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionShared>,
}

struct SessionShared {
    state: watch::Sender<ConnectionState>,
    /// REST client, captured once from the first serenity client. REST stays
    /// valid across gateway reconnects.
    http: OnceLock<Arc<Http>>,
    purge: PurgeConfig,
}

impl SessionHandle {
    pub fn new(purge: PurgeConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            inner: Arc::new(SessionShared {
                state,
                http: OnceLock::new(),
                purge,
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn set_state(&self, state: ConnectionState) {
        let previous = self.inner.state.send_replace(state);
        if previous != state {
            info!(from = %previous, to = %state, "Discord session state changed");
        }
    }

    /// Store the REST client. Later calls are no-ops — the first client's
    /// `Http` keeps working for the process lifetime.
    pub fn attach_http(&self, http: Arc<Http>) {
        let _ = self.inner.http.set(http);
    }

    /// Scan up to `limit` recent messages in `channel_id` and delete the ones
    /// matching `criteria`.
    ///
    /// Fails fast with [`PurgeError::Unavailable`] unless the session is
    /// `Ready` — a degraded or still-connecting gateway must not leave the
    /// HTTP caller blocked.
    pub async fn search_and_delete(
        &self,
        channel_id: u64,
        criteria: &SearchCriteria,
        limit: u32,
    ) -> Result<PurgeSummary, PurgeError> {
        let state = self.state();
        if !state.is_ready() {
            return Err(PurgeError::Unavailable(format!(
                "Discord session is {}",
                state
            )));
        }

        let http = self.inner.http.get().ok_or_else(|| {
            PurgeError::Unavailable("Discord session has no REST client yet".to_string())
        })?;

        let store = RestMessageStore::new(Arc::clone(http));
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.inner.purge.timeout_secs);

        purge::run(&store, channel_id, criteria, limit, deadline).await
    }
}
