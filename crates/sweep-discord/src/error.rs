/// Errors produced while scanning and deleting channel messages.
///
/// Per-message delete failures are not represented here — the scan absorbs
/// them and carries on (see `purge::run`). These variants cover failures that
/// stop a scan from starting or completing.
#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("channel {channel_id} not found or not visible to the bot")]
    ChannelAccess { channel_id: u64 },

    #[error("bot lacks permission in channel {channel_id}: {reason}")]
    Permission { channel_id: u64, reason: String },

    #[error("Discord unavailable: {0}")]
    Unavailable(String),

    #[error("serenity error: {0}")]
    Platform(#[from] serenity::Error),
}
