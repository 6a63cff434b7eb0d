use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use sweep_core::config::{CommandsConfig, DiscordConfig};
use sweep_core::types::ConnectionState;

use crate::handler::SweepHandler;
use crate::session::SessionHandle;

/// Discord adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits. Reconnects automatically whenever the gateway drops; the shared
/// [`SessionHandle`] tracks the state so HTTP callers can fail fast while
/// the connection is down.
pub struct DiscordAdapter {
    session: SessionHandle,
    config: DiscordConfig,
    commands: CommandsConfig,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, commands: &CommandsConfig, session: SessionHandle) -> Self {
        Self {
            session,
            config: config.clone(),
            commands: commands.clone(),
        }
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns — runs for the lifetime of the process.
    pub async fn run(self) {
        // Message intents so REST history fetches include content.
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        // Build first client — retry indefinitely until initial connection succeeds.
        let first_client = loop {
            match self.build_client(intents).await {
                Ok(c) => break c,
                Err(e) => {
                    error!("Discord: initial connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        };

        // The REST client outlives gateway reconnects — hand it to the
        // session once and never again.
        self.session.attach_http(Arc::clone(&first_client.http));

        let mut client = first_client;

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            // Scans must fail fast until the next ready event.
            self.session.set_state(ConnectionState::Degraded);
            tokio::time::sleep(Duration::from_secs(5)).await;

            // Rebuild the client for the next attempt.
            client = loop {
                match self.build_client(intents).await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: reconnect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = SweepHandler {
            session: self.session.clone(),
            config: self.config.clone(),
            commands: self.commands.clone(),
        };

        Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
