use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::{Context, EventHandler};
use tracing::info;

use sweep_core::config::{CommandsConfig, DiscordConfig};
use sweep_core::types::ConnectionState;

use crate::session::SessionHandle;

/// Serenity event handler — tracks session state and serves slash commands.
pub struct SweepHandler {
    pub session: SessionHandle,
    pub config: DiscordConfig,
    pub commands: CommandsConfig,
}

#[async_trait]
impl EventHandler for SweepHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord bot connected");
        self.session.set_state(ConnectionState::Ready);

        if self.config.slash_commands {
            let guild_id = self.config.guild_id.map(GuildId::new);
            crate::commands::register_commands(&ctx, guild_id, &self.commands.return_links).await;
        }
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        // A resumed session skips the ready event.
        self.session.set_state(ConnectionState::Ready);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if !self.config.slash_commands {
            return;
        }
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&ctx, &command, &self.commands.return_links).await;
        }
    }
}
