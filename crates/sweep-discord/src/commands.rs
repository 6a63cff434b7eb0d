//! Static return-link slash commands.
//!
//! Registration happens in `ready()` when `config.slash_commands` is true.
//! Interactions are dispatched from `interaction_create` in the event handler.
//! Each command carries no state — it replies with its configured text.

use serenity::builder::{
    CreateCommand, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::application::CommandInteraction;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tracing::{info, warn};

use sweep_core::config::ReturnLinkCommand;

/// Register the configured commands. Call from `ready()`.
pub async fn register_commands(
    ctx: &Context,
    guild_id: Option<GuildId>,
    links: &[ReturnLinkCommand],
) {
    let commands: Vec<CreateCommand> = links
        .iter()
        .map(|link| CreateCommand::new(link.name.clone()).description(link.description.clone()))
        .collect();

    match guild_id {
        Some(gid) => match gid.set_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(guild = %gid, count = cmds.len(), "registered guild slash commands"),
            Err(e) => warn!(guild = %gid, error = %e, "failed to register guild commands"),
        },
        None => {
            match serenity::model::application::Command::set_global_commands(&ctx.http, commands)
                .await
            {
                Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
                Err(e) => warn!(error = %e, "failed to register global slash commands"),
            }
        }
    }
}

/// Dispatch a slash command interaction to its configured reply.
pub async fn handle_interaction(
    ctx: &Context,
    command: &CommandInteraction,
    links: &[ReturnLinkCommand],
) {
    match links.iter().find(|l| l.name == command.data.name) {
        Some(link) => {
            info!(command = %command.data.name, user = %command.user.name, "slash command used");
            respond(ctx, command, &link.reply, false).await;
        }
        None => {
            respond(ctx, command, "Unknown command.", true).await;
        }
    }
}

async fn respond(ctx: &Context, command: &CommandInteraction, content: &str, ephemeral: bool) {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(ephemeral),
    );
    if let Err(e) = command.create_response(&ctx.http, response).await {
        warn!(command = %command.data.name, error = %e, "failed to respond to slash command");
    }
}
