//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the ApartmentBuddy application,
//! including all slash commands, the admin role check, autocomplete handlers, and
//! rendering of core results into messages and embeds.

/// Command checks (admin role gate)
pub mod checks;
/// Discord command implementations (apartments, storefront, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Message and embed text for core results
pub mod render;

use crate::{
    config::{roles::AdminRoles, settings::ServerConfig},
    core::{apartment::Ledger, tebex::TebexClient},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// The apartment ledger; every command shares this one instance
    pub ledger: Arc<Ledger>,
    /// Client for the Tebex plugin API
    pub tebex: TebexClient,
    /// Roles allowed to run admin commands
    pub admin_roles: AdminRoles,
    /// Game server probed by `/serverstatus`, if configured
    pub server: Option<ServerConfig>,
}

impl BotData {
    /// Bundles the shared state handed to every command.
    #[must_use]
    pub const fn new(
        ledger: Arc<Ledger>,
        tebex: TebexClient,
        admin_roles: AdminRoles,
        server: Option<ServerConfig>,
    ) -> Self {
        Self {
            ledger,
            tebex,
            admin_roles,
            server,
        }
    }
}

/// Poise context with our data and error types.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error:?}", ctx.command().name);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                warn!("Admin check for `{}` failed: {error}", ctx.command().name);
            }
            let reply = poise::CreateReply::default()
                .content("🚫 You don't have permission to use this command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send permission denial: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord, registers the slash commands and runs until shutdown.
///
/// Commands are registered in `dev_guild` when given (instant), otherwise
/// globally (may take a while to propagate).
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData, dev_guild: Option<u64>) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                let commands = &framework.options().commands;
                if let Some(guild_id) = dev_guild {
                    poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild_id))
                        .await?;
                    info!("Registered {} commands in guild {guild_id}", commands.len());
                } else {
                    poise::builtins::register_globally(ctx, commands).await?;
                    info!("Registered {} commands globally", commands.len());
                }
                Ok(data)
            })
        })
        .build();

    // Slash commands carry the invoking member's roles, so no privileged intents
    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}
