//! General Discord commands - ping, help and the game server probe.
//! These commands don't touch the apartment ledger or the storefront.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, render},
        core::server,
        errors::Result,
    };
    use tracing::info;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**ApartmentBuddy Help**\n\
        Here is a summary of all available commands.\n\n\
        **Apartment Commands** (admin)\n\
        • `/createhouse <name> <max_residents>` - Creates a new apartment.\n\
        • `/addresidents <name> <num_residents>` - Adds residents; overflow goes to the waiting list.\n\
        • `/updateresidents <name> <total_residents>` - Corrects the resident count.\n\
        • `/deletehouse <name>` - Deletes an apartment.\n\
        • `/vipapartment` - Lists all apartments.\n\n\
        **Store Commands** (admin)\n\
        • `/kakunin <transaction_id>` - Looks up a payment.\n\
        • `/products` - Lists the store packages.\n\
        • `/search <tebex_id>` - Looks up a player.\n\
        • `/updateproduct <package_id> <enabled> <name> <price>` - Updates a package.\n\
        • `/createurl <package_id> <tebex_id>` - Creates a checkout URL.\n\n\
        **Utility Commands**\n\
        • `/serverstatus` - Checks whether the game server is reachable (admin).\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Check whether the game server is reachable
    #[poise::command(
        slash_command,
        rename = "serverstatus",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn server_status(ctx: Context<'_>) -> Result<()> {
        let Some(target) = ctx.data().server.clone() else {
            ctx.say("⚠️ No game server is configured.").await?;
            return Ok(());
        };

        ctx.defer().await?;
        let status = server::probe(&target.address, target.timeout()).await;
        info!(address = %target.address, online = status.is_online(), "Probed game server");

        ctx.say(render::server_status_message(&target.address, &status))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
