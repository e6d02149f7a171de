//! Apartment Discord commands - create, fill, correct, delete and list VIP apartments.
//!
//! Every command here is admin-only and a thin shell around the ledger: it calls
//! one ledger operation and renders the structured result or error.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete, render},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::error;

    /// Create a new apartment
    ///
    /// Registers an empty apartment with a fixed capacity. Fails if an apartment
    /// with the same name already exists.
    #[poise::command(
        slash_command,
        rename = "createhouse",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn create_house(
        ctx: Context<'_>,
        #[description = "Apartment name"]
        #[max_length = 100]
        name: String,
        #[description = "Maximum number of residents"]
        #[min = 0]
        max_residents: i64,
    ) -> Result<()> {
        let result = {
            let name = name.clone();
            ctx.data()
                .ledger
                .run_blocking(move |ledger| ledger.create_apartment(&name, max_residents))
                .await
        };
        match result {
            Ok(record) => {
                ctx.say(render::created_message(name.trim(), &record))
                    .await?;
                Ok(())
            }
            Err(e) => reply_ledger_error(ctx, e).await,
        }
    }

    /// Add new residents to an apartment
    ///
    /// Residents beyond the free capacity are put on the waiting list.
    #[poise::command(
        slash_command,
        rename = "addresidents",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn add_residents(
        ctx: Context<'_>,
        #[description = "Apartment name"]
        #[autocomplete = "autocomplete::autocomplete_apartment_name"]
        #[max_length = 100]
        name: String,
        #[description = "Number of residents to add"]
        #[min = 0]
        num_residents: i64,
    ) -> Result<()> {
        let result = {
            let name = name.clone();
            ctx.data()
                .ledger
                .run_blocking(move |ledger| ledger.add_residents(&name, num_residents))
                .await
        };
        match result {
            Ok(admission) => {
                ctx.say(render::admission_message(name.trim(), &admission))
                    .await?;
                Ok(())
            }
            Err(e) => reply_ledger_error(ctx, e).await,
        }
    }

    /// Correct the resident count of an apartment
    ///
    /// A lower total is taken from the waiting list first. A higher total sets the
    /// current residents, capped at capacity.
    #[poise::command(
        slash_command,
        rename = "updateresidents",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn update_residents(
        ctx: Context<'_>,
        #[description = "Apartment name"]
        #[autocomplete = "autocomplete::autocomplete_apartment_name"]
        #[max_length = 100]
        name: String,
        #[description = "Corrected number of residents"]
        #[min = 0]
        total_residents: i64,
    ) -> Result<()> {
        let result = {
            let name = name.clone();
            ctx.data()
                .ledger
                .run_blocking(move |ledger| ledger.update_residents(&name, total_residents))
                .await
        };
        match result {
            Ok(record) => {
                ctx.say(render::updated_message(name.trim(), &record))
                    .await?;
                Ok(())
            }
            Err(e) => reply_ledger_error(ctx, e).await,
        }
    }

    /// Delete an apartment
    #[poise::command(
        slash_command,
        rename = "deletehouse",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn delete_house(
        ctx: Context<'_>,
        #[description = "Apartment to delete"]
        #[autocomplete = "autocomplete::autocomplete_apartment_name"]
        #[max_length = 100]
        name: String,
    ) -> Result<()> {
        let result = {
            let name = name.clone();
            ctx.data()
                .ledger
                .run_blocking(move |ledger| ledger.delete_apartment(&name))
                .await
        };
        match result {
            Ok(record) => {
                ctx.say(render::deleted_message(name.trim(), &record))
                    .await?;
                Ok(())
            }
            Err(e) => reply_ledger_error(ctx, e).await,
        }
    }

    /// Show a list of apartments
    ///
    /// Lists every apartment with its capacity, residents and waiting list, split
    /// over several embeds when there are more than Discord allows in one.
    #[poise::command(
        slash_command,
        rename = "vipapartment",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn vip_apartment(ctx: Context<'_>) -> Result<()> {
        let apartments = match ctx.data().ledger.list_apartments() {
            Ok(apartments) => apartments,
            Err(e) => return reply_ledger_error(ctx, e).await,
        };

        if apartments.is_empty() {
            ctx.say("🏠 No apartments found. Create one with `/createhouse`.")
                .await?;
            return Ok(());
        }

        let total = apartments.len();
        for (page, chunk) in apartments.chunks(render::EMBED_FIELD_LIMIT).enumerate() {
            let embed = serenity::CreateEmbed::default()
                .title(render::apartment_page_title(page))
                .color(render::APARTMENT_COLOR)
                .fields(
                    chunk
                        .iter()
                        .map(|(name, record)| render::apartment_field(name, record)),
                )
                .footer(serenity::CreateEmbedFooter::new(format!(
                    "{total} apartment{}",
                    if total == 1 { "" } else { "s" }
                )));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }

        Ok(())
    }

    /// Tells the user why a ledger operation failed. Persistence failures are also
    /// logged, since the ledger on disk may now lag behind what the user expects.
    async fn reply_ledger_error(ctx: Context<'_>, error: Error) -> Result<()> {
        if error.is_persistence_failure() {
            error!(
                command = %ctx.command().name,
                "Ledger persistence failed: {error}"
            );
        }
        ctx.say(render::ledger_error_message(&error)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
