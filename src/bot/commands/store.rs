//! Storefront Discord commands - Tebex payment, player and package operations.
//!
//! Pass-through commands: each one makes a single Tebex call and renders the
//! answer. Failures are reported to the user and logged, never retried.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, render},
        core::tebex::PackageUpdate,
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use tracing::warn;

    /// Look up a payment by Transaction ID
    #[poise::command(
        slash_command,
        rename = "kakunin",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn payment_info(
        ctx: Context<'_>,
        #[description = "Transaction ID starting with tbx"] transaction_id: String,
    ) -> Result<()> {
        ctx.defer().await?;

        let payment = match ctx.data().tebex.payment(&transaction_id).await {
            Ok(payment) => payment,
            Err(e) => {
                warn!("Payment lookup for {transaction_id} failed: {e}");
                ctx.say(render::proxy_error_message(
                    "retrieve payment information",
                    &e,
                ))
                .await?;
                return Ok(());
            }
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "Payment Information for Transaction ID: {}",
                transaction_id.trim()
            ))
            .color(render::STORE_COLOR)
            .field("Amount", render::payment_amount(&payment), true)
            .field("Status", render::or_placeholder(&payment.status), true)
            .field("Date", render::discord_timestamp(&payment.date), true)
            .field("Player Name", render::or_placeholder(&payment.player.name), true)
            .field(
                "Package Name(s)",
                render::or_placeholder(&payment.package_names()),
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// List the packages available in the store
    #[poise::command(
        slash_command,
        rename = "products",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn products(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;

        let packages = match ctx.data().tebex.packages().await {
            Ok(packages) => packages,
            Err(e) => {
                warn!("Package listing failed: {e}");
                ctx.say(render::proxy_error_message(
                    "retrieve product information",
                    &e,
                ))
                .await?;
                return Ok(());
            }
        };

        if packages.is_empty() {
            ctx.say("No products are available in the store.").await?;
            return Ok(());
        }

        for chunk in packages.chunks(render::EMBED_FIELD_LIMIT) {
            let fields = chunk.iter().map(|package| {
                let state = if package.disabled { "Disabled" } else { "Enabled" };
                let price = render::or_placeholder(&package.price.to_string());
                (
                    format!("{} (ID {})", render::or_placeholder(&package.name), package.id),
                    format!("Price: {price}\nStatus: {state}"),
                    false,
                )
            });
            let embed = serenity::CreateEmbed::default()
                .title("Available Products")
                .color(render::STORE_COLOR)
                .fields(fields);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Ok(())
    }

    /// Look up a player by Tebex ID
    #[poise::command(
        slash_command,
        rename = "search",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn player_search(
        ctx: Context<'_>,
        #[description = "Tebex ID (not a Transaction ID)"] tebex_id: String,
    ) -> Result<()> {
        ctx.defer().await?;

        let lookup = match ctx.data().tebex.player(&tebex_id).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!("Player lookup for {tebex_id} failed: {e}");
                ctx.say(render::proxy_error_message(
                    "retrieve player information",
                    &e,
                ))
                .await?;
                return Ok(());
            }
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("Player Information for {}", tebex_id.trim()))
            .color(render::STORE_COLOR)
            .field("Username", render::or_placeholder(&lookup.player.username), true)
            .field("Ban Count", lookup.ban_count.to_string(), true)
            .field(
                "Chargeback Rate",
                render::or_placeholder(&lookup.chargeback_rate.to_string()),
                true,
            )
            .field(
                "Total Purchases",
                render::purchase_totals_text(&lookup.purchase_totals),
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Update a package's name, price and availability
    #[poise::command(
        slash_command,
        rename = "updateproduct",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn update_product(
        ctx: Context<'_>,
        #[description = "Package ID (see /products)"] package_id: u64,
        #[description = "Disable to stop accepting purchases"] enabled: bool,
        #[description = "New package name"] name: String,
        #[description = "New package price"] price: f64,
    ) -> Result<()> {
        if name.trim().is_empty() {
            ctx.say("❌ Product name cannot be empty.").await?;
            return Ok(());
        }

        ctx.defer().await?;

        let update = PackageUpdate {
            disabled: !enabled,
            name: name.trim().to_string(),
            price,
        };
        if let Err(e) = ctx.data().tebex.update_package(package_id, &update).await {
            warn!("Updating package {package_id} failed: {e}");
            ctx.say(render::proxy_error_message("update the package", &e))
                .await?;
            return Ok(());
        }

        let status = if enabled { "enabled" } else { "disabled" };
        ctx.say(format!(
            "✅ Package {package_id} has been updated. Status: {status}, Name: {}, Price: {price}",
            update.name
        ))
        .await?;
        Ok(())
    }

    /// Create a checkout URL for a player
    #[poise::command(
        slash_command,
        rename = "createurl",
        check = "crate::bot::checks::is_admin"
    )]
    pub async fn create_url(
        ctx: Context<'_>,
        #[description = "Package ID (see /products)"] package_id: String,
        #[description = "Tebex ID of the buyer"] tebex_id: String,
    ) -> Result<()> {
        ctx.defer().await?;

        let checkout = match ctx
            .data()
            .tebex
            .create_checkout(&package_id, &tebex_id)
            .await
        {
            Ok(checkout) => checkout,
            Err(e) => {
                warn!("Creating checkout for package {package_id} failed: {e}");
                ctx.say(render::proxy_error_message("create the checkout URL", &e))
                    .await?;
                return Ok(());
            }
        };

        let embed = serenity::CreateEmbed::default()
            .title("Checkout URL Created")
            .color(render::CHECKOUT_COLOR)
            .field("URL", render::or_placeholder(&checkout.url), false)
            .field("Expires At", render::discord_timestamp(&checkout.expires), false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
