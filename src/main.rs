use apartment_buddy::{
    bot::{self, BotData},
    config::{roles::AdminRoles, settings},
    core::{apartment::Ledger, store::LedgerStore, tebex::TebexClient},
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the settings file (defaults when absent)
    let config_path = settings::config_path();
    let config = settings::load_config_or_default(&config_path)
        .inspect_err(|e| error!("Failed to load {}: {e}", config_path.display()))?;
    info!("Loaded configuration from {}", config_path.display());

    // 4. Open the apartment ledger; a corrupt ledger stops startup
    let ledger = Ledger::open(LedgerStore::new(settings::ledger_path()))
        .inspect_err(|e| error!("Failed to open apartment ledger: {e}"))?;
    info!("Apartment ledger opened at {}", ledger.path().display());

    // 5. Seed apartments listed in the settings file
    let seeded = ledger
        .seed_apartments(&config.apartments)
        .inspect_err(|e| error!("Failed to seed apartments: {e}"))?;
    if seeded > 0 {
        info!("Seeded {seeded} apartment(s) from configuration.");
    }

    // 6. Admin roles and the storefront client
    let admin_roles = AdminRoles::from_env()
        .inspect_err(|e| error!("Invalid admin role configuration: {e}"))?;
    info!("{} admin role(s) configured.", admin_roles.ids().count());
    let tebex = TebexClient::new(
        &config.tebex.base_url,
        settings::require_env("TEBEX_SECRET")?,
        config.tebex.timeout(),
    )?;

    // 7. Run the bot; the token is read right before use, never stored
    let token = settings::require_env("DISCORD_TOKEN")?;
    let dev_guild = settings::dev_guild_id()?;
    let data = BotData::new(Arc::new(ledger), tebex, admin_roles, config.server);

    bot::run_bot(token, data, dev_guild).await
}
