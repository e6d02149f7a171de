//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Apartment ledger commands
pub mod apartment;

/// General utility commands
pub mod general;

/// Tebex storefront commands
pub mod store;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use apartment::*;
pub use general::*;
pub use store::*;

/// Every slash command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        create_house(),
        add_residents(),
        update_residents(),
        delete_house(),
        vip_apartment(),
        payment_info(),
        products(),
        player_search(),
        update_product(),
        create_url(),
        server_status(),
        ping(),
        help(),
    ]
}
