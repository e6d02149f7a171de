//! Message and embed text for core results.
//!
//! The core returns structured values; everything a user reads is produced here so
//! the wording can be tested without a Discord connection.

use crate::{
    core::{
        apartment::{Admission, ApartmentRecord},
        server::ServerStatus,
        tebex::{self, Amount, Payment},
    },
    errors::Error,
};
use std::{collections::BTreeMap, fmt::Write};

/// Embed color for apartment listings (blue)
pub const APARTMENT_COLOR: u32 = 0x0034_98DB;
/// Embed color for storefront lookups (Discord purple)
pub const STORE_COLOR: u32 = 0x0058_65F2;
/// Embed color for newly created checkout links (green)
pub const CHECKOUT_COLOR: u32 = 0x002E_CC71;
/// Discord rejects embeds with more fields than this
pub const EMBED_FIELD_LIMIT: usize = 25;

const PLACEHOLDER: &str = "N/A";

/// One embed field describing an apartment: `(name, value, inline)`.
#[must_use]
pub fn apartment_field(name: &str, record: &ApartmentRecord) -> (String, String, bool) {
    (
        name.to_string(),
        format!(
            "Max Residents: {}\nCurrent Residents: {}\nWaiting List: {}",
            record.max_residents, record.current_residents, record.waiting_list
        ),
        false,
    )
}

/// Title for page `page` (zero-based) of the apartment listing.
#[must_use]
pub fn apartment_page_title(page: usize) -> String {
    if page == 0 {
        "🏠 VIP Apartments".to_string()
    } else {
        format!("🏠 VIP Apartments (page {})", page + 1)
    }
}

/// Confirmation for `/createhouse`.
#[must_use]
pub fn created_message(name: &str, record: &ApartmentRecord) -> String {
    format!(
        "✅ Apartment '{name}' created with room for {} resident(s).",
        record.max_residents
    )
}

/// Confirmation for `/addresidents`, mentioning the waiting list only when used.
#[must_use]
pub fn admission_message(name: &str, admission: &Admission) -> String {
    let mut message = format!(
        "✅ {} resident(s) added to apartment '{name}'.",
        admission.admitted
    );
    if admission.waitlisted > 0 {
        let _ = write!(
            message,
            " ⏳ {} resident(s) added to the waiting list.",
            admission.waitlisted
        );
    }
    message
}

/// Confirmation for `/updateresidents`.
#[must_use]
pub fn updated_message(name: &str, record: &ApartmentRecord) -> String {
    format!(
        "✅ Apartment '{name}' now has {}/{} residents and {} on the waiting list.",
        record.current_residents, record.max_residents, record.waiting_list
    )
}

/// Confirmation for `/deletehouse`.
#[must_use]
pub fn deleted_message(name: &str, record: &ApartmentRecord) -> String {
    format!(
        "🗑️ Apartment '{name}' deleted. It had {} resident(s) and {} waiting.",
        record.current_residents, record.waiting_list
    )
}

/// User-facing text for a failed ledger operation.
#[must_use]
pub fn ledger_error_message(error: &Error) -> String {
    match error {
        Error::ApartmentExists { name } => {
            format!("❌ An apartment with the name '{name}' already exists.")
        }
        Error::ApartmentNotFound { name } => format!("❌ Apartment '{name}' does not exist."),
        Error::InvalidArgument { message } => format!("❌ {message}"),
        e if e.is_persistence_failure() => {
            "⚠️ The apartment ledger could not be saved, so this change may not be durable. \
             Please tell a developer."
                .to_string()
        }
        e => format!("❌ Something went wrong: {e}"),
    }
}

/// User-facing text for a failed storefront call, e.g. action = "retrieve payment information".
#[must_use]
pub fn proxy_error_message(action: &str, error: &Error) -> String {
    match error {
        Error::InvalidArgument { message } => format!("❌ {message}"),
        Error::TebexStatus { status, .. } => {
            format!("❌ Failed to {action} (Tebex answered {status}).")
        }
        _ => format!("❌ Failed to {action}."),
    }
}

/// Embed field values must not be empty.
#[must_use]
pub fn or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// A Tebex timestamp as a Discord timestamp tag, or the raw text if it won't parse.
#[must_use]
pub fn discord_timestamp(raw: &str) -> String {
    tebex::parse_timestamp(raw).map_or_else(
        || or_placeholder(raw),
        |at| format!("<t:{}:f>", at.timestamp()),
    )
}

/// Payment amount with its currency code when known.
#[must_use]
pub fn payment_amount(payment: &Payment) -> String {
    let amount = or_placeholder(&payment.amount.to_string());
    match &payment.currency {
        Some(currency) if !currency.iso_4217.is_empty() => {
            format!("{amount} {}", currency.iso_4217)
        }
        _ => amount,
    }
}

/// One line per currency, e.g. `USD: 15.5`.
#[must_use]
pub fn purchase_totals_text(totals: &BTreeMap<String, Amount>) -> String {
    if totals.is_empty() {
        return "None".to_string();
    }
    totals
        .iter()
        .map(|(currency, amount)| format!("{currency}: {amount}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reply for `/serverstatus`.
#[must_use]
pub fn server_status_message(address: &str, status: &ServerStatus) -> String {
    match status {
        ServerStatus::Online { latency } => format!(
            "🟢 Server `{address}` is online ({}ms).",
            latency.as_millis()
        ),
        ServerStatus::Offline { reason } => {
            format!("🔴 Server `{address}` is offline: {reason}")
        }
    }
}
