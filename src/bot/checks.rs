//! Command checks.

use crate::{bot::Context, errors::Result};
use tracing::{debug, info};

/// Passes only for guild members holding one of the configured admin roles.
///
/// Used as a poise `check` on every command that mutates the ledger or talks to
/// the storefront. Direct messages never pass.
pub async fn is_admin(ctx: Context<'_>) -> Result<bool> {
    let Some(member) = ctx.author_member().await else {
        debug!(command = %ctx.command().name, "Admin command used outside a guild");
        return Ok(false);
    };

    let permitted = ctx
        .data()
        .admin_roles
        .permits(member.roles.iter().map(|role| role.get()));
    if !permitted {
        info!(
            user = %ctx.author().name,
            command = %ctx.command().name,
            "Denied admin command"
        );
    }
    Ok(permitted)
}
