//! Admin role configuration loaded from the `ADMIN_ROLE_IDS` environment variable.
//!
//! Every mutating or storefront command is limited to members holding at least
//! one of these Discord roles.

use crate::errors::{Error, Result};
use std::collections::HashSet;

/// Discord role ids allowed to run admin commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRoles {
    ids: HashSet<u64>,
}

impl AdminRoles {
    /// Parses a comma-separated list of role ids, e.g. `"123,456"`.
    ///
    /// Blank entries are skipped. Anything that is not a role id is an error, as is
    /// a list with no ids at all, since that would lock every admin command.
    pub fn parse(raw: &str) -> Result<Self> {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<u64>().map_err(|e| Error::Config {
                    message: format!("ADMIN_ROLE_IDS entry '{id}' is not a role id: {e}"),
                })
            })
            .collect::<Result<HashSet<_>>>()?;

        if ids.is_empty() {
            return Err(Error::Config {
                message: "ADMIN_ROLE_IDS must list at least one role id".to_string(),
            });
        }
        Ok(Self { ids })
    }

    /// Reads and parses `ADMIN_ROLE_IDS`.
    pub fn from_env() -> Result<Self> {
        let raw = crate::config::settings::require_env("ADMIN_ROLE_IDS")?;
        Self::parse(&raw)
    }

    /// Whether any of the member's roles is an admin role.
    pub fn permits(&self, member_roles: impl IntoIterator<Item = u64>) -> bool {
        member_roles.into_iter().any(|role| self.ids.contains(&role))
    }

    /// The configured admin role ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_list() -> Result<()> {
        let roles = AdminRoles::parse(" 1111, 2222 ,,3333 ")?;
        let mut ids: Vec<u64> = roles.ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, [1111, 2222, 3333]);
        assert!(roles.permits([2222]));
        assert!(roles.permits([9, 3333]));
        Ok(())
    }

    #[test]
    fn test_members_without_admin_roles_are_denied() -> Result<()> {
        let roles = AdminRoles::parse("1111")?;
        assert!(!roles.permits([2222, 3333]));
        assert!(!roles.permits(std::iter::empty()));
        Ok(())
    }

    #[test]
    fn test_invalid_role_ids_are_rejected() {
        assert!(matches!(
            AdminRoles::parse("1111,admins"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            AdminRoles::parse("-5"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_empty_role_list_is_rejected() {
        assert!(matches!(AdminRoles::parse(""), Err(Error::Config { .. })));
        assert!(matches!(AdminRoles::parse(" , "), Err(Error::Config { .. })));
    }
}
