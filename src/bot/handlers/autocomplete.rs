//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests existing apartment names as the user types, so commands that act on
//! an apartment are not left guessing at exact, case-sensitive names.

use crate::bot::Context;

/// Discord shows at most this many autocomplete choices
const AUTOCOMPLETE_LIMIT: usize = 25;

/// Provides autocomplete suggestions for apartment names.
///
/// # Arguments
/// * `ctx` - The poise context holding the ledger
/// * `partial` - The partial string the user has typed so far
///
/// # Returns
/// Up to 25 apartment names containing the input, case-insensitively
pub async fn autocomplete_apartment_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Ok(apartments) = ctx.data().ledger.list_apartments() else {
        return Vec::new();
    };
    matching_names(apartments.into_iter().map(|(name, _)| name), partial)
}

fn matching_names(names: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(AUTOCOMPLETE_LIMIT)
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn test_matching_names_is_case_insensitive() {
        let matches = matching_names(names(&["Sakura", "Momiji", "sakuranbo"]), "SAKU");
        assert_eq!(matches, names(&["Sakura", "sakuranbo"]));
    }

    #[test]
    fn test_empty_input_suggests_everything_up_to_limit() {
        let many: Vec<String> = (0..40).map(|i| format!("Apartment {i:02}")).collect();
        let matches = matching_names(many, "");
        assert_eq!(matches.len(), AUTOCOMPLETE_LIMIT);
        assert_eq!(matches[0], "Apartment 00");
    }

    #[test]
    fn test_no_match_suggests_nothing() {
        assert!(matching_names(names(&["Sakura"]), "zzz").is_empty());
    }
}
