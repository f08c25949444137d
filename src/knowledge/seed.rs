// src/knowledge/seed.rs — Built-in solution catalogue

use crate::core::types::{category, Solution};
use crate::store::Repository;

const SEED_SUCCESS_RATE: f64 = 0.8;
const SEED_USAGE_COUNT: i64 = 1;

const CATALOGUE: &[(&str, &[&str])] = &[
    (
        category::SOFTWARE,
        &[
            "Disable antivirus and retry installation",
            "Download from direct link",
            "Update to latest version of antivirus",
        ],
    ),
    (
        category::NETWORK,
        &[
            "Check app permissions for Local Network",
            "Clear app cache and relog",
            "Reinstall the app",
        ],
    ),
    (
        category::DEVICE,
        &[
            "Rollback app to version 4.9",
            "Offer a discount on a compatible thermostat",
            "Contact thermostat support for an update",
        ],
    ),
    (
        category::ACCOUNT,
        &[
            "Reset sync token manually",
            "Force Full Sync on both devices",
            "Clear app cache and relog",
        ],
    ),
    (
        category::PAYMENT,
        &[
            "Upgrade server to TLS 1.3",
            "Verify SSL certificate settings",
            "Use a different gateway API",
            "Check server firewall settings",
        ],
    ),
];

pub fn catalogue() -> Vec<Solution> {
    CATALOGUE
        .iter()
        .flat_map(|(cat, texts)| {
            texts
                .iter()
                .map(move |t| Solution::new(cat, t, SEED_SUCCESS_RATE, SEED_USAGE_COUNT))
        })
        .collect()
}

/// Load the catalogue into an empty knowledge base. Returns how many
/// solutions were inserted (0 when the table already had rows).
pub fn seed_solutions(repo: &dyn Repository) -> anyhow::Result<usize> {
    let inserted = repo.insert_solutions_if_empty(&catalogue())?;
    if inserted > 0 {
        tracing::info!("Seeded knowledge base with {inserted} solutions");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::in_memory;

    #[test]
    fn test_catalogue_covers_canonical_categories() {
        let solutions = catalogue();
        assert_eq!(solutions.len(), 16);
        for cat in category::CANONICAL {
            assert!(solutions.iter().any(|s| s.category == cat), "{cat}");
        }
        assert!(solutions.iter().all(|s| s.id.is_none() && s.usage_count == 1));
    }

    #[test]
    fn test_seed_only_into_empty_table() {
        let store = in_memory().unwrap();
        assert_eq!(seed_solutions(&store).unwrap(), 16);
        assert_eq!(seed_solutions(&store).unwrap(), 0);
        assert_eq!(store.count_solutions().unwrap(), 16);
    }
}
