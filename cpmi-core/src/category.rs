//! Static category metadata
//!
//! Descriptive text for the market categories that feed the index. The
//! render pipeline looks categories up here instead of hard-coding copy.

use serde::Serialize;

/// Description of a market category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    /// Hyphenated key as used by the index API
    pub key: &'static str,
    pub description: &'static str,
}

/// Known categories, in the order the index API usually reports them
pub const CATEGORY_CATALOG: &[CategoryInfo] = &[
    CategoryInfo {
        key: "bitcoin-markets",
        description: "Price targets, ETF flows and halving-related markets on Bitcoin",
    },
    CategoryInfo {
        key: "ethereum-ecosystem",
        description: "ETH price targets, upgrades and staking markets",
    },
    CategoryInfo {
        key: "altcoin-markets",
        description: "Price and listing markets on major alternative coins",
    },
    CategoryInfo {
        key: "regulatory-outcomes",
        description: "Legislation, court rulings and agency decisions affecting crypto",
    },
    CategoryInfo {
        key: "institutional-adoption",
        description: "Corporate treasuries, fund launches and bank integrations",
    },
    CategoryInfo {
        key: "defi-protocols",
        description: "TVL milestones, protocol launches and exploit markets",
    },
    CategoryInfo {
        key: "exchange-events",
        description: "Exchange listings, solvency and outage markets",
    },
];

const UNKNOWN_CATEGORY_DESCRIPTION: &str = "Crypto prediction markets in this category";

/// Look up the description for a category key
pub fn describe_category(key: &str) -> &'static str {
    CATEGORY_CATALOG
        .iter()
        .find(|info| info.key == key)
        .map(|info| info.description)
        .unwrap_or(UNKNOWN_CATEGORY_DESCRIPTION)
}

/// Human-readable label for a category key: `bitcoin-markets` → `Bitcoin Markets`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise, so `layer2-chains` becomes `Layer2 Chains`.
pub fn display_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut prev_is_letter = false;

    for ch in key.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_is_letter {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            label.push(ch);
            prev_is_letter = false;
        }
    }

    label
}
