//! CategoryTaxonomy - label-to-category classification
//!
//! ## Responsibilities
//!
//! - Map free-text object labels onto the four dashboard categories
//!
//! Matching is case-insensitive substring matching in a fixed priority
//! order: person tokens, then vehicle tokens, then animal tokens. The
//! order is load-bearing - "red car with a dog inside" must classify as
//! Vehicles, not Animals, to stay compatible with historical aggregate
//! output. Anything unmatched (including empty labels) is Objects.

use serde::{Deserialize, Serialize};

const PEOPLE_TOKENS: [&str; 2] = ["person", "people"];
const VEHICLE_TOKENS: [&str; 5] = ["car", "truck", "bus", "motorcycle", "vehicle"];
const ANIMAL_TOKENS: [&str; 4] = ["dog", "cat", "bird", "animal"];

/// Dashboard detection category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    People,
    Vehicles,
    Animals,
    Objects,
}

impl Category {
    /// All categories in the fixed dashboard display order.
    pub const ALL: [Category; 4] = [
        Category::People,
        Category::Vehicles,
        Category::Animals,
        Category::Objects,
    ];

    /// Lowercase name used in filters and breakdown keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::People => "people",
            Category::Vehicles => "vehicles",
            Category::Animals => "animals",
            Category::Objects => "objects",
        }
    }

    /// Capitalized name used as a chart label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::People => "People",
            Category::Vehicles => "Vehicles",
            Category::Animals => "Animals",
            Category::Objects => "Objects",
        }
    }
}

/// Classify an object label into a dashboard category.
pub fn classify(label: &str) -> Category {
    let lower = label.to_lowercase();

    if PEOPLE_TOKENS.iter().any(|token| lower.contains(token)) {
        Category::People
    } else if VEHICLE_TOKENS.iter().any(|token| lower.contains(token)) {
        Category::Vehicles
    } else if ANIMAL_TOKENS.iter().any(|token| lower.contains(token)) {
        Category::Animals
    } else {
        Category::Objects
    }
}
