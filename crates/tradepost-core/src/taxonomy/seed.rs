//! Default taxonomy seed.
//!
//! Provides the starter vocabulary written to the shared taxonomy document
//! the first time a deployment touches it.

use super::model::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Starter vocabulary for a fresh deployment.
///
/// Seeded values land directly in the approved sets; the pending sets
/// always start empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomySeed {
    pub categories: Vec<String>,
    pub interests: Vec<String>,
}

impl TaxonomySeed {
    /// Expands the seed into a full taxonomy document.
    pub fn into_taxonomy(&self) -> Taxonomy {
        Taxonomy {
            approved_categories: to_set(&self.categories),
            pending_categories: BTreeSet::new(),
            approved_interests: to_set(&self.interests),
            pending_interests: BTreeSet::new(),
        }
    }
}

impl Default for TaxonomySeed {
    fn default() -> Self {
        TaxonomySeed {
            categories: to_strings(DEFAULT_CATEGORIES),
            interests: to_strings(DEFAULT_INTERESTS),
        }
    }
}

/// Professional fields selectable out of the box.
const DEFAULT_CATEGORIES: &[&str] = &[
    "General",
    "Web Development",
    "Graphic Design",
    "Photography",
    "Video Editing",
    "Copywriting",
    "Translation",
    "Marketing",
    "Accounting",
    "Legal Advice",
    "Tutoring",
    "Carpentry",
    "Gardening",
];

/// Common personal interests offered as suggestions.
const DEFAULT_INTERESTS: &[&str] = &[
    "Art",
    "Music",
    "Cooking",
    "Fitness",
    "Travel",
    "Technology",
    "Sustainability",
    "Languages",
    "Crafts",
    "Outdoors",
];

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values.iter().cloned().collect()
}
