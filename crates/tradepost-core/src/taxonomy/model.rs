//! Taxonomy domain model.
//!
//! A single shared document holding the vetted vocabulary of categories and
//! interests, split into approved and pending subsets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The shared vocabulary document.
///
/// Invariant: a value never sits in a set's approved and pending halves at
/// the same time. Approval moves it; rejection drops it from pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    #[serde(default)]
    pub approved_categories: BTreeSet<String>,
    #[serde(default)]
    pub pending_categories: BTreeSet<String>,
    #[serde(default)]
    pub approved_interests: BTreeSet<String>,
    #[serde(default)]
    pub pending_interests: BTreeSet<String>,
}

/// One atomic set operation against the taxonomy document.
///
/// Changes are applied in order, as a single document update; readers never
/// observe a half-applied batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TaxonomyChange {
    AddApprovedCategory { value: String },
    RemoveApprovedCategory { value: String },
    AddPendingCategory { value: String },
    RemovePendingCategory { value: String },
    AddApprovedInterest { value: String },
    RemoveApprovedInterest { value: String },
    AddPendingInterest { value: String },
    RemovePendingInterest { value: String },
}

impl Taxonomy {
    /// Applies a batch of set operations in order.
    pub fn apply(&mut self, changes: &[TaxonomyChange]) {
        for change in changes {
            match change {
                TaxonomyChange::AddApprovedCategory { value } => {
                    self.approved_categories.insert(value.clone());
                }
                TaxonomyChange::RemoveApprovedCategory { value } => {
                    self.approved_categories.remove(value);
                }
                TaxonomyChange::AddPendingCategory { value } => {
                    self.pending_categories.insert(value.clone());
                }
                TaxonomyChange::RemovePendingCategory { value } => {
                    self.pending_categories.remove(value);
                }
                TaxonomyChange::AddApprovedInterest { value } => {
                    self.approved_interests.insert(value.clone());
                }
                TaxonomyChange::RemoveApprovedInterest { value } => {
                    self.approved_interests.remove(value);
                }
                TaxonomyChange::AddPendingInterest { value } => {
                    self.pending_interests.insert(value.clone());
                }
                TaxonomyChange::RemovePendingInterest { value } => {
                    self.pending_interests.remove(value);
                }
            }
        }
    }

    /// Gatekeeper rule for a free-text category.
    ///
    /// Trims the value, then stages it for review only when it is genuinely
    /// novel. Returns `None` for empty input and for values already
    /// approved or already pending.
    pub fn category_proposal(&self, value: &str) -> Option<TaxonomyChange> {
        let value = value.trim();
        if value.is_empty()
            || self.approved_categories.contains(value)
            || self.pending_categories.contains(value)
        {
            return None;
        }
        Some(TaxonomyChange::AddPendingCategory {
            value: value.to_string(),
        })
    }

    /// Gatekeeper rule for a free-text interest. Same shape as
    /// [`Self::category_proposal`].
    pub fn interest_proposal(&self, value: &str) -> Option<TaxonomyChange> {
        let value = value.trim();
        if value.is_empty()
            || self.approved_interests.contains(value)
            || self.pending_interests.contains(value)
        {
            return None;
        }
        Some(TaxonomyChange::AddPendingInterest {
            value: value.to_string(),
        })
    }

    /// Resolution: promote a pending category to approved.
    pub fn approve_category(value: impl Into<String>) -> Vec<TaxonomyChange> {
        let value = value.into();
        vec![
            TaxonomyChange::AddApprovedCategory {
                value: value.clone(),
            },
            TaxonomyChange::RemovePendingCategory { value },
        ]
    }

    /// Resolution: drop a pending category. The approved set is untouched.
    pub fn reject_category(value: impl Into<String>) -> Vec<TaxonomyChange> {
        vec![TaxonomyChange::RemovePendingCategory {
            value: value.into(),
        }]
    }

    /// Resolution: promote a pending interest to approved.
    pub fn approve_interest(value: impl Into<String>) -> Vec<TaxonomyChange> {
        let value = value.into();
        vec![
            TaxonomyChange::AddApprovedInterest {
                value: value.clone(),
            },
            TaxonomyChange::RemovePendingInterest { value },
        ]
    }

    /// Resolution: drop an interest from BOTH sets.
    ///
    /// Unlike [`Self::reject_category`], this also removes an already
    /// approved value, so it doubles as retroactive de-approval. Kept
    /// intentionally; see DESIGN.md.
    pub fn reject_interest(value: impl Into<String>) -> Vec<TaxonomyChange> {
        let value = value.into();
        vec![
            TaxonomyChange::RemoveApprovedInterest {
                value: value.clone(),
            },
            TaxonomyChange::RemovePendingInterest { value },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy_with(approved: &[&str], pending: &[&str]) -> Taxonomy {
        Taxonomy {
            approved_categories: approved.iter().map(|s| s.to_string()).collect(),
            pending_categories: pending.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_proposal_stages_novel_value() {
        let taxonomy = taxonomy_with(&["Design"], &[]);

        let change = taxonomy.category_proposal("  Woodworking  ");
        assert_eq!(
            change,
            Some(TaxonomyChange::AddPendingCategory {
                value: "Woodworking".to_string()
            })
        );
    }

    #[test]
    fn test_proposal_noops_on_empty_and_known_values() {
        let taxonomy = taxonomy_with(&["Design"], &["Woodworking"]);

        assert_eq!(taxonomy.category_proposal(""), None);
        assert_eq!(taxonomy.category_proposal("   "), None);
        assert_eq!(taxonomy.category_proposal("Design"), None);
        assert_eq!(taxonomy.category_proposal("Woodworking"), None);
    }

    #[test]
    fn test_proposal_is_idempotent() {
        let mut taxonomy = taxonomy_with(&[], &[]);

        let first = taxonomy.category_proposal("Pottery").unwrap();
        taxonomy.apply(&[first]);
        assert!(taxonomy.pending_categories.contains("Pottery"));

        assert_eq!(taxonomy.category_proposal("Pottery"), None);
        assert_eq!(taxonomy.pending_categories.len(), 1);
    }

    #[test]
    fn test_approve_category_moves_value() {
        let mut taxonomy = taxonomy_with(&[], &["Pottery"]);

        taxonomy.apply(&Taxonomy::approve_category("Pottery"));

        assert!(taxonomy.approved_categories.contains("Pottery"));
        assert!(!taxonomy.pending_categories.contains("Pottery"));
    }

    #[test]
    fn test_approved_value_never_reenters_pending() {
        let mut taxonomy = taxonomy_with(&[], &["Pottery"]);
        taxonomy.apply(&Taxonomy::approve_category("Pottery"));

        assert_eq!(taxonomy.category_proposal("Pottery"), None);
        assert!(taxonomy.pending_categories.is_empty());
    }

    #[test]
    fn test_reject_category_leaves_approved_untouched() {
        let mut taxonomy = taxonomy_with(&["Design"], &["Design Stuff"]);

        taxonomy.apply(&Taxonomy::reject_category("Design Stuff"));
        taxonomy.apply(&Taxonomy::reject_category("Design"));

        assert!(taxonomy.pending_categories.is_empty());
        assert!(taxonomy.approved_categories.contains("Design"));
    }

    #[test]
    fn test_reject_interest_removes_from_both_sets() {
        let mut taxonomy = Taxonomy {
            approved_interests: ["Hiking".to_string()].into_iter().collect(),
            pending_interests: ["Hiking".to_string()].into_iter().collect(),
            ..Default::default()
        };

        taxonomy.apply(&Taxonomy::reject_interest("Hiking"));

        assert!(taxonomy.approved_interests.is_empty());
        assert!(taxonomy.pending_interests.is_empty());
    }

    #[test]
    fn test_changes_serialize_tagged() {
        let change = TaxonomyChange::AddPendingCategory {
            value: "Pottery".to_string(),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["op"], "add_pending_category");
        assert_eq!(json["value"], "Pottery");
    }
}
